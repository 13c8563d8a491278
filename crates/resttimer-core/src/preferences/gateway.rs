use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::{mpsc, oneshot};

use super::{PreferencePatch, SharedPreferences, UserRestPreferences};
use crate::error::StoreError;

/// Remote (or local) persistence for user preferences.
///
/// `fetch` returns the stored partial document; fields it omits fall back
/// to the documented defaults.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn fetch(&self, user_id: &str) -> Result<Option<PreferencePatch>, StoreError>;

    async fn store(&self, user_id: &str, prefs: &UserRestPreferences) -> Result<(), StoreError>;
}

/// Resolves once the write queued by [`PreferenceGateway::save`] has been
/// attempted. Errors only if the writer task went away first.
pub type PendingWrite = oneshot::Receiver<()>;

struct WriteJob {
    user_id: String,
    done: oneshot::Sender<()>,
}

/// Adapter between the timer and a [`PreferenceStore`].
///
/// Reads never fail: any store error yields defaults. Writes are optimistic,
/// the in-memory merge happens first and a single background writer
/// persists in submission order.
pub struct PreferenceGateway {
    store: Arc<dyn PreferenceStore>,
    current: SharedPreferences,
    writer: OnceLock<mpsc::UnboundedSender<WriteJob>>,
}

impl PreferenceGateway {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            current: SharedPreferences::default(),
            writer: OnceLock::new(),
        }
    }

    /// Handle readers use to see the latest merged preferences.
    pub fn shared(&self) -> SharedPreferences {
        self.current.clone()
    }

    pub fn current(&self) -> UserRestPreferences {
        self.current.snapshot()
    }

    /// Load preferences for `user_id`, merged over defaults.
    pub async fn load(&self, user_id: &str) -> UserRestPreferences {
        let mut prefs = UserRestPreferences::default();
        match self.store.fetch(user_id).await {
            Ok(Some(patch)) => patch.apply(&mut prefs),
            Ok(None) | Err(StoreError::NotFound(_)) => {
                tracing::debug!(user_id, "no stored preferences, using defaults");
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "failed to load preferences, using defaults");
            }
        }
        self.current.replace(prefs.clone());
        prefs
    }

    /// Merge `patch` into the in-memory preferences and persist in the
    /// background.
    ///
    /// The merge is visible as soon as this returns. Writes are queued to
    /// one writer task which stores the latest merged value each time, so
    /// the store always ends on what readers see. Dropping the returned
    /// [`PendingWrite`] does not cancel the write. Returns `None` when no
    /// tokio runtime is available, in which case only the in-memory merge
    /// happens.
    pub fn save(&self, user_id: &str, patch: &PreferencePatch) -> Option<PendingWrite> {
        self.current.merge(patch);
        let writer = match self.writer() {
            Ok(writer) => writer,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "no runtime, preferences not persisted");
                return None;
            }
        };
        let (done, pending) = oneshot::channel();
        let job = WriteJob {
            user_id: user_id.to_string(),
            done,
        };
        if writer.send(job).is_err() {
            tracing::warn!(user_id, "preference writer stopped, preferences not persisted");
            return None;
        }
        Some(pending)
    }

    fn writer(&self) -> Result<&mpsc::UnboundedSender<WriteJob>, TryCurrentError> {
        if let Some(writer) = self.writer.get() {
            return Ok(writer);
        }
        let runtime = Handle::try_current()?;
        Ok(self.writer.get_or_init(|| {
            spawn_writer(&runtime, Arc::clone(&self.store), self.current.clone())
        }))
    }
}

/// Drain write jobs in order until the gateway is dropped.
fn spawn_writer(
    runtime: &Handle,
    store: Arc<dyn PreferenceStore>,
    current: SharedPreferences,
) -> mpsc::UnboundedSender<WriteJob> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WriteJob>();
    runtime.spawn(async move {
        while let Some(job) = rx.recv().await {
            let prefs = current.snapshot();
            if let Err(e) = store.store(&job.user_id, &prefs).await {
                tracing::warn!(user_id = %job.user_id, error = %e, "failed to persist preferences");
            }
            let _ = job.done.send(());
        }
    });
    tx
}

/// In-process store, mainly for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    records: Mutex<HashMap<String, UserRestPreferences>>,
    unavailable: bool,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails.
    pub fn unavailable() -> Self {
        Self {
            records: Mutex::default(),
            unavailable: true,
        }
    }

    pub fn get(&self, user_id: &str) -> Option<UserRestPreferences> {
        self.records
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(user_id)
            .cloned()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn fetch(&self, user_id: &str) -> Result<Option<PreferencePatch>, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(self.get(user_id).map(|p| PreferencePatch {
            default_rest_time: Some(p.default_rest_time),
            adaptive_enabled: Some(p.adaptive_enabled),
            auto_start: Some(p.auto_start),
            gesture_controls_enabled: Some(p.gesture_controls_enabled),
            rest_notifications_enabled: Some(p.rest_notifications_enabled),
            fatigue_adjustment_enabled: Some(p.fatigue_adjustment_enabled),
        }))
    }

    async fn store(&self, user_id: &str, prefs: &UserRestPreferences) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        self.records
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(user_id.to_string(), prefs.clone());
        Ok(())
    }
}
