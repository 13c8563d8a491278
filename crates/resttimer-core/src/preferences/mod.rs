//! Per-user timer preferences.
//!
//! [`PreferenceGateway`] is the only writer; everything else reads a
//! snapshot through [`SharedPreferences`].

mod file_store;
mod gateway;

pub use file_store::JsonFilePreferenceStore;
pub use gateway::{MemoryPreferenceStore, PendingWrite, PreferenceGateway, PreferenceStore};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Timer settings for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRestPreferences {
    /// Fallback rest length in seconds when no history is available.
    #[serde(default = "default_rest_time")]
    pub default_rest_time: u32,
    #[serde(default = "default_true")]
    pub adaptive_enabled: bool,
    #[serde(default = "default_true")]
    pub auto_start: bool,
    #[serde(default = "default_true")]
    pub gesture_controls_enabled: bool,
    #[serde(default = "default_true")]
    pub rest_notifications_enabled: bool,
    /// Stored and round-tripped only; the baseline does not depend on it.
    #[serde(default = "default_true")]
    pub fatigue_adjustment_enabled: bool,
}

fn default_rest_time() -> u32 {
    90
}
fn default_true() -> bool {
    true
}

impl Default for UserRestPreferences {
    fn default() -> Self {
        Self {
            default_rest_time: default_rest_time(),
            adaptive_enabled: true,
            auto_start: true,
            gesture_controls_enabled: true,
            rest_notifications_enabled: true,
            fatigue_adjustment_enabled: true,
        }
    }
}

/// A partial update. `None` fields leave the target untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_rest_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptive_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gesture_controls_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_notifications_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatigue_adjustment_enabled: Option<bool>,
}

impl PreferencePatch {
    pub fn apply(&self, prefs: &mut UserRestPreferences) {
        if let Some(v) = self.default_rest_time {
            prefs.default_rest_time = v;
        }
        if let Some(v) = self.adaptive_enabled {
            prefs.adaptive_enabled = v;
        }
        if let Some(v) = self.auto_start {
            prefs.auto_start = v;
        }
        if let Some(v) = self.gesture_controls_enabled {
            prefs.gesture_controls_enabled = v;
        }
        if let Some(v) = self.rest_notifications_enabled {
            prefs.rest_notifications_enabled = v;
        }
        if let Some(v) = self.fatigue_adjustment_enabled {
            prefs.fatigue_adjustment_enabled = v;
        }
    }

    /// Parse a single `key=value` assignment, e.g. from the command line.
    pub fn from_assignment(key: &str, value: &str) -> Result<Self, crate::error::ConfigError> {
        let bad_value = |e: String| crate::error::ConfigError::InvalidValue {
            key: key.to_string(),
            message: e,
        };
        let flag = || value.parse::<bool>().map_err(|e| bad_value(e.to_string()));
        let mut patch = Self::default();
        match key {
            "default_rest_time" => {
                patch.default_rest_time =
                    Some(value.parse::<u32>().map_err(|e| bad_value(e.to_string()))?)
            }
            "adaptive_enabled" => patch.adaptive_enabled = Some(flag()?),
            "auto_start" => patch.auto_start = Some(flag()?),
            "gesture_controls_enabled" => patch.gesture_controls_enabled = Some(flag()?),
            "rest_notifications_enabled" => patch.rest_notifications_enabled = Some(flag()?),
            "fatigue_adjustment_enabled" => patch.fatigue_adjustment_enabled = Some(flag()?),
            _ => return Err(crate::error::ConfigError::UnknownKey(key.to_string())),
        }
        Ok(patch)
    }
}

/// Read-mostly preferences shared by every timer in a session.
#[derive(Debug, Clone, Default)]
pub struct SharedPreferences {
    inner: Arc<RwLock<UserRestPreferences>>,
}

impl SharedPreferences {
    pub fn new(prefs: UserRestPreferences) -> Self {
        Self {
            inner: Arc::new(RwLock::new(prefs)),
        }
    }

    pub fn snapshot(&self) -> UserRestPreferences {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn replace(&self, prefs: UserRestPreferences) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = prefs;
    }

    /// Merge a patch and return the merged value.
    pub(crate) fn merge(&self, patch: &PreferencePatch) -> UserRestPreferences {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        patch.apply(&mut guard);
        guard.clone()
    }
}
