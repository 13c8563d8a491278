//! One user's rest timing for one workout.
//!
//! Wires the preference gateway, the suggestion engine and a timer handle
//! together. Each completed set calls [`RestSession::begin_rest`] with the
//! new context.

use std::sync::Arc;
use std::time::Duration;

use crate::analytics::AnalyticsReporter;
use crate::clock::Clock;
use crate::context::WorkoutContext;
use crate::effects::{EffectDispatcher, HapticSink};
use crate::error::Result;
use crate::preferences::{
    PendingWrite, PreferenceGateway, PreferencePatch, PreferenceStore, UserRestPreferences,
};
use crate::suggestion::{BaselineSource, SuggestionEngine, SuggestionSet};
use crate::timer::{RestTimer, RestTimerHandle, DEFAULT_LOW_TIME_THRESHOLD_SECS};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_id: String,
    pub workout_id: Option<String>,
    pub tick_period: Duration,
    pub low_time_threshold_secs: u32,
}

impl SessionConfig {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            workout_id: None,
            tick_period: Duration::from_secs(1),
            low_time_threshold_secs: DEFAULT_LOW_TIME_THRESHOLD_SECS,
        }
    }

    pub fn with_workout(mut self, workout_id: impl Into<String>) -> Self {
        self.workout_id = Some(workout_id.into());
        self
    }
}

/// External collaborators a session talks to.
pub struct Collaborators {
    pub preferences: Arc<dyn PreferenceStore>,
    pub baseline: BaselineSource,
    pub haptics: Arc<dyn HapticSink>,
    pub analytics: AnalyticsReporter,
    pub clock: Arc<dyn Clock>,
}

pub struct RestSession {
    user_id: String,
    gateway: PreferenceGateway,
    engine: SuggestionEngine,
    timer: RestTimerHandle,
}

impl RestSession {
    /// Load the user's preferences and build an idle timer.
    ///
    /// # Errors
    ///
    /// Fails only when no tokio runtime is available.
    pub async fn open(config: SessionConfig, parts: Collaborators) -> Result<Self> {
        let gateway = PreferenceGateway::new(parts.preferences);
        let prefs = gateway.load(&config.user_id).await;

        let timer = RestTimer::new(parts.clock, prefs.default_rest_time)
            .with_low_time_threshold(config.low_time_threshold_secs);
        let dispatcher = EffectDispatcher::new(parts.haptics, parts.analytics, gateway.shared())
            .with_identity(Some(config.user_id.clone()), config.workout_id.clone());
        let timer = RestTimerHandle::new(timer, dispatcher, config.tick_period)?;

        tracing::debug!(
            user_id = %config.user_id,
            workout_id = ?config.workout_id,
            "rest session opened"
        );
        Ok(Self {
            user_id: config.user_id,
            gateway,
            engine: SuggestionEngine::new(parts.baseline),
            timer,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn timer(&self) -> &RestTimerHandle {
        &self.timer
    }

    pub fn preferences(&self) -> UserRestPreferences {
        self.gateway.current()
    }

    /// Update preferences; see [`PreferenceGateway::save`].
    pub fn update_preferences(&self, patch: &PreferencePatch) -> Option<PendingWrite> {
        self.gateway.save(&self.user_id, patch)
    }

    /// Pin an explicit countdown length, or clear it with `None`.
    pub fn pin_initial_time(&self, initial_time: Option<u32>) {
        self.timer.pin_initial_time(initial_time);
    }

    /// Start a new rest interval after a set.
    ///
    /// Computes suggestions, reseeds the timer (unless pinned) and starts it
    /// when the user has auto-start enabled.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range context.
    pub async fn begin_rest(&self, context: WorkoutContext) -> Result<SuggestionSet> {
        context.validate()?;
        let prefs = self.gateway.current();
        let set = self.engine.suggest(&self.user_id, &context, &prefs).await;

        self.timer.begin_interval(context, set.suggested_time, set.from_history);
        if prefs.auto_start {
            self.timer.start(None);
        }
        Ok(set)
    }
}
