//! Side-effect dispatch for timer events.
//!
//! [`EffectDispatcher`] is the only place where timer events leave the
//! state machine: haptic tags go to a [`HapticSink`], terminal events become
//! analytics records, and every event is broadcast to local observers.
//! Sink failures are logged and never reach the timer.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::analytics::{AnalyticsReporter, IntervalReport};
use crate::context::WorkoutContext;
use crate::error::SinkError;
use crate::events::{HapticEvent, TimerEvent};
use crate::preferences::SharedPreferences;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Haptic or notification output.
///
/// `notify` is called from the effect task, one event at a time. It should
/// hand off and return quickly: a slow sink delays later effects, though
/// never the countdown itself.
pub trait HapticSink: Send + Sync {
    /// Whether this platform can deliver haptics at all.
    fn supports_haptics(&self) -> bool {
        true
    }

    fn notify(&self, event: HapticEvent) -> Result<(), SinkError>;
}

/// Sink for platforms without haptics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHaptics;

impl HapticSink for NoopHaptics {
    fn supports_haptics(&self) -> bool {
        false
    }

    fn notify(&self, _event: HapticEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

pub struct EffectDispatcher {
    haptics: Arc<dyn HapticSink>,
    reporter: AnalyticsReporter,
    preferences: SharedPreferences,
    user_id: Option<String>,
    workout_id: Option<String>,
    context: Option<WorkoutContext>,
    performance_rating: Option<u8>,
    events: broadcast::Sender<TimerEvent>,
}

impl EffectDispatcher {
    pub fn new(
        haptics: Arc<dyn HapticSink>,
        reporter: AnalyticsReporter,
        preferences: SharedPreferences,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            haptics,
            reporter,
            preferences,
            user_id: None,
            workout_id: None,
            context: None,
            performance_rating: None,
            events,
        }
    }

    pub fn with_identity(mut self, user_id: Option<String>, workout_id: Option<String>) -> Self {
        self.user_id = user_id;
        self.workout_id = workout_id;
        self
    }

    /// Context attached to the records of the current interval.
    pub fn set_context(&mut self, context: Option<WorkoutContext>) {
        self.context = context;
    }

    pub fn context(&self) -> Option<&WorkoutContext> {
        self.context.as_ref()
    }

    /// Rating attached to the next terminal record, then cleared.
    pub fn set_performance_rating(&mut self, rating: Option<u8>) {
        self.performance_rating = rating.map(|r| r.clamp(1, 10));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    /// Sender side of the event stream, for handing out receivers after the
    /// dispatcher has moved into its own task.
    pub fn event_sender(&self) -> broadcast::Sender<TimerEvent> {
        self.events.clone()
    }

    pub fn dispatch(&mut self, events: &[TimerEvent]) {
        if events.is_empty() {
            return;
        }
        let notifications = self.preferences.snapshot().rest_notifications_enabled
            && self.haptics.supports_haptics();

        for event in events {
            let tag = event.haptic();
            tracing::debug!(event = tag.as_str(), "rest timer event");

            if notifications {
                if let Err(e) = self.haptics.notify(tag) {
                    tracing::warn!(event = tag.as_str(), error = %e, "haptic notification failed");
                }
            }

            if let Some(outcome) = event.outcome() {
                self.reporter.record(
                    self.user_id.as_deref(),
                    self.workout_id.as_deref(),
                    IntervalReport {
                        context: self.context.clone(),
                        suggested_time: outcome.suggested_time,
                        actual_time: outcome.actual_time,
                        was_skipped: outcome.was_skipped,
                        was_extended: outcome.was_extended,
                        performance_rating: self.performance_rating.take(),
                    },
                );
            }

            // no receivers is fine
            let _ = self.events.send(event.clone());
        }
    }
}
