//! Rest countdown state machine.
//!
//! The timer is a pure in-memory state machine. It never sleeps and never
//! performs side effects: every command returns the [`TimerEvent`]s it
//! produced, and something else (see [`RestTimerHandle`]) is responsible for
//! delivering ticks and dispatching events.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Completed | Skipped)
//!           |
//!           +-> Idle   (stop / reset)
//! ```
//!
//! ## Tick subscriptions
//!
//! `start()` mints a fresh [`TickSubscription`]; `stop()`, `skip()`,
//! `reset()` and completion drop it. `tick()` only acts when handed the
//! currently active subscription, so a stale ticker can never decrement the
//! countdown.
//!
//! [`RestTimerHandle`]: super::RestTimerHandle

use chrono::Utc;
use std::sync::Arc;

use super::state::{TimerMode, TimerPhase, TimerState};
use crate::clock::Clock;
use crate::events::TimerEvent;
use crate::suggestion::MIN_REST_SECS;

/// Ticks at or below this many remaining seconds emit a low-time event.
pub const DEFAULT_LOW_TIME_THRESHOLD_SECS: u32 = 10;

/// Token identifying one run of the tick source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickSubscription(u64);

pub struct RestTimer {
    clock: Arc<dyn Clock>,
    phase: TimerPhase,
    current_time: u32,
    suggested_time: u32,
    pinned_time: Option<u32>,
    mode: TimerMode,
    /// Clock reading at the last `start()`.
    started_at_ms: Option<u64>,
    /// User added time during this interval.
    extended: bool,
    subscription: Option<TickSubscription>,
    next_subscription: u64,
    low_time_threshold: u32,
}

impl std::fmt::Debug for RestTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTimer")
            .field("phase", &self.phase)
            .field("current_time", &self.current_time)
            .field("suggested_time", &self.suggested_time)
            .field("pinned_time", &self.pinned_time)
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

impl RestTimer {
    /// Create an idle timer seeded with `suggested_time` seconds.
    pub fn new(clock: Arc<dyn Clock>, suggested_time: u32) -> Self {
        Self {
            clock,
            phase: TimerPhase::Idle,
            current_time: suggested_time,
            suggested_time,
            pinned_time: None,
            mode: TimerMode::Auto,
            started_at_ms: None,
            extended: false,
            subscription: None,
            next_subscription: 0,
            low_time_threshold: DEFAULT_LOW_TIME_THRESHOLD_SECS,
        }
    }

    pub fn with_low_time_threshold(mut self, secs: u32) -> Self {
        self.low_time_threshold = secs;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        TimerState {
            phase: self.phase,
            current_time: self.current_time,
            is_running: self.is_running(),
            is_completed: self.is_completed(),
            suggested_time: self.suggested_time,
            actual_start_time: self.started_at_ms.map(|ms| ms / 1000).unwrap_or(0),
            mode: self.mode,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn current_time(&self) -> u32 {
        self.current_time
    }

    pub fn suggested_time(&self) -> u32 {
        self.suggested_time
    }

    pub fn pinned_time(&self) -> Option<u32> {
        self.pinned_time
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn is_completed(&self) -> bool {
        self.phase.is_terminal()
    }

    /// The subscription ticks must present, if the countdown is live.
    pub fn subscription(&self) -> Option<TickSubscription> {
        self.subscription
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start (or restart) the countdown.
    ///
    /// Uses `custom_time` when given, otherwise continues from the current
    /// value. A countdown sitting at zero is reseeded from the pinned time or
    /// the suggestion.
    pub fn start(&mut self, custom_time: Option<u32>) -> Vec<TimerEvent> {
        let seed = match custom_time {
            Some(secs) => secs,
            None if self.current_time == 0 => self.pinned_time.unwrap_or(self.suggested_time),
            None => self.current_time,
        };
        if self.phase.is_terminal() {
            self.extended = false;
        }
        self.current_time = seed;
        self.phase = TimerPhase::Running;
        self.started_at_ms = Some(self.clock.now_ms());
        self.next_subscription += 1;
        self.subscription = Some(TickSubscription(self.next_subscription));
        vec![TimerEvent::Started {
            duration_secs: seed,
            mode: self.mode,
            at: Utc::now(),
        }]
    }

    /// Advance the countdown by one second.
    ///
    /// Ignored unless the timer is running under `subscription`.
    pub fn tick(&mut self, subscription: TickSubscription) -> Vec<TimerEvent> {
        if self.phase != TimerPhase::Running || self.subscription != Some(subscription) {
            return Vec::new();
        }
        self.current_time = self.current_time.saturating_sub(1);
        if self.current_time == 0 {
            return vec![self.complete()];
        }
        if self.current_time <= self.low_time_threshold {
            return vec![TimerEvent::LowTime {
                remaining_secs: self.current_time,
                at: Utc::now(),
            }];
        }
        Vec::new()
    }

    /// Halt the countdown, keeping the remaining time.
    pub fn stop(&mut self) -> Vec<TimerEvent> {
        self.subscription = None;
        if self.phase == TimerPhase::Running {
            self.phase = TimerPhase::Idle;
        }
        vec![TimerEvent::Stopped {
            remaining_secs: self.current_time,
            at: Utc::now(),
        }]
    }

    /// End the interval early.
    ///
    /// A timer that already completed or was skipped is left untouched so
    /// an interval is never reported twice.
    pub fn skip(&mut self) -> Vec<TimerEvent> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        self.subscription = None;
        let remaining_secs = self.current_time;
        self.current_time = 0;
        self.phase = TimerPhase::Skipped;
        let actual_time = self.elapsed_secs();
        vec![TimerEvent::Skipped {
            remaining_secs,
            suggested_time: self.suggested_time,
            actual_time,
            was_extended: self.was_extended(actual_time),
            at: Utc::now(),
        }]
    }

    /// Add (or remove) time. Never drops below the minimum rest.
    pub fn adjust(&mut self, delta_secs: i64) -> Vec<TimerEvent> {
        let target = (self.current_time as i64)
            .saturating_add(delta_secs)
            .max(MIN_REST_SECS as i64)
            .min(u32::MAX as i64);
        self.current_time = target as u32;
        if delta_secs > 0 {
            self.extended = true;
        }
        vec![TimerEvent::Adjusted {
            delta_secs,
            remaining_secs: self.current_time,
            at: Utc::now(),
        }]
    }

    /// Return to idle with `new_time` (or the suggestion) on the clock.
    pub fn reset(&mut self, new_time: Option<u32>) -> Vec<TimerEvent> {
        self.subscription = None;
        self.current_time = new_time.unwrap_or(self.suggested_time);
        self.phase = TimerPhase::Idle;
        self.started_at_ms = None;
        self.extended = false;
        vec![TimerEvent::Reset {
            remaining_secs: self.current_time,
            at: Utc::now(),
        }]
    }

    /// Pin (or unpin) an explicit countdown length.
    ///
    /// While pinned, new suggestions only refresh `suggested_time`.
    pub fn pin_initial_time(&mut self, initial_time: Option<u32>) {
        self.pinned_time = initial_time;
        match initial_time {
            Some(secs) => {
                self.mode = TimerMode::Manual;
                if self.phase != TimerPhase::Running {
                    self.current_time = secs;
                }
            }
            None if self.mode == TimerMode::Manual => self.mode = TimerMode::Auto,
            None => {}
        }
    }

    /// Take a freshly computed suggestion for a new rest interval.
    ///
    /// Unpinned timers are reset onto the suggestion; pinned timers keep
    /// their countdown and only record the new value for display.
    pub fn apply_suggestion(
        &mut self,
        suggested_time: u32,
        from_history: bool,
    ) -> Vec<TimerEvent> {
        self.suggested_time = suggested_time;
        if self.pinned_time.is_some() {
            self.mode = TimerMode::Manual;
            return Vec::new();
        }
        self.mode = if from_history {
            TimerMode::Adaptive
        } else {
            TimerMode::Auto
        };
        self.reset(None)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> TimerEvent {
        self.subscription = None;
        self.phase = TimerPhase::Completed;
        let actual_time = self.elapsed_secs();
        TimerEvent::Completed {
            suggested_time: self.suggested_time,
            actual_time,
            was_extended: self.was_extended(actual_time),
            at: Utc::now(),
        }
    }

    fn elapsed_secs(&self) -> u32 {
        let Some(started) = self.started_at_ms else {
            return 0;
        };
        let elapsed_ms = self.clock.now_ms().saturating_sub(started);
        (elapsed_ms.saturating_add(500) / 1000).min(u32::MAX as u64) as u32
    }

    fn was_extended(&self, actual_time: u32) -> bool {
        self.extended || actual_time > self.suggested_time
    }
}
