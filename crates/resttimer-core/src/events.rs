use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// Every state change of a rest timer produces an event.
///
/// The timer never performs side effects itself; the dispatcher turns these
/// into haptic notifications and analytics records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Started {
        duration_secs: u32,
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    /// A tick left `remaining_secs` in the low-time window.
    LowTime {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    Stopped {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    Completed {
        suggested_time: u32,
        actual_time: u32,
        was_extended: bool,
        at: DateTime<Utc>,
    },
    Skipped {
        remaining_secs: u32,
        suggested_time: u32,
        actual_time: u32,
        was_extended: bool,
        at: DateTime<Utc>,
    },
    Adjusted {
        delta_secs: i64,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    Reset {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
}

/// Discrete tag delivered to the haptic/notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HapticEvent {
    Start,
    LowTimeTick,
    Stop,
    Complete,
    Skip,
    Adjust,
    Reset,
}

impl HapticEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::LowTimeTick => "low-time-tick",
            Self::Stop => "stop",
            Self::Complete => "complete",
            Self::Skip => "skip",
            Self::Adjust => "adjust",
            Self::Reset => "reset",
        }
    }
}

impl std::fmt::Display for HapticEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rest interval ended. Only terminal transitions have one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalOutcome {
    pub suggested_time: u32,
    pub actual_time: u32,
    pub was_skipped: bool,
    pub was_extended: bool,
}

impl TimerEvent {
    pub fn haptic(&self) -> HapticEvent {
        match self {
            Self::Started { .. } => HapticEvent::Start,
            Self::LowTime { .. } => HapticEvent::LowTimeTick,
            Self::Stopped { .. } => HapticEvent::Stop,
            Self::Completed { .. } => HapticEvent::Complete,
            Self::Skipped { .. } => HapticEvent::Skip,
            Self::Adjusted { .. } => HapticEvent::Adjust,
            Self::Reset { .. } => HapticEvent::Reset,
        }
    }

    pub fn outcome(&self) -> Option<IntervalOutcome> {
        match *self {
            Self::Completed {
                suggested_time,
                actual_time,
                was_extended,
                ..
            } => Some(IntervalOutcome {
                suggested_time,
                actual_time,
                was_skipped: false,
                was_extended,
            }),
            Self::Skipped {
                suggested_time,
                actual_time,
                was_extended,
                ..
            } => Some(IntervalOutcome {
                suggested_time,
                actual_time,
                was_skipped: true,
                was_extended,
            }),
            _ => None,
        }
    }
}
