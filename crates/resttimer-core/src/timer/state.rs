use serde::{Deserialize, Serialize};

/// How the current countdown length was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Seeded from the user's default rest time.
    Auto,
    /// Pinned by an explicit initial time.
    Manual,
    /// Seeded from the historical baseline.
    Adaptive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Completed,
    Skipped,
}

impl TimerPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

/// Read-only snapshot of a rest timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: TimerPhase,
    /// Seconds left in the countdown.
    pub current_time: u32,
    pub is_running: bool,
    pub is_completed: bool,
    pub suggested_time: u32,
    /// Clock seconds at the last `start()`, 0 if never started.
    pub actual_start_time: u64,
    pub mode: TimerMode,
}
