mod driver;
mod engine;
mod state;

pub use driver::RestTimerHandle;
pub use engine::{RestTimer, TickSubscription, DEFAULT_LOW_TIME_THRESHOLD_SECS};
pub use state::{TimerMode, TimerPhase, TimerState};
