//! # Rest Timer Core Library
//!
//! Core logic for an adaptive rest timer used between exercise sets. The
//! library computes a context-sensitive rest duration, runs the countdown,
//! and reports how each rest interval was actually used. A standalone CLI
//! drives the same library.
//!
//! ## Architecture
//!
//! - **Suggestion Engine**: pure derivation of a baseline and ranked
//!   alternatives from the workout context and a historical signal
//! - **Rest Timer**: an effect-free countdown state machine; commands return
//!   events instead of performing side effects
//! - **Driver**: a tokio-backed handle that owns one tick subscription per
//!   running timer
//! - **Adapters**: preference gateway, haptic sink, analytics reporter and a
//!   JSON-lines history used as the historical baseline
//!
//! ## Key Components
//!
//! - [`RestTimer`]: Countdown state machine
//! - [`RestTimerHandle`]: Tick-driven, thread-safe handle around it
//! - [`RestSession`]: Per-workout orchestration
//! - [`PreferenceGateway`]: Preference loading with default fallback
//! - [`AnalyticsReporter`]: Best-effort interval records

pub mod analytics;
pub mod clock;
pub mod context;
pub mod effects;
pub mod error;
pub mod events;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod suggestion;
pub mod timer;

pub use analytics::{
    AnalyticsReporter, AnalyticsSink, ChannelAnalyticsSink, IntervalReport, RestRecord,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use context::{ExerciseType, TimeOfDay, WorkoutContext};
pub use effects::{EffectDispatcher, HapticSink, NoopHaptics};
pub use error::{ConfigError, CoreError, SinkError, StoreError, ValidationError};
pub use events::{HapticEvent, IntervalOutcome, TimerEvent};
pub use preferences::{
    JsonFilePreferenceStore, MemoryPreferenceStore, PendingWrite, PreferenceGateway,
    PreferencePatch, PreferenceStore, SharedPreferences, UserRestPreferences,
};
pub use session::{Collaborators, RestSession, SessionConfig};
pub use storage::{Config, HistoryBaselineSource, HistoryLog};
pub use suggestion::{
    compute_baseline, generate_suggestions, FixedBaseline, HistoricalSource, RestSuggestion,
    SuggestionEngine, SuggestionSet,
};
pub use timer::{RestTimer, RestTimerHandle, TimerMode, TimerPhase, TimerState};
