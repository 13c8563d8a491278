//! Rest-time suggestions.
//!
//! [`compute_baseline`] picks the primary rest length for an interval;
//! [`generate_suggestions`] derives the ranked alternatives shown next to
//! it. Both are pure.

mod baseline;
mod engine;

pub use baseline::{BaselineSource, FixedBaseline, HistoricalSource};
pub use engine::{compute_baseline, generate_suggestions, SuggestionEngine, SuggestionSet};

use serde::{Deserialize, Serialize};

/// Shortest rest the engine will ever propose or allow.
pub const MIN_REST_SECS: u32 = 15;

/// At most this many suggestions are returned.
pub const MAX_SUGGESTIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionIcon {
    Flash,
    Checkmark,
    BatteryFull,
    Barbell,
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionColor {
    Green,
    Blue,
    Purple,
    Orange,
    Red,
}

/// One candidate rest duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestSuggestion {
    /// Seconds.
    pub time: u32,
    pub reason: String,
    pub icon: SuggestionIcon,
    pub color: SuggestionColor,
    /// 0.0 .. 1.0
    pub confidence: f64,
}
