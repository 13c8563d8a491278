use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{
    BaselineSource, RestSuggestion, SuggestionColor, SuggestionIcon, MAX_SUGGESTIONS,
    MIN_REST_SECS,
};
use crate::context::WorkoutContext;
use crate::preferences::UserRestPreferences;

/// Primary rest length for an interval.
///
/// The historical baseline wins when adaptive mode is on and it carries a
/// positive value. Otherwise the user's default applies. The result is
/// never below [`MIN_REST_SECS`].
pub fn compute_baseline(
    _context: &WorkoutContext,
    historical_baseline: Option<u32>,
    preferences: &UserRestPreferences,
) -> u32 {
    let base = match historical_baseline {
        Some(secs) if preferences.adaptive_enabled && secs > 0 => secs,
        _ => preferences.default_rest_time,
    };
    base.max(MIN_REST_SECS)
}

/// Ranked alternatives around `base_time`.
///
/// Sorted by confidence descending (stable, so ties keep derivation order)
/// and truncated to [`MAX_SUGGESTIONS`].
pub fn generate_suggestions(base_time: u32, context: &WorkoutContext) -> Vec<RestSuggestion> {
    let mut out = Vec::with_capacity(5);

    out.push(RestSuggestion {
        time: scale(base_time, 0.75),
        reason: "Quick recovery".into(),
        icon: SuggestionIcon::Flash,
        color: SuggestionColor::Green,
        confidence: if context.intensity < 7 { 0.8 } else { 0.4 },
    });
    out.push(RestSuggestion {
        time: base_time,
        reason: "Recommended".into(),
        icon: SuggestionIcon::Checkmark,
        color: SuggestionColor::Blue,
        confidence: 0.9,
    });
    out.push(RestSuggestion {
        time: scale(base_time, 1.25),
        reason: "Full recovery".into(),
        icon: SuggestionIcon::BatteryFull,
        color: SuggestionColor::Purple,
        confidence: if context.intensity > 7 { 0.9 } else { 0.6 },
    });
    if context.is_compound_movement {
        out.push(RestSuggestion {
            time: base_time.saturating_add(30).max(120),
            reason: "Compound movement".into(),
            icon: SuggestionIcon::Barbell,
            color: SuggestionColor::Orange,
            confidence: 0.85,
        });
    }
    if context.is_final_set() {
        out.push(RestSuggestion {
            time: scale(base_time, 1.5),
            reason: "Final set".into(),
            icon: SuggestionIcon::Flag,
            color: SuggestionColor::Red,
            confidence: 0.7,
        });
    }

    out.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
    out.truncate(MAX_SUGGESTIONS);
    out
}

fn scale(secs: u32, factor: f64) -> u32 {
    (secs as f64 * factor).round().min(u32::MAX as f64) as u32
}

/// Baseline plus the ranked alternatives derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub suggested_time: u32,
    /// True when the baseline came from history rather than the default.
    pub from_history: bool,
    pub suggestions: Vec<RestSuggestion>,
}

/// Fetches the historical baseline and runs the pure derivation.
pub struct SuggestionEngine {
    source: BaselineSource,
}

impl SuggestionEngine {
    pub fn new(source: BaselineSource) -> Self {
        Self { source }
    }

    /// Suggestions for `context`. Never fails: a failing historical source
    /// counts as "no signal".
    pub async fn suggest(
        &self,
        user_id: &str,
        context: &WorkoutContext,
        preferences: &UserRestPreferences,
    ) -> SuggestionSet {
        let historical = if preferences.adaptive_enabled {
            match self.source.optimal_rest_time(user_id, context).await {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        user_id,
                        exercise = %context.exercise_name,
                        error = %e,
                        "historical baseline unavailable, falling back to default"
                    );
                    None
                }
            }
        } else {
            None
        };
        let suggested_time = compute_baseline(context, historical, preferences);
        let from_history = preferences.adaptive_enabled && historical.is_some_and(|s| s > 0);
        tracing::debug!(
            exercise = %context.exercise_name,
            suggested_time,
            from_history,
            "computed rest baseline"
        );
        SuggestionSet {
            suggested_time,
            from_history,
            suggestions: generate_suggestions(suggested_time, context),
        }
    }
}
