//! Helpers shared by the CLI commands.

use chrono::Timelike;
use clap::Args;
use std::io::Write;
use std::sync::Arc;

use resttimer_core::storage::data_dir;
use resttimer_core::{
    ExerciseType, HapticEvent, HapticSink, JsonFilePreferenceStore, SinkError, TimeOfDay,
    WorkoutContext,
};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Workout context flags shared by `suggest` and `run`.
#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// Exercise name
    #[arg(long, default_value = "Exercise")]
    pub exercise: String,
    /// Exercise type (strength, hypertrophy, power, endurance, cardio, other)
    #[arg(long = "type", default_value = "strength")]
    pub exercise_type: ExerciseType,
    /// Set just completed (1-based)
    #[arg(long, default_value = "1")]
    pub set: u32,
    /// Total sets for this exercise
    #[arg(long, default_value = "3")]
    pub total_sets: u32,
    /// Fraction of the workout completed (0.0-1.0)
    #[arg(long, default_value = "0.0")]
    pub progress: f64,
    /// Exercise is a compound movement
    #[arg(long)]
    pub compound: bool,
    /// Intensity rating 1-10
    #[arg(long, default_value = "5")]
    pub intensity: u8,
    /// User tends to skip rests
    #[arg(long)]
    pub skips_rests: bool,
}

impl ContextArgs {
    pub fn to_context(&self) -> WorkoutContext {
        WorkoutContext {
            exercise_name: self.exercise.clone(),
            exercise_type: self.exercise_type,
            set_number: self.set,
            total_sets: self.total_sets,
            workout_progress: self.progress,
            is_compound_movement: self.compound,
            intensity: self.intensity,
            time_of_day: TimeOfDay::from_hour(chrono::Local::now().hour()),
            tends_to_skip_rests: self.skips_rests,
        }
    }
}

pub fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

pub fn preference_store() -> CliResult<Arc<JsonFilePreferenceStore>> {
    Ok(Arc::new(JsonFilePreferenceStore::new(data_dir()?)))
}

/// Terminal bell in place of a vibration motor.
pub struct TerminalHaptics;

impl HapticSink for TerminalHaptics {
    fn notify(&self, event: HapticEvent) -> Result<(), SinkError> {
        if matches!(event, HapticEvent::LowTimeTick | HapticEvent::Complete) {
            let mut err = std::io::stderr();
            err.write_all(b"\x07")
                .and_then(|_| err.flush())
                .map_err(|e| SinkError::DeliveryFailed {
                    sink: "terminal".into(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }
}
