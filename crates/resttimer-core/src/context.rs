use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Broad category of the exercise being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Strength,
    Hypertrophy,
    Power,
    Endurance,
    Cardio,
    Other,
}

impl std::str::FromStr for ExerciseType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strength" => Ok(Self::Strength),
            "hypertrophy" => Ok(Self::Hypertrophy),
            "power" => Ok(Self::Power),
            "endurance" => Ok(Self::Endurance),
            "cardio" => Ok(Self::Cardio),
            "other" => Ok(Self::Other),
            _ => Err(ValidationError::InvalidValue {
                field: "exercise_type".into(),
                message: format!("unknown exercise type '{s}'"),
            }),
        }
    }
}

/// Coarse time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket a 0-23 clock hour.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=21 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// Snapshot of the workout at the moment a rest interval begins.
///
/// Supplied by the caller on every set transition and treated as a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutContext {
    pub exercise_name: String,
    pub exercise_type: ExerciseType,
    /// 1-based index of the set just performed.
    pub set_number: u32,
    pub total_sets: u32,
    /// Fraction of the workout completed (0.0 .. 1.0).
    pub workout_progress: f64,
    pub is_compound_movement: bool,
    /// Perceived intensity, 1-10.
    pub intensity: u8,
    pub time_of_day: TimeOfDay,
    pub tends_to_skip_rests: bool,
}

impl WorkoutContext {
    pub fn is_final_set(&self) -> bool {
        self.set_number == self.total_sets
    }

    /// Check the numeric fields are in range.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=10).contains(&self.intensity) {
            return Err(invalid("intensity", format!("{} is outside 1-10", self.intensity)));
        }
        if self.set_number == 0 {
            return Err(invalid("set_number", "sets are numbered from 1".into()));
        }
        if self.set_number > self.total_sets {
            return Err(invalid(
                "set_number",
                format!("{} exceeds total_sets {}", self.set_number, self.total_sets),
            ));
        }
        if !(0.0..=1.0).contains(&self.workout_progress) {
            return Err(invalid(
                "workout_progress",
                format!("{} is outside 0.0-1.0", self.workout_progress),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: String) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        message,
    }
}

#[cfg(test)]
pub(crate) fn sample_context() -> WorkoutContext {
    WorkoutContext {
        exercise_name: "Bench Press".into(),
        exercise_type: ExerciseType::Strength,
        set_number: 1,
        total_sets: 3,
        workout_progress: 0.2,
        is_compound_movement: false,
        intensity: 5,
        time_of_day: TimeOfDay::Morning,
        tends_to_skip_rests: false,
    }
}
