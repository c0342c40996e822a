use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

// ---------------------------------------------------------------------------
/// Exercise Mode: which measurement is primary for an exercise
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseMode {
    /// Strength work counted in repetitions
    Reps,
    /// Held or timed work, measured in seconds
    Time,
    /// Covered distance, measured in metres
    Distance,
}

impl ExerciseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reps => "REPS",
            Self::Time => "TIME",
            Self::Distance => "DISTANCE",
        }
    }
}

impl std::fmt::Display for ExerciseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExerciseMode {
    type Err = ProgressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REPS" => Ok(Self::Reps),
            "TIME" => Ok(Self::Time),
            "DISTANCE" => Ok(Self::Distance),
            _ => Err(ProgressError::InvalidPerformanceData(format!(
                "Unknown exercise mode: {}",
                s
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
/// Effort: the primary measurement of one round, keyed by mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effort {
    Reps(u32),
    /// Seconds
    Time(f64),
    /// Metres
    Distance(f64),
}

impl Effort {
    pub fn mode(&self) -> ExerciseMode {
        match self {
            Effort::Reps(_) => ExerciseMode::Reps,
            Effort::Time(_) => ExerciseMode::Time,
            Effort::Distance(_) => ExerciseMode::Distance,
        }
    }

    pub fn reps(&self) -> Option<u32> {
        match self {
            Effort::Reps(r) => Some(*r),
            _ => None,
        }
    }

    pub fn time(&self) -> Option<f64> {
        match self {
            Effort::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn distance(&self) -> Option<f64> {
        match self {
            Effort::Distance(d) => Some(*d),
            _ => None,
        }
    }

    /// The primary metric as a plain number, whatever the mode
    pub fn value(&self) -> f64 {
        match self {
            Effort::Reps(r) => *r as f64,
            Effort::Time(t) => *t,
            Effort::Distance(d) => *d,
        }
    }
}

/// One attempt within a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundPerformance {
    /// 1-based index within the exercise's target rounds
    pub round: u32,
    pub weight: f64,
    pub effort: Effort,
}

impl RoundPerformance {
    /// Volume contributed to "weight lifted"; only rep-based rounds count
    pub fn volume(&self) -> f64 {
        match self.effort {
            Effort::Reps(reps) => self.weight * reps as f64,
            _ => 0.0,
        }
    }
}

/// What the user was asked to do for one exercise in one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub rounds: u32,
    pub reps: u32,
    pub weight: f64,
}

/// Exercise definition row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub mode: ExerciseMode,
    /// Weight prescribed on a user's first attempt
    pub baseline_weight: f64,
}

/// An exercise slot within a workout definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub workout_id: i64,
    pub exercise: Exercise,
    pub position: i64,
    pub target_rounds: u32,
    pub target_reps: u32,
}

/// Prescription handed to the user when a workout starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisePrescription {
    pub exercise_id: i64,
    pub name: String,
    pub mode: ExerciseMode,
    pub target: Prescription,
    /// True when the weight comes from a confirmed increase rather than the baseline
    pub confirmed: bool,
}
