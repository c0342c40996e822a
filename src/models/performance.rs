use serde::{Deserialize, Serialize};

use super::exercise::{Effort, ExerciseMode, Prescription, RoundPerformance};
use crate::progression::{round_deltas, ProgressionOutcome, RoundDelta};

// ---------------------------------------------------------------------------
/// Progression Status: where one exercise-within-session stands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionStatus {
    /// Rounds validated, nothing compared yet
    #[default]
    Recorded,
    /// Compared against history, target not reached
    Evaluated,
    /// Target reached, suggested weight waiting for the user
    PendingConfirmation,
    /// Suggested weight saved as the next prescription
    Confirmed,
}

impl std::fmt::Display for ProgressionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recorded => write!(f, "recorded"),
            Self::Evaluated => write!(f, "evaluated"),
            Self::PendingConfirmation => write!(f, "pending_confirmation"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

impl std::str::FromStr for ProgressionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recorded" => Ok(Self::Recorded),
            "evaluated" => Ok(Self::Evaluated),
            "pending_confirmation" => Ok(Self::PendingConfirmation),
            "confirmed" => Ok(Self::Confirmed),
            _ => Err(format!("Unknown progression status: {}", s)),
        }
    }
}

/// Deltas versus the previous session's record for the same exercise.
/// Negative values are regressions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Improvement {
    pub reps: i64,
    pub weight: f64,
    pub time: f64,
    pub distance: f64,
    pub total_weight: f64,
}

// ---------------------------------------------------------------------------
/// Exercise Performance: one exercise within one completed session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePerformance {
    /// None until persisted
    pub id: Option<i64>,
    pub exercise_id: i64,
    pub mode: ExerciseMode,
    pub target: Prescription,
    pub performance_by_round: Vec<RoundPerformance>,
    /// Weight of the last completed round
    pub weight: f64,
    /// Primary measurement of the last completed round
    pub effort: Option<Effort>,
    pub target_reached: bool,
    pub improvement: Improvement,
    pub next_workout_weight: f64,
    pub personal_best: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_performance: Option<Vec<RoundPerformance>>,
    /// Per-round change against `previous_performance`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub round_deltas: Vec<RoundDelta>,
    pub status: ProgressionStatus,
}

impl ExercisePerformance {
    pub fn reps(&self) -> Option<u32> {
        self.effort.and_then(|e| e.reps())
    }

    pub fn time(&self) -> Option<f64> {
        self.effort.and_then(|e| e.time())
    }

    pub fn distance(&self) -> Option<f64> {
        self.effort.and_then(|e| e.distance())
    }

    pub fn is_completed(&self) -> bool {
        !self.performance_by_round.is_empty()
    }

    /// Sum of weight x reps over rep-based rounds
    pub fn volume(&self) -> f64 {
        self.performance_by_round.iter().map(|r| r.volume()).sum()
    }

    /// Keep the previous record's rounds alongside this one for display
    pub fn attach_previous(&mut self, previous: Option<&ExercisePerformance>) {
        self.round_deltas = previous
            .map(|p| round_deltas(&self.performance_by_round, &p.performance_by_round))
            .unwrap_or_default();
        self.previous_performance = previous.map(|p| p.performance_by_round.clone());
    }

    /// Store the calculator's verdict and move out of `Recorded`
    pub fn apply_outcome(&mut self, outcome: ProgressionOutcome, previous: Option<&ExercisePerformance>) {
        self.improvement = outcome.improvement;
        self.target_reached = outcome.target_reached;
        self.next_workout_weight = outcome.next_workout_weight;
        self.personal_best = outcome.personal_best;
        self.attach_previous(previous);
        self.status = if outcome.target_reached {
            ProgressionStatus::PendingConfirmation
        } else {
            ProgressionStatus::Evaluated
        };
    }
}
