use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::performance::ExercisePerformance;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkoutSession {
  pub id: i64,
  pub user_id: i64,
  pub workout_id: i64,
  pub started_at: DateTime<Utc>,
  pub completed_at: DateTime<Utc>,
  pub duration_seconds: i64,
}

/// For inserting new sessions (without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutSession {
  pub user_id: i64,
  pub workout_id: i64,
  pub started_at: DateTime<Utc>,
  pub completed_at: DateTime<Utc>,
}

impl NewWorkoutSession {
  /// Elapsed seconds, never negative
  pub fn duration_seconds(&self) -> u64 {
    (self.completed_at - self.started_at).num_seconds().max(0) as u64
  }
}

/// Session-level rollup. Derived on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSessionSummary {
  pub session_id: Option<i64>,
  /// Seconds
  pub total_duration: u64,
  pub total_weight_lifted: f64,
  pub exercises_completed: usize,
  pub ready_to_progress: usize,
  pub personal_bests: usize,
  /// Percent change against the previous session of the same workout
  pub weight_lifted_improvement: Option<f64>,
  pub exercises: Vec<ExercisePerformance>,
}
