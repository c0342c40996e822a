//! Error type shared by the recorder, calculator, store and commands

use serde::{Deserialize, Serialize};

pub type ProgressResult<T> = Result<T, ProgressError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ProgressError {
  /// Malformed round data: out-of-order, duplicated or missing rounds,
  /// or a primary measurement that does not match the exercise mode
  #[error("Invalid performance data: {0}")]
  InvalidPerformanceData(String),

  #[error("Invalid weight: {0} (must be finite and non-negative)")]
  InvalidWeight(f64),

  #[error("Exercise {exercise_id} in session {session_id} did not reach its target")]
  NotEligibleForIncrease { exercise_id: i64, session_id: i64 },

  #[error("Previous session lookup failed: {0}")]
  PreviousSessionLookupFailed(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Database error: {0}")]
  Database(String),

  #[error("Configuration error: {0}")]
  Config(String),
}

impl From<sqlx::Error> for ProgressError {
  fn from(e: sqlx::Error) -> Self {
    ProgressError::Database(e.to_string())
  }
}

impl From<sqlx::migrate::MigrateError> for ProgressError {
  fn from(e: sqlx::migrate::MigrateError) -> Self {
    ProgressError::Database(format!("migration failed: {}", e))
  }
}
