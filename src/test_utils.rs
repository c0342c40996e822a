//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Seeders for exercises, workouts and past sessions
//! - Mock performance factories
//! - Helper assertions

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::models::{Effort, ExerciseMode, ExercisePerformance, NewWorkoutSession, Prescription};
use crate::recorder::{record_performance, ExerciseInput, RoundInput};
use crate::store;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Insert an exercise definition, returning its id
pub async fn seed_test_exercise(pool: &SqlitePool, name: &str, mode: ExerciseMode, baseline_weight: f64) -> i64 {
  sqlx::query("INSERT INTO exercises (name, mode, baseline_weight) VALUES (?1, ?2, ?3)")
    .bind(name)
    .bind(mode.as_str())
    .bind(baseline_weight)
    .execute(pool)
    .await
    .expect("Failed to seed exercise")
    .last_insert_rowid()
}

/// Insert a workout with `(exercise_id, target_rounds, target_reps)` slots in order
pub async fn seed_test_workout(pool: &SqlitePool, name: &str, slots: &[(i64, u32, u32)]) -> i64 {
  let workout_id = sqlx::query("INSERT INTO workouts (name) VALUES (?1)")
    .bind(name)
    .execute(pool)
    .await
    .expect("Failed to seed workout")
    .last_insert_rowid();

  for (position, (exercise_id, rounds, reps)) in slots.iter().enumerate() {
    sqlx::query(
      r#"
      INSERT INTO workout_exercises (workout_id, exercise_id, position, target_rounds, target_reps)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(workout_id)
    .bind(*exercise_id)
    .bind(position as i64)
    .bind(*rounds)
    .bind(*reps)
    .execute(pool)
    .await
    .expect("Failed to seed workout exercise");
  }

  workout_id
}

/// Store a finished session half an hour long, returning its id
pub async fn seed_test_session(
  pool: &SqlitePool,
  user_id: i64,
  workout_id: i64,
  completed_at: DateTime<Utc>,
  performances: &[ExercisePerformance],
) -> i64 {
  let session = NewWorkoutSession {
    user_id,
    workout_id,
    started_at: completed_at - Duration::minutes(30),
    completed_at,
  };

  let mut tx = pool.begin().await.expect("Failed to begin");
  let session_id = store::insert_session(&mut tx, &session)
    .await
    .expect("Failed to seed session");
  for (position, perf) in performances.iter().enumerate() {
    store::insert_performance(&mut tx, session_id, user_id, position as i64, perf)
      .await
      .expect("Failed to seed performance");
  }
  tx.commit().await.expect("Failed to commit seed session");

  session_id
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Recorded exercise with one `(weight, effort)` per round, in order
pub fn mock_performance(
  exercise_id: i64,
  mode: ExerciseMode,
  rounds: &[(f64, Effort)],
  target_reps: u32,
) -> ExercisePerformance {
  let inputs = rounds
    .iter()
    .enumerate()
    .map(|(idx, (weight, effort))| RoundInput {
      round: idx as u32 + 1,
      weight: *weight,
      reps: effort.reps(),
      time: effort.time(),
      distance: effort.distance(),
    })
    .collect();

  let input = ExerciseInput {
    exercise_id,
    target: Prescription {
      rounds: rounds.len().max(3) as u32,
      reps: target_reps,
      weight: rounds.first().map(|(w, _)| *w).unwrap_or(0.0),
    },
    rounds: inputs,
  };

  record_performance(input, mode).expect("mock performance should be valid")
}

/// Single-round REPS exercise
pub fn mock_reps_performance(exercise_id: i64, weight: f64, reps: u32, target_reps: u32) -> ExercisePerformance {
  mock_performance(exercise_id, ExerciseMode::Reps, &[(weight, Effort::Reps(reps))], target_reps)
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Fixed, whole-second timestamps so ordering in SQLite is unambiguous
pub fn at_minute(minutes: i64) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff: f64 = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('exercises', 'workout_sessions', 'exercise_performances', 'exercise_prescriptions')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4, "Expected 4 tables, got {:?}", tables);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_session_stores_performances() {
    let pool = setup_test_db().await;
    let squat = seed_test_exercise(&pool, "Back Squat", ExerciseMode::Reps, 40.0).await;
    let workout = seed_test_workout(&pool, "Legs", &[(squat, 3, 8)]).await;

    seed_test_session(&pool, 1, workout, at_minute(0), &[mock_reps_performance(squat, 40.0, 8, 8)]).await;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercise_performances")
      .fetch_one(&pool)
      .await
      .expect("Failed to count performances");
    assert_eq!(count, 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let perf = mock_reps_performance(3, 80.0, 6, 8);
    assert_eq!(perf.exercise_id, 3);
    assert_eq!(perf.weight, 80.0);
    assert_eq!(perf.reps(), Some(6));
    assert_eq!(perf.target.reps, 8);

    let timed = mock_performance(4, ExerciseMode::Time, &[(0.0, Effort::Time(30.0)), (0.0, Effort::Time(25.0))], 0);
    assert_eq!(timed.performance_by_round.len(), 2);
    assert_eq!(timed.time(), Some(25.0));
  }

  #[test]
  fn test_time_helper_is_ordered() {
    assert!(at_minute(0) < at_minute(1));
    assert_eq!((at_minute(90) - at_minute(0)).num_minutes(), 90);
  }
}
