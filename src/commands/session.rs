//! Entry points for finishing a workout and viewing its summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{ProgressError, ProgressResult};
use crate::models::{ExercisePerformance, NewWorkoutSession, WorkoutSessionSummary};
use crate::progression::evaluate_progression;
use crate::recorder::{record_performance, ExerciseInput};
use crate::store;
use crate::summary::summarize_session;

/// Workout-completion payload from the guided session flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteWorkout {
  pub user_id: i64,
  pub workout_id: i64,
  pub started_at: DateTime<Utc>,
  pub completed_at: DateTime<Utc>,
  pub exercises: Vec<ExerciseInput>,
}

/// Record, evaluate and persist a finished workout, returning its summary
pub async fn complete_workout(pool: &SqlitePool, request: CompleteWorkout) -> ProgressResult<WorkoutSessionSummary> {
  if request.completed_at < request.started_at {
    return Err(ProgressError::InvalidPerformanceData(
      "workout completed before it started".to_string(),
    ));
  }

  let slots = store::load_workout_exercises(pool, request.workout_id).await?;
  if slots.is_empty() {
    return Err(ProgressError::NotFound(format!("workout {}", request.workout_id)));
  }

  // Record: validate everything before touching history
  let mut recorded: Vec<(i64, ExercisePerformance)> = Vec::with_capacity(request.exercises.len());
  for mut input in request.exercises {
    let slot = slots
      .iter()
      .find(|s| s.exercise.id == input.exercise_id)
      .ok_or_else(|| {
        ProgressError::InvalidPerformanceData(format!(
          "exercise {} is not part of workout {}",
          input.exercise_id, request.workout_id
        ))
      })?;

    if recorded.iter().any(|(_, p)| p.exercise_id == input.exercise_id) {
      return Err(ProgressError::InvalidPerformanceData(format!(
        "exercise {} submitted twice",
        input.exercise_id
      )));
    }

    // Rounds and reps come from the workout definition, never the client
    if input.target.rounds != slot.target_rounds || input.target.reps != slot.target_reps {
      return Err(ProgressError::InvalidPerformanceData(format!(
        "exercise {} target {}x{} does not match workout target {}x{}",
        input.exercise_id, input.target.rounds, input.target.reps, slot.target_rounds, slot.target_reps
      )));
    }
    let prescribed = store::load_prescription(pool, request.user_id, input.exercise_id)
      .await?
      .unwrap_or(slot.exercise.baseline_weight);
    input.target.weight = prescribed;

    let perf = record_performance(input, slot.exercise.mode).map_err(|e| {
      tracing::warn!(user_id = request.user_id, error = %e, "rejected workout payload");
      e
    })?;
    recorded.push((slot.position, perf));
  }
  recorded.sort_by_key(|(position, _)| *position);

  // History reads are independent; both must finish before evaluating
  let exercise_ids: Vec<i64> = recorded.iter().map(|(_, p)| p.exercise_id).collect();
  let (previous, previous_total) = tokio::try_join!(
    load_previous_performances(pool, request.user_id, &exercise_ids, request.completed_at),
    store::load_previous_session_total(pool, request.user_id, request.workout_id, request.completed_at),
  )?;

  for ((_, perf), prev) in recorded.iter_mut().zip(previous.iter()) {
    let outcome = evaluate_progression(perf, prev.as_ref())?;
    perf.apply_outcome(outcome, prev.as_ref());
  }

  let session = NewWorkoutSession {
    user_id: request.user_id,
    workout_id: request.workout_id,
    started_at: request.started_at,
    completed_at: request.completed_at,
  };

  let mut tx = pool.begin().await?;
  let session_id = store::insert_session(&mut tx, &session).await?;
  for (position, perf) in recorded.iter_mut() {
    perf.id = Some(store::insert_performance(&mut tx, session_id, request.user_id, *position, perf).await?);
  }
  tx.commit().await?;

  let exercises: Vec<ExercisePerformance> = recorded.into_iter().map(|(_, p)| p).collect();
  let summary = summarize_session(Some(session_id), exercises, session.duration_seconds(), previous_total);

  tracing::info!(
    session_id,
    user_id = request.user_id,
    workout_id = request.workout_id,
    total_weight_lifted = summary.total_weight_lifted,
    ready_to_progress = summary.ready_to_progress,
    "Workout completed"
  );

  Ok(summary)
}

/// Rebuild the summary of a stored session
pub async fn get_session_summary(pool: &SqlitePool, session_id: i64) -> ProgressResult<WorkoutSessionSummary> {
  let session = store::load_session(pool, session_id).await?;

  let (mut exercises, previous_total) = tokio::try_join!(
    store::load_session_performances(pool, session_id),
    store::load_previous_session_total(pool, session.user_id, session.workout_id, session.completed_at),
  )?;

  // Previous rounds are display-only, so they are looked up rather than stored
  for perf in exercises.iter_mut() {
    let prev = store::load_previous_performance(pool, session.user_id, perf.exercise_id, session.completed_at).await?;
    perf.attach_previous(prev.as_ref());
  }

  Ok(summarize_session(
    Some(session.id),
    exercises,
    session.duration_seconds.max(0) as u64,
    previous_total,
  ))
}

async fn load_previous_performances(
  pool: &SqlitePool,
  user_id: i64,
  exercise_ids: &[i64],
  before: DateTime<Utc>,
) -> ProgressResult<Vec<Option<ExercisePerformance>>> {
  let mut previous = Vec::with_capacity(exercise_ids.len());
  for exercise_id in exercise_ids {
    previous.push(store::load_previous_performance(pool, user_id, *exercise_id, before).await?);
  }
  Ok(previous)
}
