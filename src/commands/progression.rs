//! Entry points for weight-increase confirmation and next-session prescriptions

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{ProgressError, ProgressResult};
use crate::models::{ExercisePrescription, Prescription, ProgressionStatus};
use crate::store;

/// Save the suggested weight from `session_id` as the user's next
/// prescription for the exercise.
///
/// Writes the value computed when the session was evaluated, never a fresh
/// +5%, so repeated calls leave the same prescription behind. Confirming an
/// older session after a newer one changes nothing and returns the weight
/// already prescribed.
pub async fn confirm_weight_increase(
    pool: &SqlitePool,
    exercise_id: i64,
    user_id: i64,
    session_id: i64,
) -> ProgressResult<f64> {
    let mut tx = pool.begin().await?;

    let perf = store::load_session_performance(&mut tx, session_id, user_id, exercise_id)
        .await?
        .ok_or_else(|| {
            ProgressError::NotFound(format!(
                "exercise {} in session {} for user {}",
                exercise_id, session_id, user_id
            ))
        })?;

    if !perf.target_reached {
        tracing::warn!(exercise_id, user_id, session_id, "weight increase requested without reaching target");
        return Err(ProgressError::NotEligibleForIncrease { exercise_id, session_id });
    }

    let saved =
        store::save_prescription(&mut tx, user_id, exercise_id, perf.next_workout_weight, session_id).await?;
    if !saved {
        tx.rollback().await?;
        tracing::warn!(exercise_id, user_id, session_id, "newer session already set the prescription");
        return store::load_prescription(pool, user_id, exercise_id)
            .await?
            .ok_or_else(|| ProgressError::NotFound(format!("prescription for exercise {}", exercise_id)));
    }

    if perf.status != ProgressionStatus::Confirmed {
        if let Some(performance_id) = perf.id {
            store::mark_confirmed(&mut tx, performance_id, Utc::now()).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        exercise_id,
        user_id,
        session_id,
        weight = perf.next_workout_weight,
        "Weight increase confirmed"
    );

    Ok(perf.next_workout_weight)
}

/// What the user should do for each exercise the next time they start a workout.
/// Confirmed prescriptions win over the exercise's baseline weight.
pub async fn prescribe_workout(
    pool: &SqlitePool,
    user_id: i64,
    workout_id: i64,
) -> ProgressResult<Vec<ExercisePrescription>> {
    let slots = store::load_workout_exercises(pool, workout_id).await?;
    if slots.is_empty() {
        return Err(ProgressError::NotFound(format!("workout {}", workout_id)));
    }

    let mut prescriptions = Vec::with_capacity(slots.len());
    for slot in slots {
        let confirmed = store::load_prescription(pool, user_id, slot.exercise.id).await?;

        prescriptions.push(ExercisePrescription {
            exercise_id: slot.exercise.id,
            name: slot.exercise.name,
            mode: slot.exercise.mode,
            target: Prescription {
                rounds: slot.target_rounds,
                reps: slot.target_reps,
                weight: confirmed.unwrap_or(slot.exercise.baseline_weight),
            },
            confirmed: confirmed.is_some(),
        });
    }

    Ok(prescriptions)
}
