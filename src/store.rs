//! SQLite persistence for sessions, performances and prescriptions
//!
//! Reads take the pool; writes that must land together take a connection so
//! callers can run them inside one transaction.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::error::{ProgressError, ProgressResult};
use crate::models::{
    Exercise, ExerciseMode, ExercisePerformance, Improvement, NewWorkoutSession, Prescription,
    ProgressionStatus, RoundPerformance, WorkoutExercise, WorkoutSession,
};
use crate::summary::total_weight_lifted;

const PERFORMANCE_COLUMNS: &str = r#"
    p.id, p.exercise_id, p.mode, p.target_rounds, p.target_reps, p.target_weight,
    p.rounds_json, p.weight, p.target_reached, p.improvement_json,
    p.next_workout_weight, p.personal_best, p.status
"#;

fn performance_from_row(row: &SqliteRow) -> ProgressResult<ExercisePerformance> {
    let mode: ExerciseMode = row.try_get::<String, _>("mode")?.parse()?;

    let rounds_json: String = row.try_get("rounds_json")?;
    let performance_by_round: Vec<RoundPerformance> = serde_json::from_str(&rounds_json)
        .map_err(|e| ProgressError::Database(format!("Failed to parse rounds: {}", e)))?;

    let improvement_json: String = row.try_get("improvement_json")?;
    let improvement: Improvement = serde_json::from_str(&improvement_json)
        .map_err(|e| ProgressError::Database(format!("Failed to parse improvement: {}", e)))?;

    let status_str: String = row.try_get("status")?;
    let status: ProgressionStatus = status_str
        .parse()
        .map_err(ProgressError::Database)?;

    Ok(ExercisePerformance {
        id: Some(row.try_get("id")?),
        exercise_id: row.try_get("exercise_id")?,
        mode,
        target: Prescription {
            rounds: row.try_get("target_rounds")?,
            reps: row.try_get("target_reps")?,
            weight: row.try_get("target_weight")?,
        },
        weight: row.try_get("weight")?,
        effort: performance_by_round.last().map(|r| r.effort),
        performance_by_round,
        target_reached: row.try_get("target_reached")?,
        improvement,
        next_workout_weight: row.try_get("next_workout_weight")?,
        personal_best: row.try_get("personal_best")?,
        previous_performance: None,
        round_deltas: Vec::new(),
        status,
    })
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

pub async fn load_exercise(pool: &SqlitePool, exercise_id: i64) -> ProgressResult<Exercise> {
    let row = sqlx::query("SELECT id, name, mode, baseline_weight FROM exercises WHERE id = ?")
        .bind(exercise_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ProgressError::NotFound(format!("exercise {}", exercise_id)))?;

    Ok(Exercise {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        mode: row.try_get::<String, _>("mode")?.parse()?,
        baseline_weight: row.try_get("baseline_weight")?,
    })
}

/// Exercises of a workout in definition order
pub async fn load_workout_exercises(pool: &SqlitePool, workout_id: i64) -> ProgressResult<Vec<WorkoutExercise>> {
    let rows = sqlx::query(
        r#"
        SELECT
            we.workout_id, we.position, we.target_rounds, we.target_reps,
            e.id, e.name, e.mode, e.baseline_weight
        FROM workout_exercises we
        JOIN exercises e ON e.id = we.exercise_id
        WHERE we.workout_id = ?
        ORDER BY we.position
        "#,
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await?;

    let mut slots = Vec::with_capacity(rows.len());
    for row in rows {
        slots.push(WorkoutExercise {
            workout_id: row.try_get("workout_id")?,
            exercise: Exercise {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                mode: row.try_get::<String, _>("mode")?.parse()?,
                baseline_weight: row.try_get("baseline_weight")?,
            },
            position: row.try_get("position")?,
            target_rounds: row.try_get("target_rounds")?,
            target_reps: row.try_get("target_reps")?,
        });
    }

    Ok(slots)
}

// ---------------------------------------------------------------------------
// Prescriptions
// ---------------------------------------------------------------------------

pub async fn load_prescription(pool: &SqlitePool, user_id: i64, exercise_id: i64) -> ProgressResult<Option<f64>> {
    let weight = sqlx::query_scalar::<_, f64>(
        "SELECT weight FROM exercise_prescriptions WHERE user_id = ? AND exercise_id = ?",
    )
    .bind(user_id)
    .bind(exercise_id)
    .fetch_optional(pool)
    .await?;

    Ok(weight)
}

/// Upsert keyed by (user, exercise). Writes an absolute weight, so repeating
/// the call leaves the same row behind.
///
/// A prescription sourced from a later session is never replaced by one from
/// an earlier session. Returns false when the row was left alone for that reason.
pub async fn save_prescription(
    conn: &mut SqliteConnection,
    user_id: i64,
    exercise_id: i64,
    weight: f64,
    source_session_id: i64,
) -> ProgressResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO exercise_prescriptions (user_id, exercise_id, weight, source_session_id, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(user_id, exercise_id) DO UPDATE SET
            weight = excluded.weight,
            source_session_id = excluded.source_session_id,
            updated_at = excluded.updated_at
        WHERE (SELECT completed_at FROM workout_sessions WHERE id = excluded.source_session_id)
           >= (SELECT completed_at FROM workout_sessions WHERE id = exercise_prescriptions.source_session_id)
        "#,
    )
    .bind(user_id)
    .bind(exercise_id)
    .bind(weight)
    .bind(source_session_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// Sessions and performances
// ---------------------------------------------------------------------------

pub async fn insert_session(conn: &mut SqliteConnection, session: &NewWorkoutSession) -> ProgressResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO workout_sessions (user_id, workout_id, started_at, completed_at, duration_seconds)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(session.user_id)
    .bind(session.workout_id)
    .bind(session.started_at)
    .bind(session.completed_at)
    .bind(session.duration_seconds() as i64)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn insert_performance(
    conn: &mut SqliteConnection,
    session_id: i64,
    user_id: i64,
    position: i64,
    perf: &ExercisePerformance,
) -> ProgressResult<i64> {
    let rounds_json = serde_json::to_string(&perf.performance_by_round)
        .map_err(|e| ProgressError::Database(format!("Failed to encode rounds: {}", e)))?;
    let improvement_json = serde_json::to_string(&perf.improvement)
        .map_err(|e| ProgressError::Database(format!("Failed to encode improvement: {}", e)))?;

    let result = sqlx::query(
        r#"
        INSERT INTO exercise_performances (
            session_id, user_id, exercise_id, position, mode,
            target_rounds, target_reps, target_weight, rounds_json, weight,
            target_reached, improvement_json, next_workout_weight, personal_best, status
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(perf.exercise_id)
    .bind(position)
    .bind(perf.mode.as_str())
    .bind(perf.target.rounds)
    .bind(perf.target.reps)
    .bind(perf.target.weight)
    .bind(&rounds_json)
    .bind(perf.weight)
    .bind(perf.target_reached)
    .bind(&improvement_json)
    .bind(perf.next_workout_weight)
    .bind(perf.personal_best)
    .bind(perf.status.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn load_session(pool: &SqlitePool, session_id: i64) -> ProgressResult<WorkoutSession> {
    sqlx::query_as::<_, WorkoutSession>(
        r#"
        SELECT id, user_id, workout_id, started_at, completed_at, duration_seconds
        FROM workout_sessions
        WHERE id = ?
        "#,
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ProgressError::NotFound(format!("session {}", session_id)))
}

/// All performances of a session in workout order
pub async fn load_session_performances(pool: &SqlitePool, session_id: i64) -> ProgressResult<Vec<ExercisePerformance>> {
    let sql = format!(
        "SELECT {} FROM exercise_performances p WHERE p.session_id = ? ORDER BY p.position, p.id",
        PERFORMANCE_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(session_id).fetch_all(pool).await?;

    rows.iter().map(performance_from_row).collect()
}

pub async fn load_session_performance(
    conn: &mut SqliteConnection,
    session_id: i64,
    user_id: i64,
    exercise_id: i64,
) -> ProgressResult<Option<ExercisePerformance>> {
    let sql = format!(
        "SELECT {} FROM exercise_performances p WHERE p.session_id = ? AND p.user_id = ? AND p.exercise_id = ?",
        PERFORMANCE_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(session_id)
        .bind(user_id)
        .bind(exercise_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.as_ref().map(performance_from_row).transpose()
}

pub async fn mark_confirmed(conn: &mut SqliteConnection, performance_id: i64, at: DateTime<Utc>) -> ProgressResult<()> {
    sqlx::query(
        r#"
        UPDATE exercise_performances
        SET status = ?1, confirmed_at = ?2
        WHERE id = ?3 AND confirmed_at IS NULL
        "#,
    )
    .bind(ProgressionStatus::Confirmed.to_string())
    .bind(at)
    .bind(performance_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// History lookups
// ---------------------------------------------------------------------------

/// Most recent attempted record of this exercise strictly before `before`.
/// Sessions where the exercise was skipped (no rounds) are passed over.
pub async fn load_previous_performance(
    pool: &SqlitePool,
    user_id: i64,
    exercise_id: i64,
    before: DateTime<Utc>,
) -> ProgressResult<Option<ExercisePerformance>> {
    let sql = format!(
        r#"
        SELECT {}
        FROM exercise_performances p
        JOIN workout_sessions s ON s.id = p.session_id
        WHERE p.user_id = ? AND p.exercise_id = ? AND s.completed_at < ? AND p.rounds_json != '[]'
        ORDER BY s.completed_at DESC, s.id DESC
        LIMIT 1
        "#,
        PERFORMANCE_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(exercise_id)
        .bind(before)
        .fetch_optional(pool)
        .await
        .map_err(|e| ProgressError::PreviousSessionLookupFailed(e.to_string()))?;

    tracing::debug!(user_id, exercise_id, found = row.is_some(), "previous performance lookup");

    row.as_ref()
        .map(performance_from_row)
        .transpose()
        .map_err(|e| ProgressError::PreviousSessionLookupFailed(e.to_string()))
}

/// Weight lifted in the user's last session of this workout before `before`
pub async fn load_previous_session_total(
    pool: &SqlitePool,
    user_id: i64,
    workout_id: i64,
    before: DateTime<Utc>,
) -> ProgressResult<Option<f64>> {
    let previous_id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id FROM workout_sessions
        WHERE user_id = ? AND workout_id = ? AND completed_at < ?
        ORDER BY completed_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(workout_id)
    .bind(before)
    .fetch_optional(pool)
    .await
    .map_err(|e| ProgressError::PreviousSessionLookupFailed(e.to_string()))?;

    let Some(previous_id) = previous_id else {
        return Ok(None);
    };

    let performances = load_session_performances(pool, previous_id)
        .await
        .map_err(|e| ProgressError::PreviousSessionLookupFailed(e.to_string()))?;

    Ok(Some(total_weight_lifted(&performances)))
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
