//! Summary Aggregator
//!
//! Rolls evaluated exercises into the session summary shown after a workout.
//! Nothing here is stored; summaries are rebuilt from performance rows.

use crate::models::{ExercisePerformance, WorkoutSessionSummary};

/// Σ weight x reps over every rep-based round. Timed and distance rounds
/// add nothing, whatever weight they carry.
pub fn total_weight_lifted(exercises: &[ExercisePerformance]) -> f64 {
    exercises.iter().map(|e| e.volume()).sum()
}

/// Percent change versus the previous session's total. None without a
/// previous session or when the previous total was zero.
pub fn weight_lifted_improvement(current_total: f64, previous_total: Option<f64>) -> Option<f64> {
    match previous_total {
        Some(previous) if previous != 0.0 && previous.is_finite() => {
            Some((current_total - previous) / previous * 100.0)
        }
        _ => None,
    }
}

pub fn summarize_session(
    session_id: Option<i64>,
    exercises: Vec<ExercisePerformance>,
    total_duration: u64,
    previous_total: Option<f64>,
) -> WorkoutSessionSummary {
    let total = total_weight_lifted(&exercises);
    let exercises_completed = exercises.iter().filter(|e| e.is_completed()).count();
    // A session with nothing done has nothing to compare
    let previous_total = previous_total.filter(|_| exercises_completed > 0);

    WorkoutSessionSummary {
        session_id,
        total_duration,
        total_weight_lifted: total,
        exercises_completed,
        ready_to_progress: exercises.iter().filter(|e| e.target_reached).count(),
        personal_bests: exercises.iter().filter(|e| e.personal_best).count(),
        weight_lifted_improvement: weight_lifted_improvement(total, previous_total),
        exercises,
    }
}
