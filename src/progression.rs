//! Progression Calculator
//!
//! Compares a just-completed exercise against the user's previous record of
//! the same exercise and decides what to prescribe next time.
//!
//! Key principles:
//! - One place computes improvement and target-reached; callers never redo it
//! - Suggested weight is a pure function of the current weight, so
//!   re-evaluating a session always yields the same suggestion
//! - Only REPS-mode work auto-progresses weight; TIME and DISTANCE never
//!   reach a target (a known scope limit, not an oversight)

use serde::{Deserialize, Serialize};

use crate::error::{ProgressError, ProgressResult};
use crate::models::{ExerciseMode, ExercisePerformance, Improvement, RoundPerformance};

// ---------------------------------------------------------------------------
/// Progression Constants
// ---------------------------------------------------------------------------

/// 5% increase when the target is reached
pub const WEIGHT_INCREASE_FACTOR: f64 = 1.05;

/// Plate step the suggestion is rounded up to, regardless of display unit
pub const WEIGHT_INCREMENT: f64 = 2.5;

/// Relative tolerance: quotients this close to a whole number are treated as exact
const STEP_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
/// Progression Outcome: everything evaluation adds to a recorded exercise
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressionOutcome {
    pub improvement: Improvement,
    pub target_reached: bool,
    pub next_workout_weight: f64,
    pub personal_best: bool,
}

/// Per-round comparison with the previous session, for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundDelta {
    pub round: u32,
    pub weight: f64,
    /// Change in the round's primary metric (reps, seconds or metres)
    pub effort: f64,
}

/// Raw deltas against the previous record. No clamping: negative values
/// mean the user went backwards.
pub fn compute_improvement(
    current: &ExercisePerformance,
    previous: Option<&ExercisePerformance>,
) -> Improvement {
    let Some(previous) = previous else {
        return Improvement::default();
    };

    let current_reps = current.reps().unwrap_or(0);
    let previous_reps = previous.reps().unwrap_or(0);

    Improvement {
        reps: current_reps as i64 - previous_reps as i64,
        weight: current.weight - previous.weight,
        time: current.time().unwrap_or(0.0) - previous.time().unwrap_or(0.0),
        distance: current.distance().unwrap_or(0.0) - previous.distance().unwrap_or(0.0),
        total_weight: current.weight * current_reps as f64 - previous.weight * previous_reps as f64,
    }
}

/// Met the session's own rep target. Always false outside REPS mode.
pub fn target_reached(current: &ExercisePerformance) -> bool {
    match (current.mode, current.reps()) {
        (ExerciseMode::Reps, Some(reps)) => reps >= current.target.reps,
        _ => false,
    }
}

/// Weight to suggest for the next session.
///
/// Reached: +5%, rounded up to the next multiple of 2.5. Otherwise unchanged.
pub fn next_workout_weight(current_weight: f64, target_reached: bool) -> ProgressResult<f64> {
    if !current_weight.is_finite() || current_weight < 0.0 {
        return Err(ProgressError::InvalidWeight(current_weight));
    }

    if !target_reached {
        return Ok(current_weight);
    }

    let steps = current_weight * WEIGHT_INCREASE_FACTOR / WEIGHT_INCREMENT;
    let nearest = steps.round();
    let steps = if (steps - nearest).abs() < STEP_EPSILON * steps.abs().max(1.0) {
        nearest
    } else {
        steps.ceil()
    };

    Ok(steps * WEIGHT_INCREMENT)
}

/// Primary metric strictly beats the previous session's
pub fn is_personal_best(current: &ExercisePerformance, previous: Option<&ExercisePerformance>) -> bool {
    let Some(previous) = previous else {
        return false;
    };

    match (current.effort, previous.effort) {
        (Some(now), Some(before)) if now.mode() == before.mode() => now.value() > before.value(),
        _ => false,
    }
}

/// Evaluate one recorded exercise against its previous record
pub fn evaluate_progression(
    current: &ExercisePerformance,
    previous: Option<&ExercisePerformance>,
) -> ProgressResult<ProgressionOutcome> {
    if let Some(prev) = previous {
        if prev.exercise_id != current.exercise_id {
            return Err(ProgressError::InvalidPerformanceData(format!(
                "cannot compare exercise {} against exercise {}",
                current.exercise_id, prev.exercise_id
            )));
        }
    }

    let reached = target_reached(current);
    // An exercise with no rounds keeps its prescription
    let base_weight = if current.is_completed() {
        current.weight
    } else {
        current.target.weight
    };

    Ok(ProgressionOutcome {
        improvement: compute_improvement(current, previous),
        target_reached: reached,
        next_workout_weight: next_workout_weight(base_weight, reached)?,
        personal_best: is_personal_best(current, previous),
    })
}

/// Compare rounds by number; rounds missing on either side are skipped
pub fn round_deltas(current: &[RoundPerformance], previous: &[RoundPerformance]) -> Vec<RoundDelta> {
    current
        .iter()
        .filter_map(|now| {
            let before = previous.iter().find(|p| p.round == now.round)?;
            if before.effort.mode() != now.effort.mode() {
                return None;
            }
            Some(RoundDelta {
                round: now.round,
                weight: now.weight - before.weight,
                effort: now.effort.value() - before.effort.value(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
