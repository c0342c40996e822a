//! Performance Recorder
//!
//! Turns the raw end-of-workout payload into validated `ExercisePerformance`
//! shells. Pure: nothing here touches storage.

use serde::{Deserialize, Serialize};

use crate::error::{ProgressError, ProgressResult};
use crate::models::{
    Effort, ExerciseMode, ExercisePerformance, Improvement, Prescription, ProgressionStatus,
    RoundPerformance,
};

/// One round as submitted by the client. Only the field matching the
/// exercise mode is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundInput {
    pub round: u32,
    pub weight: f64,
    pub reps: Option<u32>,
    pub time: Option<f64>,
    pub distance: Option<f64>,
}

/// One exercise as submitted by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseInput {
    pub exercise_id: i64,
    pub target: Prescription,
    pub rounds: Vec<RoundInput>,
}

/// Validate one exercise's rounds and build its shell.
///
/// Rounds must arrive as exactly `1..=n` with `n <= target.rounds`. The
/// session-level weight and effort come from the last round: later rounds
/// carry the fatigue, so they represent working performance.
pub fn record_performance(input: ExerciseInput, mode: ExerciseMode) -> ProgressResult<ExercisePerformance> {
    check_weight(input.target.weight)?;

    if input.rounds.len() > input.target.rounds as usize {
        return Err(ProgressError::InvalidPerformanceData(format!(
            "exercise {}: {} rounds submitted, target is {}",
            input.exercise_id,
            input.rounds.len(),
            input.target.rounds
        )));
    }

    let mut performance_by_round = Vec::with_capacity(input.rounds.len());
    for (idx, raw) in input.rounds.iter().enumerate() {
        let expected = idx as u32 + 1;
        if raw.round != expected {
            return Err(ProgressError::InvalidPerformanceData(format!(
                "exercise {}: expected round {}, got round {}",
                input.exercise_id, expected, raw.round
            )));
        }
        check_weight(raw.weight)?;

        performance_by_round.push(RoundPerformance {
            round: raw.round,
            weight: raw.weight,
            effort: effort_for_mode(input.exercise_id, raw, mode)?,
        });
    }

    let last = performance_by_round.last();
    let weight = last.map(|r| r.weight).unwrap_or(0.0);
    let effort = last.map(|r| r.effort);
    // Nothing lifted: carry the prescription forward unchanged
    let next_workout_weight = last.map(|r| r.weight).unwrap_or(input.target.weight);

    Ok(ExercisePerformance {
        id: None,
        exercise_id: input.exercise_id,
        mode,
        target: input.target,
        performance_by_round,
        weight,
        effort,
        target_reached: false,
        improvement: Improvement::default(),
        next_workout_weight,
        personal_best: false,
        previous_performance: None,
        round_deltas: Vec::new(),
        status: ProgressionStatus::Recorded,
    })
}

fn check_weight(weight: f64) -> ProgressResult<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(ProgressError::InvalidWeight(weight));
    }
    Ok(())
}

fn effort_for_mode(exercise_id: i64, raw: &RoundInput, mode: ExerciseMode) -> ProgressResult<Effort> {
    let missing = || {
        ProgressError::InvalidPerformanceData(format!(
            "exercise {}: round {} has no {} value",
            exercise_id,
            raw.round,
            mode.as_str().to_lowercase()
        ))
    };

    let measured = |value: f64| -> ProgressResult<f64> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(ProgressError::InvalidPerformanceData(format!(
                "exercise {}: round {} has invalid {} value {}",
                exercise_id,
                raw.round,
                mode.as_str().to_lowercase(),
                value
            )))
        }
    };

    match mode {
        ExerciseMode::Reps => raw.reps.map(Effort::Reps).ok_or_else(missing),
        ExerciseMode::Time => Ok(Effort::Time(measured(raw.time.ok_or_else(missing)?)?)),
        ExerciseMode::Distance => Ok(Effort::Distance(measured(raw.distance.ok_or_else(missing)?)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reps_round(round: u32, weight: f64, reps: u32) -> RoundInput {
        RoundInput {
            round,
            weight,
            reps: Some(reps),
            ..Default::default()
        }
    }

    fn input(rounds: Vec<RoundInput>) -> ExerciseInput {
        ExerciseInput {
            exercise_id: 1,
            target: Prescription { rounds: 3, reps: 10, weight: 60.0 },
            rounds,
        }
    }

    #[test]
    fn test_last_round_represents_exercise() {
        let perf = record_performance(
            input(vec![reps_round(1, 60.0, 10), reps_round(2, 60.0, 9), reps_round(3, 57.5, 8)]),
            ExerciseMode::Reps,
        )
        .unwrap();

        assert_eq!(perf.performance_by_round.len(), 3);
        assert_eq!(perf.weight, 57.5);
        assert_eq!(perf.reps(), Some(8));
        assert_eq!(perf.status, ProgressionStatus::Recorded);
        assert_eq!(perf.next_workout_weight, 57.5);
        assert_eq!(perf.improvement, Improvement::default());
    }

    #[test]
    fn test_abandoned_exercise_keeps_partial_rounds() {
        let perf = record_performance(input(vec![reps_round(1, 60.0, 10)]), ExerciseMode::Reps).unwrap();
        assert_eq!(perf.performance_by_round.len(), 1);
        assert!(perf.is_completed());

        let skipped = record_performance(input(vec![]), ExerciseMode::Reps).unwrap();
        assert!(!skipped.is_completed());
        assert_eq!(skipped.weight, 0.0);
        assert_eq!(skipped.effort, None);
        assert_eq!(skipped.next_workout_weight, 60.0);
    }

    #[test]
    fn test_rejects_out_of_order_rounds() {
        let err = record_performance(
            input(vec![reps_round(2, 60.0, 10), reps_round(1, 60.0, 10)]),
            ExerciseMode::Reps,
        )
        .unwrap_err();
        assert!(matches!(err, ProgressError::InvalidPerformanceData(_)));
    }

    #[test]
    fn test_rejects_duplicate_and_gapped_rounds() {
        let dup = record_performance(
            input(vec![reps_round(1, 60.0, 10), reps_round(1, 60.0, 10)]),
            ExerciseMode::Reps,
        );
        assert!(matches!(dup, Err(ProgressError::InvalidPerformanceData(_))));

        let gap = record_performance(
            input(vec![reps_round(1, 60.0, 10), reps_round(3, 60.0, 10)]),
            ExerciseMode::Reps,
        );
        assert!(matches!(gap, Err(ProgressError::InvalidPerformanceData(_))));
    }

    #[test]
    fn test_rejects_more_rounds_than_target() {
        let rounds = (1..=4).map(|r| reps_round(r, 60.0, 10)).collect();
        let err = record_performance(input(rounds), ExerciseMode::Reps).unwrap_err();
        assert!(matches!(err, ProgressError::InvalidPerformanceData(_)));
    }

    #[test]
    fn test_rejects_negative_or_nan_weight() {
        let err = record_performance(input(vec![reps_round(1, -5.0, 10)]), ExerciseMode::Reps).unwrap_err();
        assert_eq!(err, ProgressError::InvalidWeight(-5.0));

        let err = record_performance(input(vec![reps_round(1, f64::NAN, 10)]), ExerciseMode::Reps).unwrap_err();
        assert!(matches!(err, ProgressError::InvalidWeight(_)));
    }

    #[test]
    fn test_requires_field_matching_mode() {
        // reps supplied, but the exercise is timed
        let err = record_performance(input(vec![reps_round(1, 0.0, 10)]), ExerciseMode::Time).unwrap_err();
        assert!(matches!(err, ProgressError::InvalidPerformanceData(_)));

        let timed = RoundInput {
            round: 1,
            weight: 0.0,
            time: Some(45.0),
            reps: Some(3),
            ..Default::default()
        };
        let perf = record_performance(input(vec![timed]), ExerciseMode::Time).unwrap();
        assert_eq!(perf.time(), Some(45.0));
        assert_eq!(perf.reps(), None);
    }

    #[test]
    fn test_rejects_negative_distance() {
        let run = RoundInput {
            round: 1,
            weight: 0.0,
            distance: Some(-100.0),
            ..Default::default()
        };
        let err = record_performance(input(vec![run]), ExerciseMode::Distance).unwrap_err();
        assert!(matches!(err, ProgressError::InvalidPerformanceData(_)));
    }
}
