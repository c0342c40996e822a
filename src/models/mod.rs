pub mod exercise;
pub mod performance;
pub mod session;

pub use exercise::{
  Effort, Exercise, ExerciseMode, ExercisePrescription, Prescription, RoundPerformance, WorkoutExercise,
};
pub use performance::{ExercisePerformance, Improvement, ProgressionStatus};
pub use session::{NewWorkoutSession, WorkoutSession, WorkoutSessionSummary};
