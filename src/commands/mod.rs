//! In-process entry points for request handlers.
//!
//! Every identifier is passed in explicitly; nothing here reads session or
//! auth state.

pub mod progression;
pub mod session;

pub use progression::{confirm_weight_increase, prescribe_workout};
pub use session::{complete_workout, get_session_summary, CompleteWorkout};
