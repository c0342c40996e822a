pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod progression;
pub mod recorder;
pub mod store;
pub mod summary;

#[cfg(test)]
mod test_utils;

use config::AppConfig;
use db::AppState;

pub use error::{ProgressError, ProgressResult};
pub use progression::{compute_improvement, evaluate_progression, next_workout_weight, target_reached};
pub use recorder::record_performance;
pub use summary::summarize_session;

/// Load configuration, start logging and open the database
pub async fn bootstrap() -> ProgressResult<AppState> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  logging::init_logging(&config.log_directives)?;

  let pool = db::initialize_db(&config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialize database");
    e
  })?;

  tracing::info!("Database ready");

  Ok(AppState { db: pool, config })
}
