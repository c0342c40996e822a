//! Environment-driven configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by `bootstrap()`. Every setting has a default so a bare checkout runs.

use std::env;

use crate::error::{ProgressError, ProgressResult};

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://workout-progress.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_DIRECTIVES: &str = "info";

pub const DATABASE_URL_VAR: &str = "WORKOUT_DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "WORKOUT_DB_MAX_CONNECTIONS";
pub const LOG_VAR: &str = "WORKOUT_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
  pub database_url: String,
  pub max_connections: u32,
  /// Default tracing directives, used when `RUST_LOG` is not set
  pub log_directives: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      max_connections: DEFAULT_MAX_CONNECTIONS,
      log_directives: DEFAULT_LOG_DIRECTIVES.to_string(),
    }
  }
}

impl AppConfig {
  pub fn from_env() -> ProgressResult<Self> {
    let defaults = Self::default();

    let max_connections = match env::var(MAX_CONNECTIONS_VAR) {
      Ok(raw) => raw.trim().parse::<u32>().map_err(|_| {
        ProgressError::Config(format!("{} must be a positive integer, got {:?}", MAX_CONNECTIONS_VAR, raw))
      })?,
      Err(_) => defaults.max_connections,
    };

    if max_connections == 0 {
      return Err(ProgressError::Config(format!("{} must be at least 1", MAX_CONNECTIONS_VAR)));
    }

    Ok(Self {
      database_url: env::var(DATABASE_URL_VAR).unwrap_or(defaults.database_url),
      max_connections,
      log_directives: env::var(LOG_VAR).unwrap_or(defaults.log_directives),
    })
  }
}
