use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ProgressError, ProgressResult};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_directives`. Calling this again after a
/// subscriber is installed is a no-op.
pub fn init_logging(default_directives: &str) -> ProgressResult<()> {
  let env_filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(default_directives))
    .map_err(|e| ProgressError::Config(format!("Invalid log directives {:?}: {}", default_directives, e)))?;

  // Err here only means a subscriber is already installed
  let _ = tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_target(true))
    .try_init();

  Ok(())
}
