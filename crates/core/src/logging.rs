//! Logging setup.
//!
//! Structured logs go to stderr through `tracing`, keeping stdout clean for
//! data output. The filter comes from the configured log level, falling back
//! to `RUST_LOG` and then to "info".

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Initialize the global tracing subscriber.
///
/// `log_level` overrides the `RUST_LOG` environment variable ("info" when
/// neither is set). Safe to call more than once: a later call keeps the
/// subscriber installed by the first, so embedding applications and tests
/// can share a process.
///
/// # Errors
/// Returns `AppError::Config` when the filter expression is invalid.
pub fn init_logging(log_level: Option<&str>) -> AppResult<()> {
    let env_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(log_level.unwrap_or(&env_level))
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        // Honor the NO_COLOR convention
        .with_ansi(std::env::var("NO_COLOR").is_err());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    Ok(())
}
