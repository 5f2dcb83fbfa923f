//! Process-wide log output.

use tracing_subscriber::EnvFilter;

use crate::error::ContextError;

/// Installs a formatting subscriber as the global default.
///
/// `RUST_LOG` takes precedence; `default_level` (for example `"info"` or
/// `"appcontext_store=debug"`) applies when it is unset or unparsable.
/// Returns [`ContextError::Logging`] if a global subscriber is already set.
pub fn init(default_level: &str) -> Result<(), ContextError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init()
        .map_err(ContextError::Logging)
}
