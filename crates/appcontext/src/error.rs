use appcontext_config::ConfigError;
use appcontext_core::{BaseDirKind, LayoutError};
use appcontext_store::StoreError;
use thiserror::Error;

/// Error type for [`AppContext`](crate::AppContext) operations.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("application name must not be empty")]
    EmptyAppName,

    /// A base directory is unknown, so paths under it cannot be built.
    #[error("cannot resolve {kind} directory for app '{app_name}'")]
    Unresolvable { app_name: String, kind: BaseDirKind },

    /// A config operation was requested but no config manager is attached.
    #[error("no configuration attached to app '{0}'")]
    NoConfig(String),

    /// A layout operation was requested but no layout is attached.
    #[error("no layout attached to app '{0}'")]
    NoLayout(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A global tracing subscriber was already installed.
    #[error("failed to initialise logging: {0}")]
    Logging(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}
