//! # appcontext-config
//!
//! A generic, thread-safe configuration manager.  A [`ConfigManager<T>`]
//! holds one value of a user type `T`, bound to one file in one of three
//! formats (JSON, YAML, TOML), and persists it with the atomic writer from
//! `appcontext-core`.
//!
//! ```no_run
//! use appcontext_config::{ConfigManager, ConfigOptions, Format};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Settings {
//!     port: u16,
//! }
//!
//! # fn main() -> Result<(), appcontext_config::ConfigError> {
//! let manager = ConfigManager::new(
//!     "myapp",
//!     Settings { port: 8080 },
//!     ConfigOptions::default().with_format(Format::Yaml),
//! )?;
//! manager.load()?; // ~/.config/myapp/config.yaml
//! manager.update(|s| s.port = 9090);
//! manager.save()?;
//! # Ok(())
//! # }
//! ```
//!
//! Values can check themselves by implementing [`Validate`] and opting in
//! with [`ConfigOptions::validated`], or the caller can pass any closure via
//! [`ConfigOptions::with_validator`].

pub mod error;
pub mod format;
pub mod manager;

pub use error::{BoxError, ConfigError};
pub use format::{DecodeError, EncodeError, Format};
pub use manager::{default_path, ConfigManager, ConfigOptions, Validate, Validator};
