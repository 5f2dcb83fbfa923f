//! # appcontext
//!
//! Everything an application needs to find, create and persist its files,
//! behind one [`AppContext`]:
//!
//! - XDG-style path resolution and the declarative path layout from
//!   [`appcontext_core`],
//! - a typed configuration file from [`appcontext_config`],
//! - JSON record stores from [`appcontext_store`].
//!
//! ```no_run
//! use appcontext::{AppContext, ConfigOptions};
//! use appcontext::core::pathspec::templates;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Default, Serialize, Deserialize)]
//! struct Settings {
//!     theme: String,
//! }
//!
//! # fn main() -> Result<(), appcontext::ContextError> {
//! appcontext::logging::init("info")?;
//! let ctx = AppContext::new("notes")?
//!     .with_layout([templates::log_file().with_name("notes.log")])?
//!     .with_config(Settings::default(), ConfigOptions::default())?;
//! ctx.prepare()?;
//! ctx.load_config(&["./notes.toml"])?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod logging;

pub use appcontext_config as config;
pub use appcontext_core as core;
pub use appcontext_store as store;

pub use appcontext_config::{ConfigManager, ConfigOptions, Format};
pub use appcontext_core::{Layout, Location, PathEntry, PathRequest, PathResolver, XdgDirs};
pub use appcontext_store::{JsonStore, Marshaling, StoreOptions};
pub use context::AppContext;
pub use error::ContextError;
