//! # appcontext-store
//!
//! A small embedded record store: string ids mapped to values of any
//! serde type, kept in memory and mirrored to a single JSON file.
//!
//! ```no_run
//! use appcontext_store::{JsonStore, StoreOptions};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Session {
//!     user: String,
//! }
//!
//! # fn main() -> Result<(), appcontext_store::StoreError> {
//! let store = JsonStore::open("sessions.json", StoreOptions::new().with_auto_save(true))?;
//! store.insert("s1", Session { user: "ada".into() })?;
//! # Ok(())
//! # }
//! ```
//!
//! Saving goes through the atomic writer from `appcontext-core`, so the file
//! on disk is always either the previous or the new complete document.

pub mod error;
pub mod marshal;
pub mod store;

pub use error::StoreError;
pub use marshal::{marshal, Marshaling};
pub use store::{JsonStore, StoreOptions};
