//! # appcontext-core
//!
//! Shared foundation for the AppContext libraries: XDG base-directory path
//! resolution, the declarative "path spec" model describing an application's
//! on-disk layout, and the crash-safe atomic file writer used by every store.
//!
//! This crate is used by both `appcontext-config` and `appcontext-store`.
//! It performs no locking of its own; the stores that build on it do.
//!
//! # Architecture overview
//!
//! - **`xdg`** – Turns a base-directory kind, an application name, and
//!   optional group/subdirectories/file name into a typed [`Location`].  A
//!   location is either a file or a directory; the distinction survives into
//!   the string rendering as a trailing separator on directories.
//!
//! - **`pathspec`** – Describes every file or directory an application owns
//!   as a [`PathEntry`], validates entries against a closed
//!   category → subcategory table, groups them into a [`Layout`], creates
//!   the layout on disk (`generate`) and reports drift from it (`assess`).
//!
//! - **`fsio`** – The [`AtomicWriter`]: write to a sibling temporary file,
//!   flush, rename over the target.  Stores depend on the [`DocumentWriter`]
//!   trait so tests can substitute the recording mock.

pub mod fsio;
pub mod pathspec;
pub mod xdg;

// Re-export the most-used types at the crate root so callers can write
// `appcontext_core::Layout` instead of `appcontext_core::pathspec::layout::Layout`.
pub use fsio::atomic::{AtomicWriter, DocumentWriter, WriteError};
pub use pathspec::entry::{EntryError, PathEntry};
pub use pathspec::layout::{Assessment, Discrepancy, Layout, LayoutError};
pub use pathspec::types::{
    BaseDir, PathCategory, PathKind, PathPriority, Subcategory,
};
pub use xdg::{BaseDirKind, Location, PathRequest, PathResolver, XdgDirs};
