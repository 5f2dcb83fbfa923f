//! XDG base-directory path resolution.
//!
//! Resolution is a pure function of its inputs plus a captured snapshot of the
//! environment ([`XdgDirs`]).  Nothing here touches the filesystem.
//!
//! # Files versus directories
//!
//! Callers branch on whether a resolved path names a file or a directory, so
//! the answer is carried in the type: [`Location::File`] or
//! [`Location::Dir`].  When a location is rendered as a string, directories
//! (and only directories) end with the platform path separator:
//!
//! ```text
//! PathRequest::new(Config, "myapp")                     -> ~/.config/myapp/
//! PathRequest::new(Config, "myapp").file_name("a.toml") -> ~/.config/myapp/a.toml
//! ```

pub mod dirs;
pub mod resolver;

pub use dirs::{BaseDirKind, UnknownBaseDir, XdgDirs};
pub use resolver::{Location, PathRequest, PathResolver};
