//! Filesystem output: the atomic writer and its test double.
//!
//! Stores never call `std::fs::write` on their target file.  They hand bytes
//! to a [`DocumentWriter`](atomic::DocumentWriter); production code uses
//! [`AtomicWriter`](atomic::AtomicWriter), tests use
//! [`MockWriter`](mock::MockWriter) to observe or fail persistence.

pub mod atomic;
pub mod mock;

use std::io;
use std::path::Path;

/// Recursively creates `path`, applying `mode` to every directory created.
///
/// Existing directories are left alone.  `mode` is ignored on platforms
/// without Unix permission bits.
pub(crate) fn create_dir_all_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

/// Sets the exact permission bits on `path`, bypassing the process umask.
pub(crate) fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
        Ok(())
    }
}

/// Returns the permission bits of `metadata`, or `None` where the platform
/// has no Unix permission model.
pub(crate) fn mode_of(metadata: &std::fs::Metadata) -> Option<u32> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(metadata.permissions().mode() & 0o777)
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        None
    }
}
