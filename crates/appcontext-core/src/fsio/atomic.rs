//! Crash-safe file replacement.
//!
//! [`AtomicWriter::write`] never exposes a partially written target:
//!
//! ```text
//! 1. create the parent directory (dir_mode)
//! 2. write all bytes to  <dir>/.tmp-<uuid> (created with the final mode)
//! 3. fsync the temporary file, close it
//! 4. rename the temporary file over <dir>/<name>
//! ```
//!
//! Any failure before or during step 4 removes the temporary file and leaves
//! the target exactly as it was.  Step 4 is only atomic when the temporary
//! file and the target share a filesystem, which is why the temporary file is
//! always created next to the target.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{create_dir_all_with_mode, mode_of, set_mode};

/// Error type for document writes.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The target path has no file-name component (e.g. `/` or `..`).
    #[error("invalid write target: {0}")]
    InvalidTarget(PathBuf),

    /// The target's parent directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing or flushing the temporary file failed.
    #[error("failed to stage temporary file {path}: {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Renaming the temporary file over the target failed.
    #[error("failed to replace {path}: {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failure injected by a test double.
    #[error("simulated write failure for {0}")]
    Simulated(PathBuf),
}

/// Persists a complete document to a path.
///
/// Implementations must either replace the target with exactly `data` or
/// leave it untouched.
pub trait DocumentWriter: Send + Sync {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), WriteError>;
}

/// The production [`DocumentWriter`]: temp file, fsync, rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomicWriter {
    /// Mode for directories created on the way to the target.
    pub dir_mode: u32,
    /// Mode for a newly created target.  An existing target keeps its mode.
    pub file_mode: u32,
}

impl Default for AtomicWriter {
    fn default() -> Self {
        Self {
            dir_mode: 0o755,
            file_mode: 0o644,
        }
    }
}

impl AtomicWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Atomically replaces `path` with `data`.
    ///
    /// # Errors
    ///
    /// - [`WriteError::InvalidTarget`] if `path` has no file name.
    /// - [`WriteError::CreateDir`] if the parent directory cannot be created.
    /// - [`WriteError::Stage`] if the temporary file cannot be written or synced.
    /// - [`WriteError::Commit`] if the final rename fails.
    pub fn write(&self, path: &Path, data: &[u8]) -> Result<(), WriteError> {
        self.write_staged(path, data, |_| Ok(()))
    }

    /// Does the work of [`write`](Self::write); `before_commit` runs after the
    /// temporary file is durable and before the rename.
    fn write_staged<F>(&self, path: &Path, data: &[u8], before_commit: F) -> Result<(), WriteError>
    where
        F: FnOnce(&Path) -> io::Result<()>,
    {
        if path.file_name().is_none() {
            return Err(WriteError::InvalidTarget(path.to_path_buf()));
        }
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        create_dir_all_with_mode(dir, self.dir_mode).map_err(|source| WriteError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mode = match fs::metadata(path) {
            Ok(meta) => mode_of(&meta).unwrap_or(self.file_mode),
            Err(_) => self.file_mode,
        };

        // Fixed-length name: the target's own name may already be near NAME_MAX.
        let tmp = TempFile::new(dir.join(format!(".tmp-{}", Uuid::new_v4().simple())));
        let stage_err = |source| WriteError::Stage {
            path: tmp.path.clone(),
            source,
        };

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        let mut file = options.open(&tmp.path).map_err(stage_err)?;
        file.write_all(data).map_err(stage_err)?;
        file.sync_all().map_err(stage_err)?;
        drop(file);
        // The open above is narrowed by the umask; apply the exact mode.
        set_mode(&tmp.path, mode).map_err(stage_err)?;

        before_commit(&tmp.path).map_err(stage_err)?;

        fs::rename(&tmp.path, path).map_err(|source| WriteError::Commit {
            path: path.to_path_buf(),
            source,
        })?;
        tmp.disarm();

        sync_dir(dir);
        debug!(path = %path.display(), bytes = data.len(), "atomic write committed");
        Ok(())
    }
}

impl DocumentWriter for AtomicWriter {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), WriteError> {
        AtomicWriter::write(self, path, data)
    }
}

/// Removes the staged file on drop unless the rename consumed it.
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "failed to remove temporary file: {e}"),
        }
    }
}

/// Makes the rename itself durable.  Best effort: not every platform allows
/// opening a directory for syncing.
fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        debug!(dir = %dir.display(), "directory sync skipped: {e}");
    }
    #[cfg(not(unix))]
    let _ = dir;
}
