//! Mock document writer for unit testing.
//!
//! Records every write in memory instead of touching the filesystem, and can
//! be switched into a failing mode to exercise persistence-failure paths.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::atomic::{DocumentWriter, WriteError};

/// A [`DocumentWriter`] that stores writes in memory.
#[derive(Debug, Default)]
pub struct MockWriter {
    writes: Mutex<Vec<(PathBuf, Vec<u8>)>>,
    should_fail: AtomicBool,
}

impl MockWriter {
    /// Creates a mock writer that accepts every write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock writer that rejects every write.
    pub fn failing() -> Self {
        let writer = Self::new();
        writer.set_should_fail(true);
        writer
    }

    /// Toggles failure mode. A failed write is not recorded.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().expect("lock poisoned").len()
    }

    /// The most recent successful write, if any.
    pub fn last_write(&self) -> Option<(PathBuf, Vec<u8>)> {
        self.writes.lock().expect("lock poisoned").last().cloned()
    }
}

impl DocumentWriter for MockWriter {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), WriteError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(WriteError::Simulated(path.to_path_buf()));
        }
        self.writes
            .lock()
            .expect("lock poisoned")
            .push((path.to_path_buf(), data.to_vec()));
        Ok(())
    }
}
