//! The application layout: entries bucketed by base directory.
//!
//! # Lifecycle
//!
//! ```text
//! Layout::new / from_manifest / import   validate every entry, fail on first
//!            │
//!            ├── generate()  create what is missing, report every failure
//!            └── assess()    compare the filesystem against the entries
//! ```
//!
//! `generate` and `assess` perform unsynchronized filesystem I/O.  Running
//! them concurrently with each other, or with another process touching the
//! same paths, is the caller's responsibility to coordinate.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::entry::{EntryError, PathEntry};
use super::types::{BaseDir, PathKind};
use crate::fsio::atomic::{AtomicWriter, WriteError};
use crate::fsio::{create_dir_all_with_mode, mode_of, set_mode};
use crate::xdg::{Location, PathResolver};

/// Mode for parent directories created on the way to an entry.
const PARENT_DIR_MODE: u32 = 0o755;

/// Errors produced by layout construction and materialization.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// An entry failed validation.
    #[error("validation failed for path {name}: {source}")]
    InvalidEntry {
        name: String,
        #[source]
        source: EntryError,
    },

    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest is not a valid layout document.
    #[error("malformed layout manifest: {0}")]
    Manifest(#[source] serde_json::Error),

    /// The layout could not be encoded as a manifest.
    #[error("failed to encode layout manifest: {0}")]
    Encode(#[source] serde_json::Error),

    /// The manifest could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// One or more entries could not be materialized.
    #[error("generation failed for {} path(s):\n{}", .failures.len(), .failures.join("\n"))]
    Generation { failures: Vec<String> },

    /// The filesystem does not match the layout.
    #[error("assessment found {count} discrepancies")]
    Assessment { count: usize },
}

/// One way in which the filesystem differs from a layout entry.
///
/// All variants weigh the same: any discrepancy makes
/// [`Assessment::status`] an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Discrepancy {
    #[error("invalid path {name}: {reason}")]
    InvalidEntry { name: String, reason: EntryError },

    #[error("path {name} cannot be resolved")]
    Unresolvable { name: String },

    #[error("mandatory path does not exist: {}", .path.display())]
    MissingMandatory { path: PathBuf },

    #[error("cannot access path {}: {reason}", .path.display())]
    Inaccessible { path: PathBuf, reason: String },

    #[error("path type mismatch: {} is {actual} but expected {expected}", .path.display())]
    TypeMismatch {
        path: PathBuf,
        expected: PathKind,
        actual: PathKind,
    },

    #[error("invalid permissions 0000 for {}: path is completely inaccessible", .path.display())]
    ZeroPermissions { path: PathBuf },

    #[error("permissions mismatch for {}: has {actual:04o}, expected {expected:04o}", .path.display())]
    PermissionMismatch {
        path: PathBuf,
        actual: u32,
        expected: u32,
    },

    #[error("file size exceeds limit for {}: {size} > {limit}", .path.display())]
    SizeExceeded { path: PathBuf, size: u64, limit: u64 },

    #[error("directory children count exceeded for {}: {count} > {limit}", .path.display())]
    ChildrenExceeded {
        path: PathBuf,
        count: usize,
        limit: u32,
    },

    #[error("cannot read directory {}: {reason}", .path.display())]
    UnreadableDir { path: PathBuf, reason: String },
}

/// The outcome of [`Layout::assess`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assessment {
    pub discrepancies: Vec<Discrepancy>,
}

impl Assessment {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.discrepancies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discrepancies.is_empty()
    }

    /// Human-readable discrepancy messages, in entry order.
    pub fn messages(&self) -> Vec<String> {
        self.discrepancies.iter().map(ToString::to_string).collect()
    }

    /// `Err` carrying the discrepancy count if there is at least one.
    pub fn status(&self) -> Result<(), LayoutError> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(LayoutError::Assessment { count: self.len() })
        }
    }
}

/// A complete application file structure.
///
/// Serializes to the layout manifest: `app_name`, optional `app_version`,
/// and one entry array per base directory.  The resolver used for rendering
/// is runtime state and is not part of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub app_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    config_paths: Vec<PathEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    data_paths: Vec<PathEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cache_paths: Vec<PathEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    runtime_paths: Vec<PathEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    temp_paths: Vec<PathEntry>,
    #[serde(skip)]
    resolver: PathResolver,
}

impl Layout {
    /// Builds a layout from a flat entry list.
    ///
    /// Entries without an application name inherit `app_name`.  Fails on the
    /// first invalid entry, naming it.
    pub fn new(
        app_name: impl Into<String>,
        entries: impl IntoIterator<Item = PathEntry>,
    ) -> Result<Self, LayoutError> {
        let mut layout = Self {
            app_name: app_name.into(),
            ..Self::default()
        };
        for mut entry in entries {
            if entry.app_name.is_empty() {
                entry.app_name = layout.app_name.clone();
            }
            check(&entry)?;
            layout.bucket_mut(entry.base_dir).push(entry);
        }
        Ok(layout)
    }

    /// Parses and validates a JSON layout manifest.
    pub fn from_manifest(text: &str) -> Result<Self, LayoutError> {
        let mut layout: Layout = serde_json::from_str(text).map_err(LayoutError::Manifest)?;
        let app_name = layout.app_name.clone();
        for base in BaseDir::ALL {
            for entry in layout.bucket_mut(base) {
                if entry.app_name.is_empty() {
                    entry.app_name = app_name.clone();
                }
                check(entry)?;
            }
        }
        Ok(layout)
    }

    /// Reads a manifest file. See [`from_manifest`](Self::from_manifest).
    pub fn import(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LayoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let layout = Self::from_manifest(&text)?;
        debug!(path = %path.display(), entries = layout.len(), "layout manifest imported");
        Ok(layout)
    }

    /// Writes the manifest atomically to `path`.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        let path = path.as_ref();
        let bytes = serde_json::to_vec_pretty(self).map_err(LayoutError::Encode)?;
        AtomicWriter::default().write(path, &bytes)?;
        info!(path = %path.display(), entries = self.len(), "layout manifest exported");
        Ok(())
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }

    /// Renders entries against `resolver` instead of the process environment.
    pub fn with_resolver(mut self, resolver: PathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// The entries rooted in `base`, in insertion order.
    pub fn entries(&self, base: BaseDir) -> &[PathEntry] {
        match base {
            BaseDir::Config => &self.config_paths,
            BaseDir::Data => &self.data_paths,
            BaseDir::Cache => &self.cache_paths,
            BaseDir::Runtime => &self.runtime_paths,
            BaseDir::Temp => &self.temp_paths,
        }
    }

    fn bucket_mut(&mut self, base: BaseDir) -> &mut Vec<PathEntry> {
        match base {
            BaseDir::Config => &mut self.config_paths,
            BaseDir::Data => &mut self.data_paths,
            BaseDir::Cache => &mut self.cache_paths,
            BaseDir::Runtime => &mut self.runtime_paths,
            BaseDir::Temp => &mut self.temp_paths,
        }
    }

    /// Every entry: config first, then data, cache, runtime, and temp.
    pub fn all_entries(&self) -> impl Iterator<Item = &PathEntry> + '_ {
        BaseDir::ALL
            .into_iter()
            .flat_map(move |base| self.entries(base).iter())
    }

    pub fn len(&self) -> usize {
        BaseDir::ALL.iter().map(|base| self.entries(*base).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds an entry by name.
    pub fn find(&self, name: &str) -> Option<&PathEntry> {
        self.all_entries().find(|entry| entry.name == name)
    }

    /// Renders `entry` with this layout's resolver.
    pub fn location(&self, entry: &PathEntry) -> Option<Location> {
        entry.render(&self.resolver)
    }

    /// Creates every missing directory and file.
    ///
    /// Existing objects are left untouched, so repeated calls are harmless.
    /// Newly created objects get exactly the entry's permission bits.  Every
    /// per-entry failure is collected and reported together in
    /// [`LayoutError::Generation`]; symlink entries always fail.
    pub fn generate(&self) -> Result<(), LayoutError> {
        let mut failures = Vec::new();
        for entry in self.all_entries() {
            if let Err(failure) = self.generate_entry(entry) {
                warn!(app = %self.app_name, entry = %entry.name, "{failure}");
                failures.push(failure);
            }
        }
        if !failures.is_empty() {
            return Err(LayoutError::Generation { failures });
        }
        info!(app = %self.app_name, entries = self.len(), "layout generated");
        Ok(())
    }

    fn generate_entry(&self, entry: &PathEntry) -> Result<(), String> {
        entry
            .validate()
            .map_err(|e| format!("invalid path {}: {e}", entry.name))?;
        let location = self
            .location(entry)
            .ok_or_else(|| format!("path {} cannot be resolved", entry.name))?;
        let path = location.path();

        match entry.kind {
            PathKind::Directory => create_directory(path, entry.default_perm)
                .map_err(|e| format!("directory {}: {e}", path.display())),
            PathKind::File => {
                if let Some(parent) = path.parent() {
                    create_dir_all_with_mode(parent, PARENT_DIR_MODE).map_err(|e| {
                        format!("parent directory for {}: {e}", path.display())
                    })?;
                }
                create_file(path, entry.default_perm)
                    .map_err(|e| format!("file {}: {e}", path.display()))
            }
            PathKind::Symlink => Err(format!(
                "symlink {}: symlink creation not supported",
                path.display()
            )),
        }
    }

    /// Compares the filesystem with every entry.
    ///
    /// Missing optional entries are skipped.  The assessment itself never
    /// fails; use [`Assessment::status`] for a pass/fail signal.
    pub fn assess(&self) -> Assessment {
        let mut found = Vec::new();
        for entry in self.all_entries() {
            self.assess_entry(entry, &mut found);
        }
        for discrepancy in &found {
            debug!(app = %self.app_name, "{discrepancy}");
        }
        Assessment {
            discrepancies: found,
        }
    }

    fn assess_entry(&self, entry: &PathEntry, found: &mut Vec<Discrepancy>) {
        if let Err(reason) = entry.validate() {
            found.push(Discrepancy::InvalidEntry {
                name: entry.name.clone(),
                reason,
            });
            return;
        }
        let Some(location) = self.location(entry) else {
            found.push(Discrepancy::Unresolvable {
                name: entry.name.clone(),
            });
            return;
        };
        let path = location.into_path_buf();

        let metadata = match entry.kind {
            PathKind::Symlink => fs::symlink_metadata(&path),
            PathKind::File | PathKind::Directory => fs::metadata(&path),
        };
        let metadata = match metadata {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if entry.mandatory {
                    found.push(Discrepancy::MissingMandatory { path });
                }
                return;
            }
            Err(e) => {
                found.push(Discrepancy::Inaccessible {
                    path,
                    reason: e.to_string(),
                });
                return;
            }
        };

        let actual = kind_of(&metadata);
        if actual != entry.kind {
            found.push(Discrepancy::TypeMismatch {
                path,
                expected: entry.kind,
                actual,
            });
            return;
        }

        // Link permissions are not meaningful on most platforms.
        if entry.kind != PathKind::Symlink {
            if let Some(actual) = mode_of(&metadata) {
                let expected = entry.default_perm & 0o777;
                if actual == 0 {
                    found.push(Discrepancy::ZeroPermissions { path: path.clone() });
                }
                if actual != expected {
                    found.push(Discrepancy::PermissionMismatch {
                        path: path.clone(),
                        actual,
                        expected,
                    });
                }
            }
        }

        match entry.kind {
            PathKind::File if entry.max_size > 0 && metadata.len() > entry.max_size => {
                found.push(Discrepancy::SizeExceeded {
                    size: metadata.len(),
                    limit: entry.max_size,
                    path,
                });
            }
            PathKind::Directory if entry.max_children > 0 => match fs::read_dir(&path) {
                Ok(children) => {
                    let count = children.count();
                    if count > entry.max_children as usize {
                        found.push(Discrepancy::ChildrenExceeded {
                            path,
                            count,
                            limit: entry.max_children,
                        });
                    }
                }
                Err(e) => found.push(Discrepancy::UnreadableDir {
                    path,
                    reason: e.to_string(),
                }),
            },
            _ => {}
        }
    }
}

fn check(entry: &PathEntry) -> Result<(), LayoutError> {
    entry.validate().map_err(|source| LayoutError::InvalidEntry {
        name: entry.name.clone(),
        source,
    })
}

fn kind_of(metadata: &fs::Metadata) -> PathKind {
    let file_type = metadata.file_type();
    if file_type.is_dir() {
        PathKind::Directory
    } else if file_type.is_symlink() {
        PathKind::Symlink
    } else {
        PathKind::File
    }
}

fn create_directory(path: &Path, mode: u32) -> io::Result<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "exists and is not a directory",
            ))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    if let Some(parent) = path.parent() {
        create_dir_all_with_mode(parent, PARENT_DIR_MODE)?;
    }
    create_dir_all_with_mode(path, mode)?;
    set_mode(path, mode)?;
    debug!(path = %path.display(), "created directory ({mode:04o})");
    Ok(())
}

fn create_file(path: &Path, mode: u32) -> io::Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {
            set_mode(path, mode)?;
            debug!(path = %path.display(), "created file ({mode:04o})");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}
