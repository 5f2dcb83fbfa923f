//! A single declared path and its consistency rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{BaseDir, PathCategory, PathKind, PathPriority, Subcategory};
use crate::xdg::{Location, PathRequest, PathResolver};

/// Why a [`PathEntry`] is inconsistent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("app name cannot be empty")]
    EmptyAppName,

    #[error("name cannot be empty")]
    EmptyName,

    #[error("max_children cannot be set for {0} type")]
    ChildLimitOnNonDirectory(PathKind),

    #[error("has_subdirs cannot be set for {0} type")]
    SubdirsOnNonDirectory(PathKind),

    #[error("max_size cannot be set for {0} type")]
    SizeLimitOnNonFile(PathKind),

    #[error("format cannot be set for {0} type")]
    FormatOnNonFile(PathKind),

    #[error("cleanup age ({cleanup} days) cannot exceed retention ({retention} days)")]
    CleanupExceedsRetention { cleanup: u16, retention: u16 },

    #[error("versioning only applies to config entries, not {0}")]
    VersionedOutsideConfig(PathCategory),

    #[error("subcategory '{subcategory}' is not valid for category {category}")]
    SubcategoryNotAllowed {
        subcategory: Subcategory,
        category: PathCategory,
    },

    #[error("permissions 0000 make the path inaccessible")]
    ZeroPermissions,
}

/// One file, directory, or symlink an application owns.
///
/// Entries are plain data: build one with [`PathEntry::new`] or from a
/// template in [`templates`](super::templates), adjust it with the `with_*`
/// setters or struct-update syntax, then [`validate`](Self::validate) it.
/// Zero values of the numeric limits mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathEntry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app_name: String,
    pub name: String,
    pub base_dir: BaseDir,
    /// Optional level inserted between the base directory and the app name.
    #[serde(rename = "groupcategory", skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(skip_serializing_if = "Subcategory::is_empty")]
    pub subcategory: Subcategory,
    #[serde(rename = "path_type")]
    pub kind: PathKind,
    pub category: PathCategory,
    pub priority: PathPriority,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Name pattern for dynamically named files.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    pub default_perm: u32,
    pub owner_only: bool,
    #[serde(rename = "is_mandatory")]
    pub mandatory: bool,
    #[serde(rename = "is_auto_created")]
    pub auto_created: bool,
    #[serde(rename = "is_backed_up")]
    pub backed_up: bool,
    #[serde(rename = "is_versioned")]
    pub versioned: bool,
    #[serde(rename = "is_compressible")]
    pub compressible: bool,
    /// Size limit in bytes. Files only.
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub max_size: u64,
    /// Data format tag (`json`, `toml`, `text`, ...). Files only.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Directories only.
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_children: u32,
    /// Directories only.
    pub has_subdirs: bool,
    #[serde(skip_serializing_if = "is_zero_u16")]
    pub retention_days: u16,
    #[serde(skip_serializing_if = "is_zero_u16")]
    pub cleanup_age: u16,
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

fn is_zero_u16(v: &u16) -> bool {
    *v == 0
}

impl PathEntry {
    /// Creates an entry with the category matching `base_dir` and the
    /// conventional permissions for `kind` (0644 files, 0755 otherwise).
    pub fn new(name: impl Into<String>, base_dir: BaseDir, kind: PathKind) -> Self {
        Self {
            name: name.into(),
            base_dir,
            kind,
            category: base_dir.category(),
            default_perm: match kind {
                PathKind::File => 0o644,
                PathKind::Directory | PathKind::Symlink => 0o755,
            },
            ..Self::default()
        }
    }

    /// Checks the entry's fields for consistency, stopping at the first
    /// violation.
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.app_name.is_empty() {
            return Err(EntryError::EmptyAppName);
        }
        if self.name.is_empty() {
            return Err(EntryError::EmptyName);
        }

        let is_dir = self.kind == PathKind::Directory;
        let is_file = self.kind == PathKind::File;
        if !is_dir && self.max_children > 0 {
            return Err(EntryError::ChildLimitOnNonDirectory(self.kind));
        }
        if !is_dir && self.has_subdirs {
            return Err(EntryError::SubdirsOnNonDirectory(self.kind));
        }
        if !is_file && self.max_size > 0 {
            return Err(EntryError::SizeLimitOnNonFile(self.kind));
        }
        if !is_file && !self.format.is_empty() {
            return Err(EntryError::FormatOnNonFile(self.kind));
        }

        if self.retention_days > 0 && self.cleanup_age > self.retention_days {
            return Err(EntryError::CleanupExceedsRetention {
                cleanup: self.cleanup_age,
                retention: self.retention_days,
            });
        }
        if self.versioned && self.category != PathCategory::Config {
            return Err(EntryError::VersionedOutsideConfig(self.category));
        }
        if !self.subcategory.is_empty() && !self.category.allows(&self.subcategory) {
            return Err(EntryError::SubcategoryNotAllowed {
                subcategory: self.subcategory.clone(),
                category: self.category,
            });
        }
        if self.default_perm == 0 {
            return Err(EntryError::ZeroPermissions);
        }
        Ok(())
    }

    /// The resolver request describing where this entry lives.
    ///
    /// Directories append their name as a final subdirectory; files and
    /// symlinks use it as the file name.
    pub fn request(&self) -> PathRequest {
        let mut request = PathRequest::new(self.base_dir.kind(), self.app_name.as_str())
            .group(self.group.as_str())
            .subdir(self.subcategory.as_str());
        request = match self.kind {
            PathKind::Directory => request.subdir(self.name.as_str()),
            PathKind::File | PathKind::Symlink => request.file_name(self.name.as_str()),
        };
        request
    }

    /// Renders the entry's absolute location, or `None` if it is not
    /// constructible (empty app name, unknown base directory).
    pub fn render(&self, resolver: &PathResolver) -> Option<Location> {
        resolver.resolve(&self.request())
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_base_dir(mut self, base_dir: BaseDir) -> Self {
        self.base_dir = base_dir;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_subcategory(mut self, subcategory: Subcategory) -> Self {
        self.subcategory = subcategory;
        self
    }

    pub fn with_kind(mut self, kind: PathKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_category(mut self, category: PathCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: PathPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_default_perm(mut self, perm: u32) -> Self {
        self.default_perm = perm;
        self
    }

    pub fn with_owner_only(mut self, owner_only: bool) -> Self {
        self.owner_only = owner_only;
        self
    }

    pub fn with_mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    pub fn with_auto_created(mut self, auto_created: bool) -> Self {
        self.auto_created = auto_created;
        self
    }

    pub fn with_backed_up(mut self, backed_up: bool) -> Self {
        self.backed_up = backed_up;
        self
    }

    pub fn with_versioned(mut self, versioned: bool) -> Self {
        self.versioned = versioned;
        self
    }

    pub fn with_compressible(mut self, compressible: bool) -> Self {
        self.compressible = compressible;
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_max_children(mut self, max_children: u32) -> Self {
        self.max_children = max_children;
        self
    }

    pub fn with_has_subdirs(mut self, has_subdirs: bool) -> Self {
        self.has_subdirs = has_subdirs;
        self
    }

    pub fn with_retention_days(mut self, days: u16) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_cleanup_age(mut self, days: u16) -> Self {
        self.cleanup_age = days;
        self
    }
}
