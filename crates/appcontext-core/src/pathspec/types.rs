//! Vocabulary of the path layout: where an entry lives, what it is, and how
//! it is classified.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::xdg::BaseDirKind;

/// The base directory an entry is rooted in.
///
/// `Runtime` entries live under the XDG state directory; the XDG runtime
/// directory is reserved for sockets and is not addressed by layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseDir {
    #[default]
    Config,
    Data,
    Cache,
    Runtime,
    Temp,
}

impl BaseDir {
    pub const ALL: [BaseDir; 5] = [
        BaseDir::Config,
        BaseDir::Data,
        BaseDir::Cache,
        BaseDir::Runtime,
        BaseDir::Temp,
    ];

    /// The resolver kind used to render paths under this base.
    pub fn kind(&self) -> BaseDirKind {
        match self {
            BaseDir::Config => BaseDirKind::Config,
            BaseDir::Data => BaseDirKind::Data,
            BaseDir::Cache => BaseDirKind::Cache,
            BaseDir::Runtime => BaseDirKind::State,
            BaseDir::Temp => BaseDirKind::Temp,
        }
    }

    /// The lifecycle category that conventionally accompanies this base.
    pub fn category(&self) -> PathCategory {
        match self {
            BaseDir::Config => PathCategory::Config,
            BaseDir::Data => PathCategory::Data,
            BaseDir::Cache => PathCategory::Cache,
            BaseDir::Runtime => PathCategory::Runtime,
            BaseDir::Temp => PathCategory::Temp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseDir::Config => "config",
            BaseDir::Data => "data",
            BaseDir::Cache => "cache",
            BaseDir::Runtime => "runtime",
            BaseDir::Temp => "temp",
        }
    }
}

impl fmt::Display for BaseDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The filesystem object an entry describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    #[default]
    File,
    Directory,
    Symlink,
}

impl PathKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::File => "file",
            PathKind::Directory => "directory",
            PathKind::Symlink => "symlink",
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle category, used for grouping and for subcategory validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCategory {
    #[default]
    Config,
    Data,
    Cache,
    Runtime,
    Temp,
}

impl PathCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathCategory::Config => "config",
            PathCategory::Data => "data",
            PathCategory::Cache => "cache",
            PathCategory::Runtime => "runtime",
            PathCategory::Temp => "temp",
        }
    }

    /// The closed set of subcategories legal for this category.
    pub fn allowed_subcategories(&self) -> &'static [Subcategory] {
        match self {
            PathCategory::Config => CONFIG_SUBCATEGORIES,
            PathCategory::Data => DATA_SUBCATEGORIES,
            PathCategory::Cache => CACHE_SUBCATEGORIES,
            PathCategory::Runtime => RUNTIME_SUBCATEGORIES,
            PathCategory::Temp => TEMP_SUBCATEGORIES,
        }
    }

    pub fn allows(&self, subcategory: &Subcategory) -> bool {
        self.allowed_subcategories().contains(subcategory)
    }
}

impl fmt::Display for PathCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CONFIG_SUBCATEGORIES: &[Subcategory] =
    &[Subcategory::NONE, Subcategory::TEMPLATES, Subcategory::PLUGINS];
const DATA_SUBCATEGORIES: &[Subcategory] = &[
    Subcategory::DATABASE,
    Subcategory::STORAGE,
    Subcategory::STATE,
    Subcategory::RESOURCES,
    Subcategory::PROCESSES,
    Subcategory::PROJECTS,
    Subcategory::BACKUPS,
    Subcategory::UPLOADS,
    Subcategory::EXPORTS,
];
const CACHE_SUBCATEGORIES: &[Subcategory] = &[Subcategory::CACHE, Subcategory::THUMBNAILS];
const RUNTIME_SUBCATEGORIES: &[Subcategory] = &[Subcategory::LOGS, Subcategory::STATS];
const TEMP_SUBCATEGORIES: &[Subcategory] =
    &[Subcategory::LOCKS, Subcategory::SOCKETS, Subcategory::PROCESSING];

/// Informational priority for management tooling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

/// Second-level directory below the application directory.
///
/// Well-known values are provided as constants; arbitrary values can be
/// built with [`Subcategory::new`] but only pass validation if their
/// category allows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subcategory(Cow<'static, str>);

impl Subcategory {
    /// No subcategory: the entry sits directly in the application directory.
    pub const NONE: Subcategory = Subcategory::from_static("");
    pub const TEMPLATES: Subcategory = Subcategory::from_static("templates");
    pub const PLUGINS: Subcategory = Subcategory::from_static("plugins");
    pub const DATABASE: Subcategory = Subcategory::from_static("database");
    pub const STORAGE: Subcategory = Subcategory::from_static("storage");
    pub const STATE: Subcategory = Subcategory::from_static("state");
    pub const RESOURCES: Subcategory = Subcategory::from_static("resources");
    pub const PROCESSES: Subcategory = Subcategory::from_static("processes");
    pub const PROJECTS: Subcategory = Subcategory::from_static("projects");
    pub const BACKUPS: Subcategory = Subcategory::from_static("backups");
    pub const UPLOADS: Subcategory = Subcategory::from_static("uploads");
    pub const EXPORTS: Subcategory = Subcategory::from_static("exports");
    pub const CACHE: Subcategory = Subcategory::from_static("cache");
    pub const THUMBNAILS: Subcategory = Subcategory::from_static("thumbnails");
    pub const LOGS: Subcategory = Subcategory::from_static("logs");
    pub const STATS: Subcategory = Subcategory::from_static("stats");
    pub const LOCKS: Subcategory = Subcategory::from_static("locks");
    pub const SOCKETS: Subcategory = Subcategory::from_static("sockets");
    pub const PROCESSING: Subcategory = Subcategory::from_static("processing");

    const fn from_static(name: &'static str) -> Self {
        Subcategory(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Subcategory(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Subcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subcategory {
    fn from(name: &str) -> Self {
        Subcategory::new(name)
    }
}
