//! Deterministic path assembly on top of [`XdgDirs`].
//!
//! A path is built as `base → [group] → app → [subdirs...] → [file]`.

use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use super::dirs::{BaseDirKind, XdgDirs};

/// A resolved path together with what it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// The path names a file.
    File(PathBuf),
    /// The path names a directory.
    Dir(PathBuf),
}

impl Location {
    /// The path without any directory marker.
    pub fn path(&self) -> &Path {
        match self {
            Location::File(p) | Location::Dir(p) => p,
        }
    }

    pub fn into_path_buf(self) -> PathBuf {
        match self {
            Location::File(p) | Location::Dir(p) => p,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Location::Dir(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Location::File(_))
    }
}

/// Renders the path; directories end with [`MAIN_SEPARATOR`].
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.path().display().to_string();
        match self {
            Location::File(_) => f.write_str(&rendered),
            Location::Dir(_) if rendered.ends_with(MAIN_SEPARATOR) => f.write_str(&rendered),
            Location::Dir(_) => write!(f, "{rendered}{MAIN_SEPARATOR}"),
        }
    }
}

/// The named parameters of a single resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    pub kind: BaseDirKind,
    pub app_name: String,
    pub group: Option<String>,
    pub subdirs: Vec<String>,
    pub file_name: Option<String>,
}

impl PathRequest {
    pub fn new(kind: BaseDirKind, app_name: impl Into<String>) -> Self {
        Self {
            kind,
            app_name: app_name.into(),
            group: None,
            subdirs: Vec::new(),
            file_name: None,
        }
    }

    /// Inserts a project group between the base directory and the app name.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Appends one subdirectory below the app directory.
    pub fn subdir(mut self, dir: impl Into<String>) -> Self {
        self.subdirs.push(dir.into());
        self
    }

    /// Appends several subdirectories, in order.
    pub fn subdirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Makes the request resolve to a file instead of a directory.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }
}

/// Builds absolute paths from [`PathRequest`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolver {
    dirs: XdgDirs,
}

impl PathResolver {
    pub fn new(dirs: XdgDirs) -> Self {
        Self { dirs }
    }

    /// A resolver bound to the current process environment.
    pub fn from_env() -> Self {
        Self::new(XdgDirs::from_env())
    }

    pub fn dirs(&self) -> &XdgDirs {
        &self.dirs
    }

    /// Resolves `request` to a [`Location`].
    ///
    /// Returns `None` when the request is not constructible: the app name is
    /// empty, or the base directory for the requested kind is unknown.
    /// Empty group, subdirectory, and file-name components are skipped; an
    /// empty file name therefore yields a directory.
    pub fn resolve(&self, request: &PathRequest) -> Option<Location> {
        if request.app_name.is_empty() {
            return None;
        }
        let mut path = self.dirs.base(request.kind)?.to_path_buf();

        if let Some(group) = request.group.as_deref().filter(|g| !g.is_empty()) {
            path.push(group);
        }
        path.push(&request.app_name);
        for dir in request.subdirs.iter().filter(|d| !d.is_empty()) {
            path.push(dir);
        }

        match request.file_name.as_deref().filter(|f| !f.is_empty()) {
            Some(file) => {
                path.push(file);
                Some(Location::File(path))
            }
            None => Some(Location::Dir(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new(XdgDirs::rooted_at("/sandbox"))
    }

    fn sep() -> String {
        MAIN_SEPARATOR.to_string()
    }

    #[test]
    fn test_resolve_app_directory_is_dir_with_trailing_separator() {
        let loc = resolver()
            .resolve(&PathRequest::new(BaseDirKind::Config, "myapp"))
            .unwrap();

        assert!(loc.is_dir());
        assert_eq!(loc.path(), Path::new("/sandbox/config/myapp"));
        assert_eq!(loc.to_string(), format!("/sandbox/config/myapp{}", sep()));
    }

    #[test]
    fn test_resolve_with_file_name_is_file_without_trailing_separator() {
        let loc = resolver()
            .resolve(&PathRequest::new(BaseDirKind::Config, "myapp").file_name("config.json"))
            .unwrap();

        assert!(loc.is_file());
        assert_eq!(loc.to_string(), "/sandbox/config/myapp/config.json");
    }

    #[test]
    fn test_resolve_places_group_before_app_and_subdirs_after() {
        let request = PathRequest::new(BaseDirKind::Data, "myapp")
            .group("mycompany")
            .subdirs(["database", "backups"])
            .file_name("backup.db");

        let loc = resolver().resolve(&request).unwrap();

        assert_eq!(
            loc,
            Location::File(PathBuf::from(
                "/sandbox/data/mycompany/myapp/database/backups/backup.db"
            ))
        );
    }

    #[test]
    fn test_resolve_keeps_subdirectory_order() {
        let request = PathRequest::new(BaseDirKind::Cache, "testapp")
            .subdir("level1")
            .subdir("level2")
            .subdir("level3");

        let loc = resolver().resolve(&request).unwrap();

        assert_eq!(loc, Location::Dir(PathBuf::from("/sandbox/cache/testapp/level1/level2/level3")));
    }

    #[test]
    fn test_resolve_empty_app_name_is_not_constructible() {
        assert_eq!(resolver().resolve(&PathRequest::new(BaseDirKind::Config, "")), None);
    }

    #[test]
    fn test_resolve_unknown_base_is_not_constructible() {
        let dirs = XdgDirs::from_lookup(|_| None);
        let resolver = PathResolver::new(dirs);

        assert_eq!(resolver.resolve(&PathRequest::new(BaseDirKind::Config, "myapp")), None);
    }

    #[test]
    fn test_resolve_empty_file_name_yields_directory() {
        let loc = resolver()
            .resolve(&PathRequest::new(BaseDirKind::State, "myapp").file_name(""))
            .unwrap();
        assert!(loc.is_dir());
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let request = PathRequest::new(BaseDirKind::Runtime, "myapp").subdir("sockets");
        assert_eq!(resolver().resolve(&request), resolver().resolve(&request));
    }
}
