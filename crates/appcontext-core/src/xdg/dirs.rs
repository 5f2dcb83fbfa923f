//! Base-directory kinds and the environment snapshot they resolve against.
//!
//! Each kind reads one override variable and falls back to a conventional
//! location under the user's home directory:
//!
//! | kind      | override            | default            |
//! |-----------|---------------------|--------------------|
//! | `config`  | `XDG_CONFIG_HOME`   | `~/.config`        |
//! | `data`    | `XDG_DATA_HOME`     | `~/.local/share`   |
//! | `cache`   | `XDG_CACHE_HOME`    | `~/.cache`         |
//! | `state`   | `XDG_STATE_HOME`    | `~/.local/state`   |
//! | `runtime` | `XDG_RUNTIME_DIR`   | `~/.local/run`     |
//! | `temp`    | `TMPDIR`            | `/tmp`; `TMP`/`TEMP` on Windows |
//!
//! Empty and relative override values are ignored, as the XDG Base Directory
//! Specification requires.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Returned when a base-directory name is not one of the six known kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown base directory kind: '{0}'")]
pub struct UnknownBaseDir(pub String);

/// The kind of base directory a path is rooted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseDirKind {
    Config,
    Data,
    Cache,
    State,
    Runtime,
    Temp,
}

impl BaseDirKind {
    /// Every kind, in resolution-table order.
    pub const ALL: [BaseDirKind; 6] = [
        BaseDirKind::Config,
        BaseDirKind::Data,
        BaseDirKind::Cache,
        BaseDirKind::State,
        BaseDirKind::Runtime,
        BaseDirKind::Temp,
    ];

    /// Lower-case name used in parsing and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseDirKind::Config => "config",
            BaseDirKind::Data => "data",
            BaseDirKind::Cache => "cache",
            BaseDirKind::State => "state",
            BaseDirKind::Runtime => "runtime",
            BaseDirKind::Temp => "temp",
        }
    }

    /// Environment variable that overrides this kind's base directory.
    pub fn env_var(&self) -> &'static str {
        match self {
            BaseDirKind::Config => "XDG_CONFIG_HOME",
            BaseDirKind::Data => "XDG_DATA_HOME",
            BaseDirKind::Cache => "XDG_CACHE_HOME",
            BaseDirKind::State => "XDG_STATE_HOME",
            BaseDirKind::Runtime => "XDG_RUNTIME_DIR",
            BaseDirKind::Temp => "TMPDIR",
        }
    }

    /// Default location relative to the home directory, or `None` for `temp`.
    fn home_relative(&self) -> Option<&'static [&'static str]> {
        match self {
            BaseDirKind::Config => Some(&[".config"]),
            BaseDirKind::Data => Some(&[".local", "share"]),
            BaseDirKind::Cache => Some(&[".cache"]),
            BaseDirKind::State => Some(&[".local", "state"]),
            BaseDirKind::Runtime => Some(&[".local", "run"]),
            BaseDirKind::Temp => None,
        }
    }
}

impl fmt::Display for BaseDirKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseDirKind {
    type Err = UnknownBaseDir;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BaseDirKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownBaseDir(s.to_string()))
    }
}

/// A snapshot of the six base directories.
///
/// A base is `None` when neither its override nor the home directory is
/// available; paths under it are then not constructible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XdgDirs {
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    cache: Option<PathBuf>,
    state: Option<PathBuf>,
    runtime: Option<PathBuf>,
    temp: Option<PathBuf>,
}

impl XdgDirs {
    /// Captures the base directories from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Captures the base directories from an arbitrary variable source.
    ///
    /// `lookup` receives variable names (`HOME`, `XDG_CONFIG_HOME`, ...) and
    /// returns their values.  Used to resolve against a synthetic
    /// environment without mutating the process one.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let home = lookup("HOME")
            .or_else(|| lookup("USERPROFILE"))
            .filter(|h| !h.is_empty())
            .map(PathBuf::from);

        let resolve = |kind: BaseDirKind| -> Option<PathBuf> {
            let overridden = lookup(kind.env_var())
                .map(PathBuf::from)
                .filter(|p| p.is_absolute());
            if overridden.is_some() {
                return overridden;
            }
            match kind.home_relative() {
                Some(parts) => home
                    .as_ref()
                    .map(|h| parts.iter().fold(h.clone(), |acc, part| acc.join(part))),
                None => temp_fallback(&lookup),
            }
        };

        Self {
            config: resolve(BaseDirKind::Config),
            data: resolve(BaseDirKind::Data),
            cache: resolve(BaseDirKind::Cache),
            state: resolve(BaseDirKind::State),
            runtime: resolve(BaseDirKind::Runtime),
            temp: resolve(BaseDirKind::Temp),
        }
    }

    /// Places every base directory under `root`, named after its kind
    /// (`root/config`, `root/data`, ...).
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let base = |kind: BaseDirKind| Some(root.join(kind.as_str()));
        Self {
            config: base(BaseDirKind::Config),
            data: base(BaseDirKind::Data),
            cache: base(BaseDirKind::Cache),
            state: base(BaseDirKind::State),
            runtime: base(BaseDirKind::Runtime),
            temp: base(BaseDirKind::Temp),
        }
    }

    /// Returns the base directory for `kind`, if one could be determined.
    pub fn base(&self, kind: BaseDirKind) -> Option<&Path> {
        let base = match kind {
            BaseDirKind::Config => &self.config,
            BaseDirKind::Data => &self.data,
            BaseDirKind::Cache => &self.cache,
            BaseDirKind::State => &self.state,
            BaseDirKind::Runtime => &self.runtime,
            BaseDirKind::Temp => &self.temp,
        };
        base.as_deref()
    }
}

/// Platform temp directory, read through `lookup` like every other base.
fn temp_fallback<F>(lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    #[cfg(windows)]
    {
        lookup("TMP")
            .or_else(|| lookup("TEMP"))
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
    }
    #[cfg(not(windows))]
    {
        let _ = lookup;
        Some(PathBuf::from("/tmp"))
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_base_dir_kind_parses_every_known_name() {
        for kind in BaseDirKind::ALL {
            assert_eq!(kind.as_str().parse::<BaseDirKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_base_dir_kind_rejects_unknown_name() {
        let err = "invalid".parse::<BaseDirKind>().unwrap_err();
        assert_eq!(err, UnknownBaseDir("invalid".to_string()));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_from_lookup_uses_home_defaults_when_no_overrides() {
        let dirs = XdgDirs::from_lookup(lookup_from(&[("HOME", "/home/ann")]));

        assert_eq!(dirs.base(BaseDirKind::Config), Some(Path::new("/home/ann/.config")));
        assert_eq!(
            dirs.base(BaseDirKind::Data),
            Some(Path::new("/home/ann/.local/share"))
        );
        assert_eq!(dirs.base(BaseDirKind::Cache), Some(Path::new("/home/ann/.cache")));
        assert_eq!(
            dirs.base(BaseDirKind::State),
            Some(Path::new("/home/ann/.local/state"))
        );
        assert_eq!(
            dirs.base(BaseDirKind::Runtime),
            Some(Path::new("/home/ann/.local/run"))
        );
    }

    #[test]
    fn test_from_lookup_prefers_absolute_overrides() {
        let dirs = XdgDirs::from_lookup(lookup_from(&[
            ("HOME", "/home/ann"),
            ("XDG_CONFIG_HOME", "/etc/alt-config"),
            ("XDG_STATE_HOME", "/var/state"),
        ]));

        assert_eq!(dirs.base(BaseDirKind::Config), Some(Path::new("/etc/alt-config")));
        assert_eq!(dirs.base(BaseDirKind::State), Some(Path::new("/var/state")));
        assert_eq!(dirs.base(BaseDirKind::Cache), Some(Path::new("/home/ann/.cache")));
    }

    #[test]
    fn test_from_lookup_ignores_empty_and_relative_overrides() {
        let dirs = XdgDirs::from_lookup(lookup_from(&[
            ("HOME", "/home/ann"),
            ("XDG_CONFIG_HOME", ""),
            ("XDG_DATA_HOME", "relative/data"),
        ]));

        assert_eq!(dirs.base(BaseDirKind::Config), Some(Path::new("/home/ann/.config")));
        assert_eq!(
            dirs.base(BaseDirKind::Data),
            Some(Path::new("/home/ann/.local/share"))
        );
    }

    #[test]
    fn test_from_lookup_without_home_leaves_home_based_kinds_unresolved() {
        let dirs = XdgDirs::from_lookup(lookup_from(&[("XDG_CACHE_HOME", "/var/cache/x")]));

        assert_eq!(dirs.base(BaseDirKind::Config), None);
        assert_eq!(dirs.base(BaseDirKind::Cache), Some(Path::new("/var/cache/x")));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_lookup_temp_ignores_process_environment() {
        let empty = XdgDirs::from_lookup(|_| None);
        let overridden = XdgDirs::from_lookup(lookup_from(&[("TMPDIR", "/var/scratch")]));

        assert_eq!(empty.base(BaseDirKind::Temp), Some(Path::new("/tmp")));
        assert_eq!(overridden.base(BaseDirKind::Temp), Some(Path::new("/var/scratch")));
    }

    #[test]
    fn test_rooted_at_names_bases_after_kinds() {
        let dirs = XdgDirs::rooted_at("/sandbox");
        for kind in BaseDirKind::ALL {
            assert_eq!(dirs.base(kind), Some(Path::new("/sandbox").join(kind.as_str()).as_path()));
        }
    }
}
