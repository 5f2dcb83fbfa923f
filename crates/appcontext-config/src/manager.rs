//! [`ConfigManager`]: one typed configuration value bound to one file.
//!
//! # State machine
//!
//! ```text
//! ConfigManager::new ──► Ready ──load()/load_first()──► Ready   (value replaced only on success)
//!                          │
//!                          └──save()──► Ready                     (file replaced atomically)
//! ```
//!
//! Every public operation holds the manager's lock for its whole duration,
//! so a `load` racing a `save` observes either the old or the new value, never
//! a mix.  Other processes editing the same file are not coordinated with.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use appcontext_core::{AtomicWriter, BaseDirKind, PathRequest, PathResolver, XdgDirs};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{BoxError, ConfigError};
use crate::format::Format;

/// A type that can check its own consistency.
pub trait Validate {
    fn validate(&self) -> Result<(), BoxError>;
}

/// Validation hook run before a loaded value is committed and before a save.
pub type Validator<T> = Arc<dyn Fn(&T) -> Result<(), BoxError> + Send + Sync>;

/// Construction options for [`ConfigManager`].
pub struct ConfigOptions<T> {
    /// Serialization format; also fixes the file extension. Default: TOML.
    pub format: Format,
    /// Use this file instead of `<config dir>/<app>/config.<ext>`.
    pub path: Option<PathBuf>,
    /// Write the default value at construction if the file does not exist.
    pub create_if_missing: bool,
    /// Hook run on every value before it is committed or saved.
    pub validator: Option<Validator<T>>,
    /// Base directories for the default path. Default: the process environment.
    pub dirs: Option<XdgDirs>,
}

impl<T> Default for ConfigOptions<T> {
    fn default() -> Self {
        Self {
            format: Format::default(),
            path: None,
            create_if_missing: false,
            validator: None,
            dirs: None,
        }
    }
}

impl<T> Clone for ConfigOptions<T> {
    fn clone(&self) -> Self {
        Self {
            format: self.format,
            path: self.path.clone(),
            create_if_missing: self.create_if_missing,
            validator: self.validator.clone(),
            dirs: self.dirs.clone(),
        }
    }
}

impl<T> fmt::Debug for ConfigOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigOptions")
            .field("format", &self.format)
            .field("path", &self.path)
            .field("create_if_missing", &self.create_if_missing)
            .field("validator", &self.validator.is_some())
            .field("dirs", &self.dirs)
            .finish()
    }
}

impl<T> ConfigOptions<T> {
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_dirs(mut self, dirs: XdgDirs) -> Self {
        self.dirs = Some(dirs);
        self
    }
}

impl<T: Validate + 'static> ConfigOptions<T> {
    /// Uses the value's own [`Validate`] implementation as the hook.
    pub fn validated(self) -> Self {
        self.with_validator(|value: &T| value.validate())
    }
}

struct State<T> {
    value: T,
    path: PathBuf,
}

/// Thread-safe holder of a configuration value of type `T`.
pub struct ConfigManager<T> {
    state: RwLock<State<T>>,
    format: Format,
    validator: Option<Validator<T>>,
    writer: AtomicWriter,
}

impl<T> fmt::Debug for ConfigManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigManager")
            .field("path", &self.read_state().path)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl<T> ConfigManager<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a manager holding `default`.
    ///
    /// The file is not read; call [`load`](Self::load) for that.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::PathFormatMismatch`] if a forced path has the wrong
    ///   extension.
    /// - [`ConfigError::InvalidPath`] if a forced path is empty or is a directory.
    /// - [`ConfigError::UnresolvablePath`] if no default path can be derived.
    /// - Any [`save`](Self::save) error when `create_if_missing` writes the default.
    pub fn new(
        app_name: &str,
        default: T,
        options: ConfigOptions<T>,
    ) -> Result<Self, ConfigError> {
        let format = options.format;
        let path = match options.path {
            Some(path) => {
                check_path(&path, format)?;
                path
            }
            None => {
                let resolver = PathResolver::new(options.dirs.unwrap_or_else(XdgDirs::from_env));
                default_path(&resolver, app_name, format)?
            }
        };

        let manager = Self {
            state: RwLock::new(State {
                value: default,
                path,
            }),
            format,
            validator: options.validator,
            writer: AtomicWriter::default(),
        };

        if options.create_if_missing {
            let state = manager.write_state();
            if !state.path.exists() {
                manager.persist(&state)?;
                info!(path = %state.path.display(), "created default config");
            }
        }
        Ok(manager)
    }

    /// Re-reads the file at the current path.
    ///
    /// The held value is replaced only if the file reads, parses, and
    /// validates; on any error it is left as it was.
    pub fn load(&self) -> Result<(), ConfigError> {
        let mut state = self.write_state();
        let value = self.read_candidate(&state.path)?;
        state.value = value;
        info!(path = %state.path.display(), format = %self.format, "config loaded");
        Ok(())
    }

    /// Loads from the first candidate that reads, parses, and validates, and
    /// makes it the active path.
    ///
    /// Returns the chosen path.  If every candidate fails, nothing changes and
    /// all failures are returned together.
    pub fn load_first<I, P>(&self, candidates: I) -> Result<PathBuf, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut state = self.write_state();
        let mut failures = Vec::new();
        for candidate in candidates {
            let candidate = candidate.as_ref();
            match self.read_candidate(candidate) {
                Ok(value) => {
                    state.value = value;
                    state.path = candidate.to_path_buf();
                    info!(path = %candidate.display(), skipped = failures.len(), "config loaded");
                    return Ok(state.path.clone());
                }
                Err(e) => {
                    debug!(path = %candidate.display(), "config candidate rejected: {e}");
                    failures.push(e);
                }
            }
        }
        Err(ConfigError::NoCandidate { failures })
    }

    /// Validates the held value and writes it atomically to the current path.
    pub fn save(&self) -> Result<(), ConfigError> {
        let state = self.write_state();
        self.persist(&state)?;
        info!(path = %state.path.display(), format = %self.format, "config saved");
        Ok(())
    }

    /// Runs `f` on the held value under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.read_state().value)
    }

    /// Runs `f` on the held value under the write lock.
    ///
    /// The change is in memory only and is not validated until the next
    /// [`save`](Self::save).
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.write_state().value)
    }

    pub fn path(&self) -> PathBuf {
        self.read_state().path.clone()
    }

    /// Points the manager at another file of the same format.
    pub fn set_path(&self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let path = path.into();
        check_path(&path, self.format)?;
        self.write_state().path = path;
        Ok(())
    }

    pub fn format(&self) -> Format {
        self.format
    }

    fn read_candidate(&self, path: &Path) -> Result<T, ConfigError> {
        if !self.format.matches(path) {
            return Err(ConfigError::PathFormatMismatch {
                path: path.to_path_buf(),
                format: self.format,
            });
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: T = self
            .format
            .decode(&text)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        self.check(&value)?;
        Ok(value)
    }

    fn persist(&self, state: &State<T>) -> Result<(), ConfigError> {
        self.check(&state.value)?;
        let text = self.format.encode(&state.value)?;
        self.writer.write(&state.path, text.as_bytes())?;
        Ok(())
    }

    fn check(&self, value: &T) -> Result<(), ConfigError> {
        match &self.validator {
            Some(validate) => validate(value).map_err(ConfigError::Validation),
            None => Ok(()),
        }
    }
}

impl<T: Clone> ConfigManager<T> {
    /// A copy of the held value.
    pub fn config(&self) -> T {
        self.read_state().value.clone()
    }
}

impl<T> ConfigManager<T> {
    fn read_state(&self) -> RwLockReadGuard<'_, State<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `<config dir>/<app>/config.<ext>`.
pub fn default_path(
    resolver: &PathResolver,
    app_name: &str,
    format: Format,
) -> Result<PathBuf, ConfigError> {
    let request = PathRequest::new(BaseDirKind::Config, app_name)
        .file_name(format!("config.{}", format.extension()));
    resolver
        .resolve(&request)
        .map(|location| location.into_path_buf())
        .ok_or_else(|| ConfigError::UnresolvablePath {
            app_name: app_name.to_string(),
        })
}

fn check_path(path: &Path, format: Format) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidPath {
            path: path.to_path_buf(),
            reason: "path is empty",
        });
    }
    if !format.matches(path) {
        return Err(ConfigError::PathFormatMismatch {
            path: path.to_path_buf(),
            format,
        });
    }
    if path.is_dir() {
        return Err(ConfigError::InvalidPath {
            path: path.to_path_buf(),
            reason: "path is a directory",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        name: String,
        retries: u32,
    }

    fn settings() -> Settings {
        Settings {
            name: "default".to_string(),
            retries: 3,
        }
    }

    fn options(tmp: &TempDir) -> ConfigOptions<Settings> {
        ConfigOptions::default().with_dirs(XdgDirs::rooted_at(tmp.path()))
    }

    #[test]
    fn test_default_path_is_config_dir_app_and_extension() {
        let tmp = TempDir::new().unwrap();

        let manager =
            ConfigManager::new("myapp", settings(), options(&tmp).with_format(Format::Yaml)).unwrap();

        assert_eq!(manager.path(), tmp.path().join("config/myapp/config.yaml"));
        assert_eq!(manager.format(), Format::Yaml);
    }

    #[test]
    fn test_new_with_empty_app_name_is_unresolvable() {
        let tmp = TempDir::new().unwrap();
        let err = ConfigManager::new("", settings(), options(&tmp)).unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvablePath { .. }));
    }

    #[test]
    fn test_forced_path_must_match_format() {
        let tmp = TempDir::new().unwrap();
        let opts = options(&tmp).with_path(tmp.path().join("settings.json"));

        let err = ConfigManager::new("myapp", settings(), opts).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::PathFormatMismatch { format: Format::Toml, .. }
        ));
    }

    #[test]
    fn test_forced_path_that_is_a_directory_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("conf.toml");
        std::fs::create_dir(&dir).unwrap();

        let err = ConfigManager::new("myapp", settings(), options(&tmp).with_path(dir)).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidPath { reason: "path is a directory", .. }));
    }

    #[test]
    fn test_create_if_missing_writes_default_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("app.toml");
        std::fs::write(&path, "name = \"existing\"\nretries = 9\n").unwrap();

        let manager = ConfigManager::new(
            "myapp",
            settings(),
            options(&tmp).with_path(&path).create_if_missing(true),
        )
        .unwrap();
        manager.load().unwrap();

        assert_eq!(manager.config().name, "existing");

        let fresh = tmp.path().join("fresh.toml");
        ConfigManager::new(
            "myapp",
            settings(),
            options(&tmp).with_path(&fresh).create_if_missing(true),
        )
        .unwrap();
        assert!(std::fs::read_to_string(&fresh).unwrap().contains("retries = 3"));
    }

    #[test]
    fn test_load_missing_file_keeps_value() {
        let tmp = TempDir::new().unwrap();
        let manager = ConfigManager::new("myapp", settings(), options(&tmp)).unwrap();

        let err = manager.load().unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(manager.config(), settings());
    }

    #[test]
    fn test_load_malformed_file_keeps_value() {
        let tmp = TempDir::new().unwrap();
        let manager = ConfigManager::new("myapp", settings(), options(&tmp)).unwrap();
        manager.update(|s| s.retries = 7);
        std::fs::create_dir_all(manager.path().parent().unwrap()).unwrap();
        std::fs::write(manager.path(), "retries = [").unwrap();

        let err = manager.load().unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(manager.read(|s| s.retries), 7);
    }

    #[test]
    fn test_set_path_rejects_other_extension() {
        let tmp = TempDir::new().unwrap();
        let manager = ConfigManager::new("myapp", settings(), options(&tmp)).unwrap();
        let before = manager.path();

        let err = manager.set_path(tmp.path().join("other.yaml")).unwrap_err();

        assert!(matches!(err, ConfigError::PathFormatMismatch { .. }));
        assert_eq!(manager.path(), before);

        manager.set_path(tmp.path().join("other.toml")).unwrap();
        assert_eq!(manager.path(), tmp.path().join("other.toml"));
    }

    #[test]
    fn test_save_runs_validator_and_leaves_file_absent_on_rejection() {
        let tmp = TempDir::new().unwrap();
        let opts = options(&tmp).with_validator(|s: &Settings| {
            if s.retries > 10 {
                return Err("too many retries".into());
            }
            Ok(())
        });
        let manager = ConfigManager::new("myapp", settings(), opts).unwrap();
        manager.update(|s| s.retries = 11);

        let err = manager.save().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("too many retries"));
        assert!(!manager.path().exists());
    }

    struct NonEmpty(String);

    impl Serialize for NonEmpty {
        fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            self.0.serialize(s)
        }
    }

    impl<'de> Deserialize<'de> for NonEmpty {
        fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            String::deserialize(d).map(NonEmpty)
        }
    }

    impl Validate for NonEmpty {
        fn validate(&self) -> Result<(), BoxError> {
            if self.0.is_empty() {
                return Err("value is empty".into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_validated_options_use_the_value_validate_impl() {
        let tmp = TempDir::new().unwrap();
        let opts = ConfigOptions::<NonEmpty>::default()
            .with_format(Format::Json)
            .with_path(tmp.path().join("v.json"))
            .validated();
        let manager = ConfigManager::new("myapp", NonEmpty(String::new()), opts).unwrap();

        assert!(matches!(manager.save(), Err(ConfigError::Validation(_))));

        manager.update(|v| v.0 = "set".to_string());
        manager.save().unwrap();
        assert_eq!(std::fs::read_to_string(tmp.path().join("v.json")).unwrap(), "\"set\"");
    }
}
