//! One application's view of its files.
//!
//! ```text
//!                    ┌──────────────────────────┐
//!   app name ──────▶ │        AppContext        │
//!                    │  resolver (XDG dirs)     │──▶ location(request)
//!                    │  layout?   ──────────────│──▶ prepare(): generate + assess
//!                    │  config?   ──────────────│──▶ load_config(extra paths)
//!                    └──────────────────────────┘──▶ open_store(name)
//! ```
//!
//! Every part shares the context's resolver, so pointing the context at a
//! sandbox directory with [`AppContext::with_dirs`] moves the layout, the
//! default config path and every store with it.

use std::path::{Path, PathBuf};

use appcontext_config::{default_path, ConfigManager, ConfigOptions};
use appcontext_core::{
    Assessment, BaseDirKind, Layout, Location, PathEntry, PathRequest, PathResolver, XdgDirs,
};
use appcontext_store::{JsonStore, StoreOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ContextError;

/// Paths, layout and configuration for one application.
///
/// `C` is the configuration type; it is `()` until
/// [`with_config`](AppContext::with_config) attaches a manager.
#[derive(Debug)]
pub struct AppContext<C = ()> {
    app_name: String,
    resolver: PathResolver,
    layout: Option<Layout>,
    config: Option<ConfigManager<C>>,
}

impl AppContext<()> {
    /// A context for `app_name` resolving against the process environment.
    pub fn new(app_name: impl Into<String>) -> Result<Self, ContextError> {
        let app_name = app_name.into();
        if app_name.is_empty() {
            return Err(ContextError::EmptyAppName);
        }
        Ok(Self {
            app_name,
            resolver: PathResolver::from_env(),
            layout: None,
            config: None,
        })
    }

    /// Attaches a configuration manager.
    ///
    /// Unless `options` names its own base directories or a forced path, the
    /// manager resolves its default path with this context's directories.
    pub fn with_config<C>(
        self,
        default: C,
        options: ConfigOptions<C>,
    ) -> Result<AppContext<C>, ContextError>
    where
        C: Serialize + DeserializeOwned,
    {
        let options = if options.dirs.is_some() {
            options
        } else {
            options.with_dirs(self.resolver.dirs().clone())
        };
        let manager = ConfigManager::new(&self.app_name, default, options)?;
        info!(app = %self.app_name, path = %manager.path().display(), "config attached");
        Ok(AppContext {
            app_name: self.app_name,
            resolver: self.resolver,
            layout: self.layout,
            config: Some(manager),
        })
    }
}

impl<C> AppContext<C> {
    /// Replaces the base directories for every later resolution.
    ///
    /// Call this before attaching a layout or config; both capture the
    /// directories in effect when they are attached.
    pub fn with_dirs(mut self, dirs: XdgDirs) -> Self {
        self.resolver = PathResolver::new(dirs);
        if let Some(layout) = self.layout.take() {
            self.layout = Some(layout.with_resolver(self.resolver.clone()));
        }
        self
    }

    /// Attaches a layout built from `entries`.
    ///
    /// Entries without an application name inherit this context's name.
    pub fn with_layout(
        mut self,
        entries: impl IntoIterator<Item = PathEntry>,
    ) -> Result<Self, ContextError> {
        let layout = Layout::new(self.app_name.clone(), entries)?.with_resolver(self.resolver.clone());
        debug!(app = %self.app_name, entries = layout.len(), "layout attached");
        self.layout = Some(layout);
        Ok(self)
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn config(&self) -> Option<&ConfigManager<C>> {
        self.config.as_ref()
    }

    /// Resolves an arbitrary request with this context's directories.
    pub fn location(&self, request: &PathRequest) -> Option<Location> {
        self.resolver.resolve(request)
    }

    /// `<base>/<app>/` for the given kind.
    pub fn app_dir(&self, kind: BaseDirKind) -> Result<PathBuf, ContextError> {
        self.location(&PathRequest::new(kind, self.app_name.clone()))
            .map(Location::into_path_buf)
            .ok_or_else(|| ContextError::Unresolvable {
                app_name: self.app_name.clone(),
                kind,
            })
    }

    /// Creates the attached layout on disk and reports what still differs.
    ///
    /// Generation failures are returned as errors; discrepancies that remain
    /// afterwards (for example an oversized file) are returned in the
    /// [`Assessment`] for the caller to judge.
    pub fn prepare(&self) -> Result<Assessment, ContextError> {
        let layout = self
            .layout
            .as_ref()
            .ok_or_else(|| ContextError::NoLayout(self.app_name.clone()))?;
        layout.generate()?;
        let assessment = layout.assess();
        if !assessment.is_clean() {
            warn!(
                app = %self.app_name,
                discrepancies = assessment.len(),
                "layout differs from its description after generation"
            );
        }
        Ok(assessment)
    }

    /// Opens `<data dir>/<app>/<name>.json` as a record store.
    pub fn open_store<T>(&self, name: &str, options: StoreOptions) -> Result<JsonStore<T>, ContextError>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let request = PathRequest::new(BaseDirKind::Data, self.app_name.clone())
            .file_name(format!("{name}.json"));
        let path = self
            .location(&request)
            .ok_or_else(|| ContextError::Unresolvable {
                app_name: self.app_name.clone(),
                kind: BaseDirKind::Data,
            })?
            .into_path_buf();
        Ok(JsonStore::open(path, options)?)
    }
}

impl<C> AppContext<C>
where
    C: Serialize + DeserializeOwned,
{
    /// Loads the attached config from the first usable candidate.
    ///
    /// `extra_paths` are tried in order, then the default
    /// `<config dir>/<app>/config.<ext>`.  Returns the path that was loaded,
    /// which becomes the manager's active path.
    pub fn load_config<P: AsRef<Path>>(&self, extra_paths: &[P]) -> Result<PathBuf, ContextError> {
        let manager = self
            .config
            .as_ref()
            .ok_or_else(|| ContextError::NoConfig(self.app_name.clone()))?;

        let mut candidates: Vec<PathBuf> =
            extra_paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        let fallback = default_path(&self.resolver, &self.app_name, manager.format())?;
        if !candidates.contains(&fallback) {
            candidates.push(fallback);
        }

        let chosen = manager.load_first(&candidates)?;
        info!(app = %self.app_name, path = %chosen.display(), "config loaded");
        Ok(chosen)
    }
}
