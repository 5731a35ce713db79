//! Configuration structures for velo.
//!
//! This module provides configuration types for every component:
//!
//! - [`ProjectLayout`] - Where modules and models live on disk. This is the
//!   filesystem convention shared by the generator and route discovery.
//! - [`NamingConfig`] - Which name forms feed type names and route paths
//! - [`DiscoveryConfig`] - How discovered routers are mounted
//! - [`DevConfig`] - The development server command `velo dev` delegates to
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] with values matching the
//! FastAPI/Beanie project template (`api_app/modules/<name>/router.py`).
//! Every section is `#[serde(default)]`, so a `velo.json` only needs to
//! mention the options it changes.

use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the optional project configuration, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "velo.json";

/// File stem of the router artifact. Discovery looks for exactly this file.
pub const ROUTER_FILE_STEM: &str = "router";

/// Layout of a generated project on disk.
///
/// Both the generator and route discovery derive every path from this
/// structure, so changing a field here moves both sides together.
///
/// ```text
/// <project_root>/<app_dir>/<modules_dir>/<module>/router.<file_extension>
/// <project_root>/<app_dir>/<models_dir>/<module>_model.<file_extension>
/// ```
///
/// # Examples
///
/// ```
/// use velo_core::ProjectLayout;
///
/// let layout = ProjectLayout::default();
/// assert_eq!(layout.router_path("orders").as_str(), "api_app/modules/orders/router.py");
/// assert_eq!(layout.model_artifact("orders").as_str(), "models/orders_model.py");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLayout {
    /// Project root containing the application package.
    ///
    /// Empty means the current directory.
    pub project_root: Utf8PathBuf,

    /// Application package directory, relative to the project root.
    pub app_dir: String,

    /// Directory holding one folder per feature module, relative to the app root.
    pub modules_dir: String,

    /// Directory holding the sibling document models, relative to the app root.
    pub models_dir: String,

    /// Extension of generated source files, without the dot.
    pub file_extension: String,

    /// Name of the module-level router object each router artifact must expose.
    pub router_symbol: String,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::new(),
            app_dir: "api_app".to_owned(),
            modules_dir: "modules".to_owned(),
            models_dir: "models".to_owned(),
            file_extension: "py".to_owned(),
            router_symbol: "router".to_owned(),
        }
    }
}

impl ProjectLayout {
    /// Returns the application root (`<project_root>/<app_dir>`).
    #[must_use]
    pub fn app_root(&self) -> Utf8PathBuf {
        self.project_root.join(&self.app_dir)
    }

    /// Returns the directory scanned for modules.
    #[must_use]
    pub fn modules_root(&self) -> Utf8PathBuf {
        self.app_root().join(&self.modules_dir)
    }

    /// Returns `<stem>.<file_extension>`.
    #[must_use]
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.file_extension)
    }

    /// Returns the router file name (`router.py` by default).
    #[must_use]
    pub fn router_file_name(&self) -> String {
        self.file_name(ROUTER_FILE_STEM)
    }

    /// Returns the app-root relative path of a file inside a module folder.
    #[must_use]
    pub fn module_artifact(&self, module: &str, stem: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.modules_dir)
            .join(module)
            .join(self.file_name(stem))
    }

    /// Returns the app-root relative path of a module's sibling model file.
    #[must_use]
    pub fn model_artifact(&self, module: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.models_dir).join(self.file_name(&format!("{module}_model")))
    }

    /// Returns the full path of a module's router artifact.
    #[must_use]
    pub fn router_path(&self, module: &str) -> Utf8PathBuf {
        self.modules_root()
            .join(module)
            .join(self.router_file_name())
    }

    /// Checks that the layout describes usable directory and symbol names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if a directory name is empty or
    /// contains a path separator, the extension is empty, or the router
    /// symbol is not an identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (option, value) in [
            ("layout.app_dir", &self.app_dir),
            ("layout.modules_dir", &self.modules_dir),
            ("layout.models_dir", &self.models_dir),
        ] {
            if value.is_empty() {
                return Err(ConfigError::invalid_option(option, "must not be empty"));
            }
            if value.contains(['/', '\\']) || value == ".." {
                return Err(ConfigError::invalid_option(
                    option,
                    "must be a single directory name",
                ));
            }
        }

        if self.file_extension.is_empty() || self.file_extension.contains('.') {
            return Err(ConfigError::invalid_option(
                "layout.file_extension",
                "must be a non-empty extension without a dot",
            ));
        }

        if !is_identifier(&self.router_symbol) {
            return Err(ConfigError::invalid_option(
                "layout.router_symbol",
                "must be an identifier",
            ));
        }

        Ok(())
    }

    /// Returns the application root, checking that it is an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDirectory`] if the app root does not exist,
    /// or [`ConfigError::InvalidPath`] if it is not a directory.
    pub fn require_app_root(&self) -> Result<Utf8PathBuf, ConfigError> {
        let app_root = self.app_root();
        if !app_root.exists() {
            return Err(ConfigError::MissingDirectory(app_root));
        }
        if !app_root.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: app_root,
                reason: "not a directory".to_owned(),
            });
        }
        Ok(app_root)
    }
}

/// Which grammatical form of the module name a derived name uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum NameForm {
    /// The token exactly as given (converted to the target casing only).
    AsGiven,
    /// The heuristic singular form.
    #[default]
    Singular,
    /// The heuristic plural form.
    Plural,
}

/// Naming rules for derived names.
///
/// # Examples
///
/// ```
/// use velo_core::{NameForm, NamingConfig};
///
/// let config = NamingConfig::default();
/// assert_eq!(config.type_form, NameForm::Singular);
/// assert_eq!(config.route_form, NameForm::Plural);
/// assert_eq!(config.irregular_plurals.get("person").map(String::as_str), Some("people"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Form used for class and type names (`Invoice`).
    pub type_form: NameForm,

    /// Form used for the REST collection path segment (`invoices`).
    pub route_form: NameForm,

    /// Version segment placed before the collection segment (`/v1/...`).
    ///
    /// `None` or an empty string omits it.
    pub route_version: Option<String>,

    /// Singular → plural exceptions to the suffix heuristic.
    ///
    /// Map a word to itself for uncountable nouns.
    pub irregular_plurals: BTreeMap<String, String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        let irregular_plurals = [
            ("person", "people"),
            ("child", "children"),
            ("man", "men"),
            ("woman", "women"),
            ("mouse", "mice"),
            ("status", "statuses"),
            ("news", "news"),
            ("series", "series"),
            ("species", "species"),
            ("data", "data"),
        ]
        .into_iter()
        .map(|(singular, plural)| (singular.to_owned(), plural.to_owned()))
        .collect();

        Self {
            type_form: NameForm::Singular,
            route_form: NameForm::Plural,
            route_version: Some("v1".to_owned()),
            irregular_plurals,
        }
    }
}

/// Configuration for route discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Application-wide prefix every discovered router is mounted under.
    pub api_prefix: String,

    /// Whether router files may be parsed on the rayon pool.
    ///
    /// Mount order is lexicographic either way.
    pub parallel: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_owned(),
            parallel: true,
        }
    }
}

/// Configuration for `velo dev`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// Program and arguments of the development server.
    ///
    /// Empty means `uvicorn <app_dir>.run:app --reload`.
    pub command: Vec<String>,
}

impl DevConfig {
    /// Returns the server command line for `layout`.
    #[must_use]
    pub fn command_line(&self, layout: &ProjectLayout) -> Vec<String> {
        if !self.command.is_empty() {
            return self.command.clone();
        }
        vec![
            "uvicorn".to_owned(),
            format!("{}.run:app", layout.app_dir),
            "--reload".to_owned(),
        ]
    }
}

/// Root configuration for velo.
///
/// # Examples
///
/// ```
/// use velo_core::Config;
///
/// let config = Config::default();
/// assert_eq!(config.layout.app_dir, "api_app");
/// assert_eq!(config.discovery.api_prefix, "/api");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout shared by generation and discovery.
    pub layout: ProjectLayout,

    /// Naming rules.
    pub naming: NamingConfig,

    /// Route discovery settings.
    pub discovery: DiscoveryConfig,

    /// Development server settings.
    pub dev: DevConfig,
}

impl Config {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid JSON for this structure.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_std_path())?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Loads `<project_root>/velo.json` if present, otherwise the defaults.
    ///
    /// The returned layout always points at `project_root`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Config::load`] when the file exists but
    /// cannot be loaded.
    pub fn discover(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        let path = project_root.join(CONFIG_FILE_NAME);
        let mut config = if path.is_file() {
            Self::load(&path)?
        } else {
            Self::default()
        };
        config.layout.project_root = project_root.to_owned();
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] naming the first offending option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;

        if let Some(version) = &self.naming.route_version {
            if version.contains('/') {
                return Err(ConfigError::invalid_option(
                    "naming.route_version",
                    "must be a single path segment",
                ));
            }
        }

        if !self.discovery.api_prefix.is_empty() && !self.discovery.api_prefix.starts_with('/') {
            return Err(ConfigError::invalid_option(
                "discovery.api_prefix",
                "must be empty or start with '/'",
            ));
        }

        Ok(())
    }
}

/// Returns `true` if `value` matches `^[A-Za-z_][A-Za-z0-9_]*$`.
pub(crate) fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
