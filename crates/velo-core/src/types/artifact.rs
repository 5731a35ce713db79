//! Template identifiers and rendered artifacts.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// One of the fixed set of templates a module is generated from.
///
/// The declaration order is the order artifacts appear in a plan.
///
/// # Examples
///
/// ```
/// use velo_core::TemplateId;
///
/// assert_eq!(TemplateId::from_id("use-case"), Some(TemplateId::UseCase));
/// assert_eq!(TemplateId::UseCase.as_str(), "use-case");
/// assert_eq!(TemplateId::from_id("controller"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateId {
    /// Package marker (`__init__`).
    PackageInit,
    /// Request/response schemas.
    Schemas,
    /// Persistence repository.
    Repository,
    /// Use case with its dependency provider.
    UseCase,
    /// HTTP router exposing the router symbol.
    Router,
    /// Document model, placed beside the modules directory.
    Model,
}

impl TemplateId {
    /// Every template, in plan order.
    pub const ALL: [Self; 6] = [
        Self::PackageInit,
        Self::Schemas,
        Self::Repository,
        Self::UseCase,
        Self::Router,
        Self::Model,
    ];

    /// Returns the stable string id.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PackageInit => "package-init",
            Self::Schemas => "schemas",
            Self::Repository => "repository",
            Self::UseCase => "use-case",
            Self::Router => "router",
            Self::Model => "model",
        }
    }

    /// Looks up a template by its string id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|template| template.as_str() == id)
    }

    /// File stem inside the module folder.
    ///
    /// Returns `None` for [`TemplateId::Model`], which lives in the models
    /// directory and is named after the module.
    #[must_use]
    pub const fn module_file_stem(self) -> Option<&'static str> {
        match self {
            Self::PackageInit => Some("__init__"),
            Self::Schemas => Some("schemas"),
            Self::Repository => Some("repository"),
            Self::UseCase => Some("use_case"),
            Self::Router => Some(crate::config::ROUTER_FILE_STEM),
            Self::Model => None,
        }
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered file waiting to be classified and written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Template the content came from.
    pub template: TemplateId,

    /// Path relative to the application root, e.g. `modules/orders/router.py`.
    pub relative_path: Utf8PathBuf,

    /// Rendered file content.
    pub content: String,
}
