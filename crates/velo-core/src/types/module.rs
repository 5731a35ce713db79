//! Discovered modules and the router definitions loaded from them.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A module folder found during discovery.
///
/// Rebuilt on every boot and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveredModule {
    /// Folder name under the modules root.
    pub module_name: String,

    /// Path of the module's router artifact.
    pub route_entry_path: Utf8PathBuf,

    /// Zero-based mount position (lexicographic by folder name).
    pub load_order: usize,
}

/// HTTP methods an endpoint decorator can name.
///
/// # Examples
///
/// ```
/// use velo_core::HttpMethod;
///
/// assert_eq!(HttpMethod::from_decorator("patch"), Some(HttpMethod::Patch));
/// assert_eq!(HttpMethod::from_decorator("include_router"), None);
/// assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl HttpMethod {
    /// Maps a router decorator attribute (`get`, `post`, ...) to a method.
    #[must_use]
    pub fn from_decorator(attribute: &str) -> Option<Self> {
        Some(match attribute {
            "get" => Self::Get,
            "post" => Self::Post,
            "put" => Self::Put,
            "patch" => Self::Patch,
            "delete" => Self::Delete,
            "head" => Self::Head,
            "options" => Self::Options,
            _ => return None,
        })
    }

    /// Parses a method name case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::from_decorator(&name.to_ascii_lowercase())
    }

    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decorated handler in a router file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// HTTP method from the decorator attribute.
    pub method: HttpMethod,

    /// Path relative to the router prefix (may be empty).
    pub path: String,

    /// Name of the decorated function.
    pub handler: String,

    /// Line of the decorator (1-indexed).
    pub line: u32,
}

/// What loading a router artifact yields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouterDefinition {
    /// Module-level name bound to the router.
    pub symbol: String,

    /// The router's own prefix, e.g. `/v1/pets`.
    pub prefix: String,

    /// OpenAPI tags.
    pub tags: SmallVec<[String; 2]>,

    /// Endpoints in source order.
    pub endpoints: SmallVec<[Endpoint; 8]>,
}

impl RouterDefinition {
    /// Full path of `endpoint` under this router, before any application
    /// prefix.
    #[must_use]
    pub fn endpoint_path(&self, endpoint: &Endpoint) -> String {
        join_route(&self.prefix, &endpoint.path)
    }
}

/// Concatenates route fragments, collapsing doubled slashes at the seam.
///
/// # Examples
///
/// ```
/// use velo_core::types::join_route;
///
/// assert_eq!(join_route("/api", "/v1/pets"), "/api/v1/pets");
/// assert_eq!(join_route("/api/", "/v1/pets"), "/api/v1/pets");
/// assert_eq!(join_route("/v1/pets", ""), "/v1/pets");
/// assert_eq!(join_route("", ""), "/");
/// ```
#[must_use]
pub fn join_route(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let joined = match (prefix.is_empty(), path.is_empty()) {
        (_, true) => prefix.to_owned(),
        (true, false) => path.to_owned(),
        (false, false) if path.starts_with('/') => format!("{prefix}{path}"),
        (false, false) => format!("{prefix}/{path}"),
    };

    if joined.is_empty() {
        String::from("/")
    } else if joined.starts_with('/') {
        joined
    } else {
        format!("/{joined}")
    }
}
