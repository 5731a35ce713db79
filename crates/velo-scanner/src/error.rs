//! Error types for the velo-scanner crate.
//!
//! [`ScanError`] aborts a registry listing or a discovery run.
//! [`RouteLoadError`] describes one module that failed to load; discovery
//! records it and carries on with the other modules.

use camino::Utf8PathBuf;
use velo_py_parser::ParseError;

/// Errors that abort a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The modules root could not be read.
    #[error("failed to read modules directory {path}: {source}")]
    RegistryIo {
        /// The modules root.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The Python parser could not be initialized.
    #[error("failed to initialize router parser: {0}")]
    Parser(#[from] ParseError),
}

impl ScanError {
    /// Creates a new [`ScanError::RegistryIo`] error.
    #[inline]
    pub fn registry_io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::RegistryIo {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the modules root simply does not exist.
    #[must_use]
    pub fn is_missing_root(&self) -> bool {
        matches!(self, Self::RegistryIo { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::RegistryIo { path, .. } => Some(path),
            Self::Parser(_) => None,
        }
    }
}

/// Why one module's router could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum RouteLoadError {
    /// The router file could not be read.
    #[error("failed to read router file: {0}")]
    Read(#[source] std::io::Error),

    /// The router file is not valid Python.
    #[error("syntax error at line {line}, column {column}")]
    Syntax {
        /// Line of the first error (1-indexed).
        line: u32,
        /// Column of the first error (0-indexed).
        column: u32,
    },

    /// The router file does not declare the router symbol.
    #[error("no module-level '{symbol} = APIRouter(...)' declaration")]
    MissingRouterSymbol {
        /// The symbol that was looked for.
        symbol: String,
    },

    /// No parser was available on this worker.
    #[error("router parser unavailable: {0}")]
    Parser(String),
}

impl From<ParseError> for RouteLoadError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Syntax { line, column } => Self::Syntax { line, column },
            ParseError::MissingRouter { symbol } => Self::MissingRouterSymbol { symbol },
            other => Self::Parser(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_registry_io() {
        let err = ScanError::registry_io(
            "api_app/modules",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.is_missing_root());
        assert_eq!(err.path().map(|p| p.as_str()), Some("api_app/modules"));
        assert!(err.to_string().contains("api_app/modules"));
    }

    #[test]
    fn test_registry_io_permission_is_not_missing() {
        let err = ScanError::registry_io(
            "api_app/modules",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_missing_root());
    }

    #[test]
    fn test_route_load_error_from_parse_error() {
        let err = RouteLoadError::from(ParseError::Syntax { line: 4, column: 2 });
        assert!(matches!(err, RouteLoadError::Syntax { line: 4, column: 2 }));

        let err = RouteLoadError::from(ParseError::MissingRouter {
            symbol: String::from("router"),
        });
        assert!(matches!(err, RouteLoadError::MissingRouterSymbol { .. }));

        let err = RouteLoadError::from(ParseError::Parse);
        assert!(matches!(err, RouteLoadError::Parser(_)));
    }
}
