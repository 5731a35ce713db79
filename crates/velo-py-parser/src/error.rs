//! Error types for the velo-py-parser crate.

/// Errors that can occur while parsing a router file.
///
/// Initialization errors ([`LanguageInit`](Self::LanguageInit),
/// [`QueryCompile`](Self::QueryCompile)) mean the parser itself is unusable. The rest describe one source file.
///
/// # Examples
///
/// ```
/// use velo_py_parser::ParseError;
///
/// let err = ParseError::Syntax { line: 3, column: 7 };
/// assert!(err.is_source_error());
/// assert_eq!(err.to_string(), "syntax error at line 3, column 7");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to set the Python language on the parser.
    #[error("failed to set Python language")]
    LanguageInit,

    /// Failed to compile a tree-sitter query.
    #[error("failed to compile query at offset {offset}: {kind:?}")]
    QueryCompile {
        /// The byte offset in the query string where the error occurred.
        offset: usize,
        /// The kind of query error.
        kind: tree_sitter::QueryError,
    },

    /// The parser produced no tree (cancelled or out of memory).
    #[error("failed to parse source code")]
    Parse,

    /// The source is not valid Python.
    #[error("syntax error at line {line}, column {column}")]
    Syntax {
        /// Line of the first error node (1-indexed).
        line: u32,
        /// Column of the first error node (0-indexed).
        column: u32,
    },

    /// No module-level `<symbol> = APIRouter(...)` declaration was found.
    #[error("no module-level '{symbol} = APIRouter(...)' declaration")]
    MissingRouter {
        /// The symbol that was looked for.
        symbol: String,
    },
}

impl ParseError {
    /// Returns `true` if the error describes the parsed file rather than
    /// the parser.
    #[inline]
    #[must_use]
    pub const fn is_source_error(&self) -> bool {
        matches!(self, Self::Syntax { .. } | Self::MissingRouter { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_init_display() {
        let err = ParseError::LanguageInit;
        assert_eq!(err.to_string(), "failed to set Python language");
        assert!(!err.is_source_error());
    }

    #[test]
    fn test_missing_router_display() {
        let err = ParseError::MissingRouter {
            symbol: String::from("router"),
        };
        assert!(err.to_string().contains("router = APIRouter"));
        assert!(err.is_source_error());
    }
}
