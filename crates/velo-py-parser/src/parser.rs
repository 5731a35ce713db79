//! Python parser management using tree-sitter.
//!
//! This module provides the [`PyParser`] struct for parsing router files.

use tree_sitter::{Language, Node, Parser, Tree};
use velo_core::RouterDefinition;

use crate::error::ParseError;
use crate::queries::get_router_query;
use crate::router::extract_router;

/// Python parser for loading router definitions.
///
/// Wraps a tree-sitter parser configured for Python. The parser can be
/// reused for multiple files to avoid repeated initialization.
///
/// # Thread Safety
///
/// `PyParser` is `Send` but not `Sync`. For parallel loading with rayon,
/// create one parser per worker (`map_init`). The compiled query is shared
/// across all parser instances.
///
/// # Examples
///
/// ```
/// use velo_py_parser::PyParser;
///
/// let mut parser = PyParser::new()?;
/// let router = parser.parse_router(
///     "router = APIRouter(prefix='/v1/pets')\n\n@router.get('')\ndef pets(): ...\n",
///     "router",
/// )?;
///
/// assert_eq!(router.prefix, "/v1/pets");
/// assert_eq!(router.endpoints.len(), 1);
/// # Ok::<(), velo_py_parser::ParseError>(())
/// ```
pub struct PyParser {
    parser: Parser,
}

impl PyParser {
    /// Creates a new Python parser.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if the Python language cannot be
    /// set on the parser.
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_python::LANGUAGE.into();

        parser
            .set_language(&language)
            .map_err(|_| ParseError::LanguageInit)?;

        Ok(Self { parser })
    }

    /// Parses Python source, rejecting anything with a syntax error.
    ///
    /// # Errors
    ///
    /// - [`ParseError::Parse`] if tree-sitter produces no tree
    /// - [`ParseError::Syntax`] pointing at the first error node
    pub fn parse(&mut self, source: &str) -> Result<Tree, ParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(ParseError::Parse)?;

        let root = tree.root_node();
        if root.has_error() {
            let position = first_error(root).start_position();
            return Err(ParseError::Syntax {
                line: u32::try_from(position.row + 1).unwrap_or(u32::MAX),
                column: u32::try_from(position.column).unwrap_or(u32::MAX),
            });
        }

        Ok(tree)
    }

    /// Parses a router file and extracts the router bound to `symbol`.
    ///
    /// # Errors
    ///
    /// Everything [`parse`](Self::parse) returns, plus
    /// [`ParseError::MissingRouter`] and [`ParseError::QueryCompile`].
    pub fn parse_router(
        &mut self,
        source: &str,
        symbol: &str,
    ) -> Result<RouterDefinition, ParseError> {
        let tree = self.parse(source)?;
        let query = get_router_query()?;
        extract_router(&tree, source, symbol, query)
    }
}

impl std::fmt::Debug for PyParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PyParser")
            .field("language", &"Python")
            .finish_non_exhaustive()
    }
}

/// Depth-first search for the first `ERROR` or `MISSING` node.
fn first_error(node: Node<'_>) -> Node<'_> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() || child.is_missing() {
            return child;
        }
        if child.has_error() {
            return first_error(child);
        }
    }
    node
}
