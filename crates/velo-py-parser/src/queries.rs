//! Pre-compiled tree-sitter queries for Python router extraction.
//!
//! This module provides the [`ROUTER_QUERY`] constant and
//! [`get_router_query`] for lazily compiling and caching it.

use std::sync::OnceLock;

use tree_sitter::{Language, Query};

use crate::error::ParseError;

/// Tree-sitter query for extracting routers and their endpoints.
///
/// This query captures:
/// - Module-level assignments whose right-hand side is a call
///   (`router = APIRouter(prefix="/v1/pets", tags=["Pet"])`)
/// - Decorated functions whose decorator calls an attribute
///   (`@router.get("/{entity_id}")`)
///
/// Filtering by router symbol and factory name happens in code so the
/// symbol stays configurable.
///
/// # Capture Names
///
/// - `router.symbol` - Assigned identifier
/// - `router.factory` - Called function name
/// - `router.args` - Argument list of the factory call
/// - `endpoint.object` - Object the decorator attribute is read from
/// - `endpoint.method` - Decorator attribute (`get`, `post`, ...)
/// - `endpoint.args` - Argument list of the decorator call
/// - `endpoint.decorator` - The decorator node
/// - `endpoint.handler` - Name of the decorated function
pub const ROUTER_QUERY: &str = r"
; Module-level router declaration: router = APIRouter(...)
(module
  (expression_statement
    (assignment
      left: (identifier) @router.symbol
      right: (call
        function: (identifier) @router.factory
        arguments: (argument_list) @router.args))))

; Endpoint: @router.get('/path') def handler(...)
(decorated_definition
  (decorator
    (call
      function: (attribute
        object: (identifier) @endpoint.object
        attribute: (identifier) @endpoint.method)
      arguments: (argument_list) @endpoint.args)) @endpoint.decorator
  definition: (function_definition
    name: (identifier) @endpoint.handler))
";

/// Capture index for `router.symbol`.
pub const CAPTURE_ROUTER_SYMBOL: u32 = 0;

/// Capture index for `router.factory`.
pub const CAPTURE_ROUTER_FACTORY: u32 = 1;

/// Capture index for `router.args`.
pub const CAPTURE_ROUTER_ARGS: u32 = 2;

/// Capture index for `endpoint.object`.
pub const CAPTURE_ENDPOINT_OBJECT: u32 = 3;

/// Capture index for `endpoint.method`.
pub const CAPTURE_ENDPOINT_METHOD: u32 = 4;

/// Capture index for `endpoint.args`.
pub const CAPTURE_ENDPOINT_ARGS: u32 = 5;

/// Capture index for `endpoint.decorator`.
pub const CAPTURE_ENDPOINT_DECORATOR: u32 = 6;

/// Capture index for `endpoint.handler`.
pub const CAPTURE_ENDPOINT_HANDLER: u32 = 7;

/// Pattern index of the router declaration pattern.
pub const PATTERN_ROUTER: usize = 0;

/// Pattern index of the endpoint pattern.
pub const PATTERN_ENDPOINT: usize = 1;

static COMPILED_QUERY: OnceLock<Query> = OnceLock::new();

/// Returns the compiled router query.
///
/// The query is compiled once and cached for all subsequent calls.
/// This function is thread-safe.
///
/// # Errors
///
/// Returns [`ParseError::QueryCompile`] if the query fails to compile.
pub fn get_router_query() -> Result<&'static Query, ParseError> {
    if let Some(query) = COMPILED_QUERY.get() {
        return Ok(query);
    }

    let language: Language = tree_sitter_python::LANGUAGE.into();
    let query = compile_query(&language)?;

    Ok(COMPILED_QUERY.get_or_init(|| query))
}

fn compile_query(language: &Language) -> Result<Query, ParseError> {
    Query::new(language, ROUTER_QUERY).map_err(|e| ParseError::QueryCompile {
        offset: e.offset,
        kind: e,
    })
}

/// Returns the capture name for a given capture index.
#[inline]
pub fn capture_name(query: &Query, index: u32) -> Option<&str> {
    query.capture_names().get(index as usize).copied()
}
