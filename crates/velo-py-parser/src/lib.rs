//! Python router parser using tree-sitter for route discovery.
//!
//! Route discovery never imports or executes module code. It parses each
//! module's router file with tree-sitter-python and reads two things:
//!
//! - The module-level router declaration: `router = APIRouter(prefix=..., tags=[...])`
//! - Endpoint decorators on that router: `@router.get("/{entity_id}")`
//!
//! ```
//! use velo_py_parser::PyParser;
//! use velo_core::HttpMethod;
//!
//! let source = r#"
//! router = APIRouter(prefix="/v1/invoices", tags=["Invoice"])
//!
//! @router.post("")
//! async def create_invoice(data): ...
//! "#;
//!
//! let mut parser = PyParser::new()?;
//! let router = parser.parse_router(source, "router")?;
//!
//! assert_eq!(router.tags.as_slice(), ["Invoice"]);
//! assert_eq!(router.endpoints[0].method, HttpMethod::Post);
//! # Ok::<(), velo_py_parser::ParseError>(())
//! ```
//!
//! Files with syntax errors are rejected with [`ParseError::Syntax`], and a
//! file without the router declaration with [`ParseError::MissingRouter`].

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
mod parser;
pub mod queries;
mod router;

pub use error::ParseError;
pub use parser::PyParser;
pub use router::{ROUTER_FACTORY, extract_router};
