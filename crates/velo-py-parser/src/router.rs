//! Router extraction from Python source using tree-sitter queries.
//!
//! This module turns a parsed router file into a [`RouterDefinition`]: the
//! module-level `<symbol> = APIRouter(...)` declaration plus every function
//! decorated with `@<symbol>.<method>("<path>")`.

use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, QueryMatch, Tree};
use velo_core::{Endpoint, HttpMethod, RouterDefinition};

use crate::error::ParseError;
use crate::queries::{
    CAPTURE_ENDPOINT_ARGS, CAPTURE_ENDPOINT_DECORATOR, CAPTURE_ENDPOINT_HANDLER,
    CAPTURE_ENDPOINT_METHOD, CAPTURE_ENDPOINT_OBJECT, CAPTURE_ROUTER_ARGS,
    CAPTURE_ROUTER_FACTORY, CAPTURE_ROUTER_SYMBOL, PATTERN_ENDPOINT, PATTERN_ROUTER,
};

/// Callable a router declaration must invoke.
pub const ROUTER_FACTORY: &str = "APIRouter";

/// Extracts the router bound to `symbol` from a parsed syntax tree.
///
/// The first matching module-level declaration wins. `prefix` and `tags`
/// are read from keyword arguments when they are string literals; anything
/// else leaves them empty. Endpoints whose path is not a string literal are
/// ignored.
///
/// # Errors
///
/// Returns [`ParseError::MissingRouter`] if no module-level declaration of
/// `symbol` calls [`ROUTER_FACTORY`].
pub fn extract_router(
    tree: &Tree,
    source: &str,
    symbol: &str,
    query: &Query,
) -> Result<RouterDefinition, ParseError> {
    let source_bytes = source.as_bytes();
    let root = tree.root_node();

    let mut router: Option<RouterDefinition> = None;
    let mut endpoints: SmallVec<[Endpoint; 8]> = SmallVec::new();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source_bytes);

    while let Some(match_) = matches.next() {
        match match_.pattern_index {
            PATTERN_ROUTER if router.is_none() => {
                router = router_declaration(match_, source_bytes, symbol);
            }
            PATTERN_ENDPOINT => {
                if let Some(endpoint) = endpoint(match_, source_bytes, symbol) {
                    endpoints.push(endpoint);
                }
            }
            _ => {}
        }
    }

    let mut router = router.ok_or_else(|| ParseError::MissingRouter {
        symbol: symbol.to_owned(),
    })?;

    endpoints.sort_by_key(|endpoint| endpoint.line);
    router.endpoints = endpoints;

    Ok(router)
}

fn router_declaration(
    match_: &QueryMatch<'_, '_>,
    source: &[u8],
    symbol: &str,
) -> Option<RouterDefinition> {
    let name = text(capture(match_, CAPTURE_ROUTER_SYMBOL)?, source)?;
    let factory = text(capture(match_, CAPTURE_ROUTER_FACTORY)?, source)?;
    if name != symbol || factory != ROUTER_FACTORY {
        return None;
    }

    let mut router = RouterDefinition {
        symbol: name.to_owned(),
        ..RouterDefinition::default()
    };

    let args = capture(match_, CAPTURE_ROUTER_ARGS)?;
    let mut cursor = args.walk();
    for (keyword, value) in args
        .named_children(&mut cursor)
        .filter_map(|arg| keyword_argument(arg, source))
    {
        match keyword {
            "prefix" => router.prefix = string_literal(value, source).unwrap_or_default(),
            "tags" => router.tags = string_list(value, source),
            _ => {}
        }
    }

    Some(router)
}

fn endpoint(match_: &QueryMatch<'_, '_>, source: &[u8], symbol: &str) -> Option<Endpoint> {
    if text(capture(match_, CAPTURE_ENDPOINT_OBJECT)?, source)? != symbol {
        return None;
    }

    let attribute = text(capture(match_, CAPTURE_ENDPOINT_METHOD)?, source)?;
    let method = HttpMethod::from_decorator(attribute)?;
    let handler = text(capture(match_, CAPTURE_ENDPOINT_HANDLER)?, source)?;
    let decorator = capture(match_, CAPTURE_ENDPOINT_DECORATOR)?;
    let path = decorator_path(capture(match_, CAPTURE_ENDPOINT_ARGS)?, source)?;

    Some(Endpoint {
        method,
        path,
        handler: handler.to_owned(),
        line: u32::try_from(decorator.start_position().row + 1).unwrap_or(u32::MAX),
    })
}

/// The path is the first positional argument or the `path=` keyword.
fn decorator_path(args: Node<'_>, source: &[u8]) -> Option<String> {
    let mut cursor = args.walk();
    for arg in args.named_children(&mut cursor) {
        if let Some((keyword, value)) = keyword_argument(arg, source) {
            if keyword == "path" {
                return string_literal(value, source);
            }
            continue;
        }
        if arg.kind() != "comment" {
            return string_literal(arg, source);
        }
    }
    None
}

fn keyword_argument<'tree, 's>(
    node: Node<'tree>,
    source: &'s [u8],
) -> Option<(&'s str, Node<'tree>)> {
    if node.kind() != "keyword_argument" {
        return None;
    }
    let name = node.child_by_field_name("name")?;
    let value = node.child_by_field_name("value")?;
    Some((text(name, source)?, value))
}

/// Value of a plain or implicitly concatenated string literal.
///
/// Returns `None` for f-strings, strings containing escape sequences, and
/// non-string expressions.
fn string_literal(node: Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => {
            let mut value = String::new();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "string_content" if !has_escape(child) => {
                        value.push_str(child.utf8_text(source).ok()?);
                    }
                    "string_content" | "escape_sequence" | "interpolation" => return None,
                    _ => {}
                }
            }
            Some(value)
        }
        "concatenated_string" => {
            let mut cursor = node.walk();
            node.named_children(&mut cursor)
                .map(|part| string_literal(part, source))
                .collect()
        }
        _ => None,
    }
}

fn has_escape(content: Node<'_>) -> bool {
    let mut cursor = content.walk();
    content
        .named_children(&mut cursor)
        .any(|child| child.kind() == "escape_sequence")
}

fn string_list(node: Node<'_>, source: &[u8]) -> SmallVec<[String; 2]> {
    if !matches!(node.kind(), "list" | "tuple") {
        return SmallVec::new();
    }
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter_map(|item| string_literal(item, source))
        .collect()
}

fn capture<'tree>(match_: &QueryMatch<'_, 'tree>, index: u32) -> Option<Node<'tree>> {
    match_
        .captures
        .iter()
        .find(|capture| capture.index == index)
        .map(|capture| capture.node)
}

fn text<'s>(node: Node<'_>, source: &'s [u8]) -> Option<&'s str> {
    node.utf8_text(source).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PyParser;

    const PET_ROUTER: &str = r#"
from fastapi import APIRouter, Depends, HTTPException, status

from .use_case import PetUseCase, get_pet_use_case


router = APIRouter(prefix="/v1/pets", tags=["Pet"])


@router.get("", response_model=list[PetResponse])
async def get_pet_list(use_case: PetUseCase = Depends(get_pet_use_case)):
    return await use_case.get_list()


@router.post("", status_code=status.HTTP_201_CREATED)
async def create_pet(data: CreatePet):
    return data


@router.get("/{entity_id}")
async def get_pet(entity_id: str):
    return entity_id


@router.delete(path="/{entity_id}", status_code=204)
def delete_pet(entity_id: str):
    return None
"#;

    fn load(source: &str, symbol: &str) -> Result<RouterDefinition, ParseError> {
        PyParser::new().unwrap().parse_router(source, symbol)
    }

    #[test]
    fn test_extracts_router_declaration() {
        let router = load(PET_ROUTER, "router").unwrap();
        assert_eq!(router.symbol, "router");
        assert_eq!(router.prefix, "/v1/pets");
        assert_eq!(router.tags.as_slice(), ["Pet"]);
    }

    #[test]
    fn test_extracts_endpoints_in_source_order() {
        let router = load(PET_ROUTER, "router").unwrap();
        let summary: Vec<_> = router
            .endpoints
            .iter()
            .map(|e| (e.method, e.path.as_str(), e.handler.as_str()))
            .collect();

        assert_eq!(
            summary,
            [
                (HttpMethod::Get, "", "get_pet_list"),
                (HttpMethod::Post, "", "create_pet"),
                (HttpMethod::Get, "/{entity_id}", "get_pet"),
                (HttpMethod::Delete, "/{entity_id}", "delete_pet"),
            ]
        );
        assert_eq!(router.endpoints[0].line, 10);
    }

    #[test]
    fn test_escaped_path_is_not_a_literal() {
        let source = r#"
router = APIRouter(prefix="/v1/files")

@router.get("/a\x2Fb")
def escaped(): ...

@router.get("/plain")
def plain(): ...
"#;
        let router = load(source, "router").unwrap();
        let handlers: Vec<_> = router.endpoints.iter().map(|e| e.handler.as_str()).collect();
        assert_eq!(handlers, ["plain"]);
    }

    #[test]
    fn test_router_json() {
        let source = "router = APIRouter(prefix=\"/v1/tags\")\n\n@router.put(\"/{tag_id}\")\ndef replace_tag(tag_id: str): ...\n";
        let router = load(source, "router").unwrap();

        insta::assert_json_snapshot!(router, @r#"
        {
          "symbol": "router",
          "prefix": "/v1/tags",
          "tags": [],
          "endpoints": [
            {
              "method": "PUT",
              "path": "/{tag_id}",
              "handler": "replace_tag",
              "line": 3
            }
          ]
        }
        "#);
    }

    #[test]
    fn test_missing_router_symbol() {
        let err = load("from fastapi import APIRouter\n\napi = APIRouter()\n", "router").unwrap_err();
        assert!(matches!(err, ParseError::MissingRouter { ref symbol } if symbol == "router"));
    }

    #[test]
    fn test_router_must_call_factory() {
        let err = load("router = make_router(prefix='/x')\n", "router").unwrap_err();
        assert!(matches!(err, ParseError::MissingRouter { .. }));
    }

    #[test]
    fn test_router_must_be_module_level() {
        let source = "def build():\n    router = APIRouter(prefix='/x')\n    return router\n";
        let err = load(source, "router").unwrap_err();
        assert!(matches!(err, ParseError::MissingRouter { .. }));
    }

    #[test]
    fn test_custom_symbol() {
        let source = r#"
api = APIRouter(prefix='/v2/orders', tags=("Orders", "Sales"))

@api.put('/{order_id}')
def replace(order_id: str): ...

@router.get('/ignored')
def other(): ...
"#;
        let router = load(source, "api").unwrap();
        assert_eq!(router.prefix, "/v2/orders");
        assert_eq!(router.tags.as_slice(), ["Orders", "Sales"]);
        assert_eq!(router.endpoints.len(), 1);
        assert_eq!(router.endpoints[0].method, HttpMethod::Put);
    }

    #[test]
    fn test_non_literal_arguments() {
        let source = r#"
PREFIX = "/v1/things"
router = APIRouter(prefix=PREFIX, tags=TAGS)

@router.get(f"/{PREFIX}/x")
def dynamic(): ...

@router.get("/" "static")
def concatenated(): ...

@router.websocket("/ws")
def socket(): ...
"#;
        let router = load(source, "router").unwrap();
        assert_eq!(router.prefix, "");
        assert!(router.tags.is_empty());
        assert_eq!(router.endpoints.len(), 1);
        assert_eq!(router.endpoints[0].path, "/static");
        assert_eq!(router.endpoints[0].handler, "concatenated");
    }

    #[test]
    fn test_stacked_decorators() {
        let source = r#"
router = APIRouter()

@router.get("/items")
@router.head("/items")
def items(): ...
"#;
        let router = load(source, "router").unwrap();
        let methods: Vec<_> = router.endpoints.iter().map(|e| e.method).collect();
        assert_eq!(methods, [HttpMethod::Get, HttpMethod::Head]);
    }
}
