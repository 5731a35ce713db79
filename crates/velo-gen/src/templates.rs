//! Template rendering.
//!
//! Template bodies are compiled into the binary and registered once in a
//! process-wide [`minijinja::Environment`]. Undefined variables are errors,
//! so a template can never silently render an empty name.

use std::sync::OnceLock;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use velo_core::{NameSet, ProjectLayout, TemplateId};

use crate::error::GenerateError;

const TEMPLATES: [(TemplateId, &str); 6] = [
    (
        TemplateId::PackageInit,
        include_str!("../templates/package_init.py.j2"),
    ),
    (TemplateId::Schemas, include_str!("../templates/schemas.py.j2")),
    (
        TemplateId::Repository,
        include_str!("../templates/repository.py.j2"),
    ),
    (TemplateId::UseCase, include_str!("../templates/use_case.py.j2")),
    (TemplateId::Router, include_str!("../templates/router.py.j2")),
    (TemplateId::Model, include_str!("../templates/model.py.j2")),
];

static ENVIRONMENT: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    ENVIRONMENT.get_or_init(|| {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        for (template, source) in TEMPLATES {
            if let Err(err) = env.add_template(template.as_str(), source) {
                // Surfaces again as a render error for this template.
                tracing::error!(%template, error = %err, "failed to register template");
            }
        }

        env
    })
}

#[derive(Serialize)]
struct RenderContext<'a> {
    #[serde(flatten)]
    names: &'a NameSet,
    router_symbol: &'a str,
    models_package: &'a str,
}

/// Renders module templates for one project layout.
///
/// Rendering is deterministic: the same template, names and layout always
/// produce byte-identical output.
///
/// # Examples
///
/// ```
/// use velo_core::{NameTransformer, ProjectLayout, TemplateId};
/// use velo_gen::TemplateRenderer;
///
/// let names = NameTransformer::default().transform("invoice")?;
/// let renderer = TemplateRenderer::new(&ProjectLayout::default());
///
/// let router = renderer.render(TemplateId::Router, &names)?;
/// assert!(router.contains(r#"router = APIRouter(prefix="/v1/invoices", tags=["Invoice"])"#));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    router_symbol: String,
    models_package: String,
}

impl TemplateRenderer {
    /// Creates a renderer for `layout`.
    #[must_use]
    pub fn new(layout: &ProjectLayout) -> Self {
        Self {
            router_symbol: layout.router_symbol.clone(),
            models_package: layout.models_dir.clone(),
        }
    }

    /// Renders `template` with `names` as context.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Render`] if the template fails to render.
    pub fn render(&self, template: TemplateId, names: &NameSet) -> Result<String, GenerateError> {
        let render_error = |source| GenerateError::Render { template, source };

        let context = RenderContext {
            names,
            router_symbol: &self.router_symbol,
            models_package: &self.models_package,
        };

        environment()
            .get_template(template.as_str())
            .and_then(|tmpl| tmpl.render(&context))
            .map_err(render_error)
    }

    /// Renders a template by its string id.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnknownTemplate`] for ids outside the fixed
    /// set, otherwise whatever [`render`](Self::render) returns.
    pub fn render_named(&self, id: &str, names: &NameSet) -> Result<String, GenerateError> {
        let template = TemplateId::from_id(id).ok_or_else(|| GenerateError::unknown_template(id))?;
        self.render(template, names)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(&ProjectLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use velo_core::NameTransformer;
    use velo_py_parser::PyParser;

    use super::*;

    fn names(raw: &str) -> NameSet {
        NameTransformer::default().transform(raw).unwrap()
    }

    #[test]
    fn test_every_template_renders() {
        let renderer = TemplateRenderer::default();
        for template in TemplateId::ALL {
            let content = renderer.render(template, &names("orders")).unwrap();
            assert!(!content.trim().is_empty(), "{template} rendered empty");
            assert!(content.ends_with('\n'), "{template} lost its trailing newline");
            assert!(!content.contains("{{"), "{template} left an unrendered tag");
        }
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = TemplateRenderer::default();
        let names = names("UserProfile");
        for template in TemplateId::ALL {
            assert_eq!(
                renderer.render(template, &names).unwrap(),
                renderer.render(template, &names).unwrap()
            );
        }
    }

    #[test]
    fn test_render_named() {
        let renderer = TemplateRenderer::default();
        let by_name = renderer.render_named("use-case", &names("orders")).unwrap();
        let by_id = renderer.render(TemplateId::UseCase, &names("orders")).unwrap();
        assert_eq!(by_name, by_id);
    }

    #[test]
    fn test_render_named_unknown() {
        let err = TemplateRenderer::default()
            .render_named("controller", &names("orders"))
            .unwrap_err();
        assert!(matches!(err, GenerateError::UnknownTemplate { ref id } if id == "controller"));
    }

    #[test]
    fn test_rendered_python_parses() {
        let renderer = TemplateRenderer::default();
        let mut parser = PyParser::new().unwrap();
        for raw in ["invoice", "UserProfile", "category", "news", "_", "_1x", "__init__"] {
            for template in TemplateId::ALL {
                let content = renderer.render(template, &names(raw)).unwrap();
                assert!(
                    parser.parse(&content).is_ok(),
                    "{template} for {raw} is not valid Python:\n{content}"
                );
            }
        }
    }

    #[test]
    fn test_router_round_trip() {
        let content = TemplateRenderer::default()
            .render(TemplateId::Router, &names("invoice"))
            .unwrap();
        let router = PyParser::new()
            .unwrap()
            .parse_router(&content, "router")
            .unwrap();

        assert_eq!(router.prefix, "/v1/invoices");
        assert_eq!(router.tags.as_slice(), ["Invoice"]);

        let handlers: Vec<_> = router.endpoints.iter().map(|e| e.handler.as_str()).collect();
        assert_eq!(
            handlers,
            [
                "list_invoices",
                "create_invoice",
                "get_invoice",
                "update_invoice",
                "delete_invoice"
            ]
        );
    }

    #[test]
    fn test_custom_router_symbol() {
        let layout = ProjectLayout {
            router_symbol: String::from("api"),
            ..ProjectLayout::default()
        };
        let content = TemplateRenderer::new(&layout)
            .render(TemplateId::Router, &names("orders"))
            .unwrap();
        assert!(content.contains("api = APIRouter("));
        assert!(content.contains("@api.get(\"\""));
    }

    #[test]
    fn test_model_template_snapshot() {
        let content = TemplateRenderer::default()
            .render(TemplateId::Model, &names("invoice"))
            .unwrap();
        insta::assert_snapshot!(content, @r#"
        """
        Invoice Beanie document model
        """

        from datetime import datetime, timezone
        from typing import Optional

        from beanie import Document
        from pydantic import Field


        class Invoice(Document):
            """Invoice document stored in the "invoices" collection"""

            name: str = Field(..., min_length=1, max_length=100)
            description: Optional[str] = Field(default=None, max_length=500)
            created_at: datetime = Field(default_factory=lambda: datetime.now(timezone.utc))
            updated_at: Optional[datetime] = None

            class Settings:
                name = "invoices"

            def __str__(self) -> str:
                return f"Invoice(id={self.id})"
        "#);
    }

    #[test]
    fn test_every_template_is_registered() {
        for template in TemplateId::ALL {
            assert!(environment().get_template(template.as_str()).is_ok(), "{template}");
        }
    }
}
