//! Core types, naming rules, errors, and configuration for velo.
//!
//! This crate provides the foundational pieces shared by the generator and
//! the route discovery half of the workspace:
//!
//! - [`naming`] - Module name validation and the casing/pluralization rules
//!   that derive a [`NameSet`] from a single token
//! - [`config`] - Configuration structures, including the [`ProjectLayout`]
//!   that is the only contract between generation and discovery
//! - [`types`] - Domain types (`ArtifactSpec`, `GenerationPlan`,
//!   `WriteReport`, `DiscoveredModule`, `RouterDefinition`)
//! - Error types for consistent error handling
//!
//! # Example
//!
//! ```
//! use velo_core::{NameTransformer, NamingConfig};
//!
//! let transformer = NameTransformer::new(&NamingConfig::default());
//! let names = transformer.transform("invoices")?;
//!
//! assert_eq!(names.snake, "invoices");
//! assert_eq!(names.type_name, "Invoice");
//! assert_eq!(names.route_prefix, "/v1/invoices");
//! # Ok::<(), velo_core::NameError>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod naming;
pub mod types;

pub use config::{Config, DevConfig, DiscoveryConfig, NameForm, NamingConfig, ProjectLayout};
pub use error::{ConfigError, NameError};
pub use naming::{ModuleToken, NameSet, NameTransformer};
pub use types::{
    ArtifactSpec, Classification, DiscoveredModule, Endpoint, GenerationFlags, GenerationPlan,
    HttpMethod, PlannedArtifact, RouterDefinition, SkipReason, TemplateId, WriteReport,
    WriteResult, WriteStatus,
};
