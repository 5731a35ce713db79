//! Domain types shared by generation and discovery.
//!
//! # Module Organization
//!
//! - [`artifact`] - Template identifiers and rendered artifacts
//! - [`plan`] - Per-artifact classification and the generation plan
//! - [`outcome`] - Write results and the aggregated report
//! - [`module`] - Discovered modules and loaded router definitions
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use velo_core::types::{GenerationPlan, TemplateId, WriteReport};
//! use velo_core::{DiscoveredModule, RouterDefinition};
//! ```

mod artifact;
mod module;
mod outcome;
mod plan;

pub use artifact::{ArtifactSpec, TemplateId};
pub use module::{DiscoveredModule, Endpoint, HttpMethod, RouterDefinition, join_route};
pub use outcome::{SkipReason, WriteReport, WriteResult, WriteStatus};
pub use plan::{Classification, GenerationFlags, GenerationPlan, PlannedArtifact};
