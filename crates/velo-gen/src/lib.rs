//! Conflict-aware module generation.
//!
//! This crate turns one module name into the files of a FastAPI/Beanie
//! feature module:
//!
//! - [`templates`] - Renders the fixed template set against a
//!   [`NameSet`](velo_core::NameSet)
//! - [`planner`] - Classifies every artifact against the filesystem
//!   without writing
//! - [`writer`] - Executes a plan, best effort, with a complete report
//! - [`Generator`] - The facade the CLI uses
//!
//! # Example
//!
//! ```no_run
//! use camino::Utf8Path;
//! use velo_core::{Config, GenerationFlags};
//! use velo_gen::{GenerateOutcome, Generator};
//!
//! let config = Config::discover(Utf8Path::new("/srv/backend"))?;
//! let flags = GenerationFlags { dry_run: true, force: false };
//!
//! if let GenerateOutcome::Preview(plan) = Generator::new(&config).generate("orders", flags)? {
//!     for artifact in plan.iter() {
//!         println!("{} {}", artifact.classification.label(), artifact.spec.relative_path);
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Non-atomicity
//!
//! Planning and writing are separate steps and no lock is taken. A file
//! created between the two is reported as a failed create (or overwritten
//! when forcing).

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
mod generator;
pub mod planner;
pub mod templates;
pub mod writer;

pub use error::GenerateError;
pub use generator::{GenerateOutcome, Generator, next_steps};
pub use planner::{GenerationPlanner, classify};
pub use templates::TemplateRenderer;
pub use writer::ArtifactWriter;
