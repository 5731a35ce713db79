//! Module registry and route auto-discovery.
//!
//! Generated modules are never registered anywhere. This crate re-derives
//! them from the filesystem on every run:
//!
//! - [`ModuleWalker`] - Lists module folders that contain a router file
//! - [`ModuleRegistry`] - Sorted module names for `velo list`
//! - [`RouteDiscovery`] - Loads each module's router and mounts it through a
//!   [`RouteMount`], isolating modules that fail to load
//! - [`RouteTable`] - A [`RouteMount`] that records full paths and resolves
//!   requests with first-mounted-wins precedence
//!
//! # Example
//!
//! ```no_run
//! use velo_core::{Config, HttpMethod};
//! use velo_scanner::{RouteDiscovery, RouteTable};
//!
//! let config = Config::default();
//! let mut table = RouteTable::new();
//! let report = RouteDiscovery::new(&config).discover(&mut table)?;
//!
//! println!("mounted {} modules", report.mounted.len());
//! if let Some(route) = table.resolve(HttpMethod::Get, "/api/v1/pets") {
//!     println!("served by {}::{}", route.module, route.handler);
//! }
//! # Ok::<(), velo_scanner::ScanError>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod discovery;
pub mod error;
pub mod registry;
mod table;
pub mod walker;

pub use discovery::{DiscoveryReport, RouteDiscovery, RouteLoadFailure, RouteMount, load_router};
pub use error::{RouteLoadError, ScanError};
pub use registry::ModuleRegistry;
pub use table::{MountedRoute, RouteTable, ShadowedRoute};
pub use walker::{ModuleDir, ModuleWalker};
