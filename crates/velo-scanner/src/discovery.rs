//! Route auto-discovery.
//!
//! Discovery is structural. Every folder under the modules root that
//! contains the router file is a candidate; candidates are ordered by folder
//! name, their router files are parsed (never imported or executed), and
//! each successfully loaded router is handed to a [`RouteMount`].
//!
//! A candidate that fails to load is logged and reported as a
//! [`RouteLoadFailure`]; the remaining candidates still mount.
//!
//! # Ordering
//!
//! Parsing may run on the rayon pool. Results are collected in candidate
//! order and mounted sequentially, so mount order is always lexicographic
//! by folder name regardless of which parse finishes first.

use std::fmt;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use velo_core::{Config, DiscoveredModule, ProjectLayout, RouterDefinition};
use velo_py_parser::PyParser;

use crate::error::{RouteLoadError, ScanError};
use crate::walker::ModuleWalker;

/// Receives loaded routers in mount order.
///
/// Implemented by [`RouteTable`](crate::RouteTable); an application host
/// would implement it to register routers with its web framework.
pub trait RouteMount {
    /// Mounts `router`, loaded from `module`, under `api_prefix`.
    fn mount(&mut self, api_prefix: &str, module: &DiscoveredModule, router: &RouterDefinition);
}

/// A candidate that could not be loaded.
#[derive(Debug)]
pub struct RouteLoadFailure {
    /// The candidate.
    pub module: DiscoveredModule,
    /// Why it failed.
    pub error: RouteLoadError,
}

impl fmt::Display for RouteLoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "module '{}' ({}): {}",
            self.module.module_name, self.module.route_entry_path, self.error
        )
    }
}

/// Outcome of one discovery run.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// The modules root that was scanned.
    pub modules_root: Utf8PathBuf,
    /// Every candidate, in load order.
    pub candidates: Vec<DiscoveredModule>,
    /// Candidates that were mounted, in mount order.
    pub mounted: Vec<DiscoveredModule>,
    /// Candidates that failed to load, in load order.
    pub failures: Vec<RouteLoadFailure>,
}

impl DiscoveryReport {
    /// Returns `true` if every candidate mounted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of mounted modules, in mount order.
    pub fn mounted_names(&self) -> impl Iterator<Item = &str> {
        self.mounted.iter().map(|m| m.module_name.as_str())
    }
}

/// Finds, loads and mounts module routers.
///
/// # Examples
///
/// ```no_run
/// use velo_core::Config;
/// use velo_scanner::{RouteDiscovery, RouteTable};
///
/// let mut table = RouteTable::new();
/// let report = RouteDiscovery::new(&Config::default()).discover(&mut table)?;
///
/// for failure in &report.failures {
///     eprintln!("skipped {failure}");
/// }
/// # Ok::<(), velo_scanner::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RouteDiscovery {
    layout: ProjectLayout,
    api_prefix: String,
    parallel: bool,
}

impl RouteDiscovery {
    /// Creates a discovery run for `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            layout: config.layout.clone(),
            api_prefix: config.discovery.api_prefix.clone(),
            parallel: config.discovery.parallel,
        }
    }

    /// Sets whether router files are parsed on the rayon pool.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Lists candidates in lexicographic folder order with `load_order`
    /// assigned.
    ///
    /// A missing modules root yields no candidates and a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the modules root exists but cannot be read.
    pub fn candidates(&self) -> Result<Vec<DiscoveredModule>, ScanError> {
        let root = self.layout.modules_root();
        let walker = ModuleWalker::new(&root, self.layout.router_file_name());

        let dirs = match walker.collect_modules() {
            Ok(dirs) => dirs,
            Err(err) if err.is_missing_root() => {
                warn!(root = %root, "modules directory does not exist, nothing to mount");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        Ok(dirs
            .into_iter()
            .enumerate()
            .map(|(load_order, dir)| DiscoveredModule {
                module_name: dir.name,
                route_entry_path: dir.router_path,
                load_order,
            })
            .collect())
    }

    /// Loads every candidate's router, one result per candidate, in
    /// candidate order.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Parser`] if no Python parser can be created.
    pub fn load_all(
        &self,
        candidates: &[DiscoveredModule],
    ) -> Result<Vec<Result<RouterDefinition, RouteLoadError>>, ScanError> {
        let mut parser = PyParser::new()?;
        let symbol = self.layout.router_symbol.as_str();

        if !self.parallel || candidates.len() < 2 {
            return Ok(candidates
                .iter()
                .map(|module| load_router(&mut parser, &module.route_entry_path, symbol))
                .collect());
        }

        Ok(candidates
            .par_iter()
            .map_init(
                || PyParser::new().map_err(|e| e.to_string()),
                |parser, module| match parser {
                    Ok(parser) => load_router(parser, &module.route_entry_path, symbol),
                    Err(message) => Err(RouteLoadError::Parser(message.clone())),
                },
            )
            .collect())
    }

    /// Runs discovery and mounts every loadable router into `mount`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] only when discovery cannot run at all (an
    /// unreadable modules root, no parser). Per-module failures are in the
    /// report.
    pub fn discover<M: RouteMount + ?Sized>(&self, mount: &mut M) -> Result<DiscoveryReport, ScanError> {
        let candidates = self.candidates()?;
        let loaded = self.load_all(&candidates)?;

        let mut report = DiscoveryReport {
            modules_root: self.layout.modules_root(),
            ..DiscoveryReport::default()
        };

        for (module, result) in candidates.iter().zip(loaded) {
            match result {
                Ok(router) => {
                    mount.mount(&self.api_prefix, module, &router);
                    info!(
                        module = %module.module_name,
                        prefix = %router.prefix,
                        endpoints = router.endpoints.len(),
                        "mounted router"
                    );
                    report.mounted.push(module.clone());
                }
                Err(error) => {
                    warn!(
                        module = %module.module_name,
                        path = %module.route_entry_path,
                        error = %error,
                        "failed to load router, skipping module"
                    );
                    report.failures.push(RouteLoadFailure {
                        module: module.clone(),
                        error,
                    });
                }
            }
        }

        report.candidates = candidates;
        debug!(
            candidates = report.candidates.len(),
            mounted = report.mounted.len(),
            failed = report.failures.len(),
            "discovery finished"
        );

        Ok(report)
    }

    /// The application-wide prefix routers are mounted under.
    #[must_use]
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }
}

/// Reads and parses one router file.
///
/// # Errors
///
/// Returns [`RouteLoadError`] if the file cannot be read, is not valid
/// Python, or does not declare `symbol`.
pub fn load_router(
    parser: &mut PyParser,
    path: &Utf8Path,
    symbol: &str,
) -> Result<RouterDefinition, RouteLoadError> {
    let source = fs::read_to_string(path).map_err(RouteLoadError::Read)?;
    Ok(parser.parse_router(&source, symbol)?)
}
