//! Registry of generated modules.
//!
//! There is no manifest: the set of modules is whatever folders under the
//! modules root currently contain a router file.

use velo_core::ProjectLayout;

use crate::error::ScanError;
use crate::walker::{ModuleDir, ModuleWalker};

/// Read-only view of the modules present in a project.
///
/// # Examples
///
/// ```no_run
/// use velo_core::ProjectLayout;
/// use velo_scanner::ModuleRegistry;
///
/// let registry = ModuleRegistry::new(&ProjectLayout::default());
/// for name in registry.list()? {
///     println!("{name}");
/// }
/// # Ok::<(), velo_scanner::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    walker: ModuleWalker,
}

impl ModuleRegistry {
    /// Creates a registry over `layout`'s modules root.
    #[must_use]
    pub fn new(layout: &ProjectLayout) -> Self {
        Self {
            walker: ModuleWalker::new(&layout.modules_root(), layout.router_file_name()),
        }
    }

    /// Module names, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::RegistryIo`] if the modules root is missing or
    /// unreadable.
    pub fn list(&self) -> Result<Vec<String>, ScanError> {
        Ok(self.modules()?.into_iter().map(|m| m.name).collect())
    }

    /// Module folders with their router paths, sorted by name.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub fn modules(&self) -> Result<Vec<ModuleDir>, ScanError> {
        let modules = self.walker.collect_modules()?;
        tracing::debug!(root = %self.walker.root(), count = modules.len(), "listed modules");
        Ok(modules)
    }

    /// Returns `true` if a module named `name` exists.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub fn contains(&self, name: &str) -> Result<bool, ScanError> {
        Ok(self.modules()?.iter().any(|m| m.name == name))
    }
}
