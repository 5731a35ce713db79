//! Module folder enumeration.
//!
//! This module provides [`ModuleWalker`], which lists the folders directly
//! under a modules root that contain a given router file.
//!
//! # Filtering
//!
//! - Only immediate children of the root are considered
//! - Hidden folders (leading `.`) are skipped
//! - `__pycache__` and any user-specified folder names are skipped
//! - `.gitignore` rules are not applied: an ignored module still mounts
//! - Entries that cannot be read or whose name is not UTF-8 are logged and
//!   skipped; only an unreadable root fails the listing

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::error::ScanError;

const SKIP_DIRECTORIES: &[&str] = &["__pycache__"];

/// A module folder containing a router file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleDir {
    /// Folder name.
    pub name: String,
    /// Path of the router file inside it.
    pub router_path: Utf8PathBuf,
}

/// Lists module folders under a modules root.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use velo_scanner::ModuleWalker;
///
/// let walker = ModuleWalker::new(Utf8Path::new("api_app/modules"), "router.py");
/// for module in walker.collect_modules()? {
///     println!("{} -> {}", module.name, module.router_path);
/// }
/// # Ok::<(), velo_scanner::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ModuleWalker {
    root: Utf8PathBuf,
    router_file: String,
    skip_dirs: Vec<String>,
}

impl ModuleWalker {
    /// Creates a walker for `root` looking for `router_file` in each folder.
    pub fn new(root: &Utf8Path, router_file: impl Into<String>) -> Self {
        Self {
            root: root.to_owned(),
            router_file: router_file.into(),
            skip_dirs: Vec::new(),
        }
    }

    /// Adds folder names to skip.
    #[must_use]
    pub fn with_skip_dirs(mut self, dirs: &[&str]) -> Self {
        self.skip_dirs.extend(dirs.iter().map(ToString::to_string));
        self
    }

    /// Collects module folders, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::RegistryIo`] if the root is missing or unreadable.
    pub fn collect_modules(&self) -> Result<Vec<ModuleDir>, ScanError> {
        let metadata = fs::metadata(&self.root).map_err(|e| ScanError::registry_io(&self.root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::registry_io(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }
        fs::read_dir(&self.root).map_err(|e| ScanError::registry_io(&self.root, e))?;

        let mut modules = Vec::new();
        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(root = %self.root, error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.depth() != 1 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                continue;
            }

            let path = entry.path();
            let Some(dir) = Utf8Path::from_path(path) else {
                tracing::warn!(path = %path.display(), "skipping folder with a non UTF-8 name");
                continue;
            };
            let Some(name) = dir.file_name() else {
                continue;
            };
            if self.should_skip(name) {
                continue;
            }

            let router_path = dir.join(&self.router_file);
            if !router_path.is_file() {
                tracing::debug!(module = name, "folder has no router file");
                continue;
            }

            modules.push(ModuleDir {
                name: name.to_owned(),
                router_path,
            });
        }

        modules.sort();
        Ok(modules)
    }

    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            // Hidden folders only; VCS ignore files do not hide modules
            .standard_filters(false)
            .hidden(true)
            .max_depth(Some(1))
            .build()
    }

    fn should_skip(&self, name: &str) -> bool {
        SKIP_DIRECTORIES.contains(&name) || self.skip_dirs.iter().any(|d| d == name)
    }

    /// The modules root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}
