//! Error types for the velo-gen crate.
//!
//! This module provides [`GenerateError`] for everything that aborts a
//! generation request before a single file is written. Failures while
//! writing are not errors: they are recorded per artifact in the
//! [`WriteReport`](velo_core::WriteReport).

use camino::Utf8PathBuf;
use velo_core::{ConfigError, NameError, TemplateId};

/// Errors that abort planning.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The module name failed validation.
    #[error(transparent)]
    InvalidName(#[from] NameError),

    /// A template id outside the fixed set was requested.
    #[error("unknown template '{id}'")]
    UnknownTemplate {
        /// The requested id.
        id: String,
    },

    /// A template failed to render.
    #[error("failed to render template '{template}': {source}")]
    Render {
        /// The template being rendered.
        template: TemplateId,
        /// The underlying template engine error.
        #[source]
        source: minijinja::Error,
    },

    /// An existence check failed for a reason other than "not found".
    #[error("failed to inspect {path}: {source}")]
    PlanningIo {
        /// The path being checked.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The project layout is unusable (e.g. the app directory is missing).
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GenerateError {
    /// Creates a new [`GenerateError::PlanningIo`] error.
    #[inline]
    pub fn planning_io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::PlanningIo {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`GenerateError::UnknownTemplate`] error.
    #[inline]
    pub fn unknown_template(id: impl Into<String>) -> Self {
        Self::UnknownTemplate { id: id.into() }
    }

    /// Returns `true` if fixing the user's input is enough to retry.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidName(_) | Self::UnknownTemplate { .. })
    }

    /// Returns `true` if the error is not [`recoverable`](Self::is_recoverable).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::PlanningIo { path, .. } => Some(path),
            Self::Config(ConfigError::MissingDirectory(path) | ConfigError::InvalidPath { path, .. }) => {
                Some(path)
            }
            _ => None,
        }
    }
}
