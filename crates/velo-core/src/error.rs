//! Error types for the velo-core crate.
//!
//! This module provides [`NameError`] for module-name validation failures and
//! [`ConfigError`] for configuration loading and project layout validation.

use camino::Utf8PathBuf;

/// Errors produced while validating a user-supplied module name.
///
/// Validation is the first step of every generation request and always
/// happens before the filesystem is touched, so these errors are safe to
/// retry after fixing the input.
///
/// # Examples
///
/// ```
/// use velo_core::{ModuleToken, NameError};
///
/// let err = ModuleToken::parse("2fast").unwrap_err();
/// assert!(matches!(err, NameError::InvalidModuleName { .. }));
/// assert!(err.to_string().contains("2fast"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The token is empty, contains characters outside `[a-zA-Z0-9_]`,
    /// or starts with a digit.
    #[error("invalid module name '{name}': {reason}")]
    InvalidModuleName {
        /// The rejected token, verbatim.
        name: String,
        /// Which rule the token broke.
        reason: &'static str,
    },
}

impl NameError {
    /// Creates a new [`NameError::InvalidModuleName`] error.
    #[inline]
    pub fn invalid(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidModuleName {
            name: name.into(),
            reason,
        }
    }

    /// Returns the rejected token.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::InvalidModuleName { name, .. } => name,
        }
    }
}

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use velo_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingDirectory(Utf8PathBuf::from("/some/path"));
/// assert!(error.to_string().contains("/some/path"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// A required directory does not exist.
    #[error("missing required directory: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
