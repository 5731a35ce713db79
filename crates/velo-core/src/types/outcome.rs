//! Write outcomes.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use super::artifact::TemplateId;

/// Why an artifact was not written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// An existing file differs and overwriting was not requested.
    Conflict,
    /// An existing file already has the rendered content.
    Unchanged,
    /// The plan was a dry run.
    DryRun,
}

/// Result of attempting to write one artifact.
///
/// # Examples
///
/// ```
/// use velo_core::{SkipReason, WriteStatus};
///
/// assert!(WriteStatus::Written.is_success());
/// assert!(WriteStatus::Skipped(SkipReason::Conflict).is_success());
/// assert!(!WriteStatus::Failed.is_success());
/// assert_eq!(WriteStatus::Skipped(SkipReason::Unchanged).label(), "unchanged");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    /// A new file was created.
    Written,
    /// An existing file was replaced.
    Overwritten,
    /// Nothing was written.
    Skipped(SkipReason),
    /// The write was attempted and failed.
    Failed,
}

impl WriteStatus {
    /// Returns `false` only for [`WriteStatus::Failed`].
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Returns `true` if the file on disk was changed.
    #[inline]
    #[must_use]
    pub const fn touched_disk(self) -> bool {
        matches!(self, Self::Written | Self::Overwritten)
    }

    /// Status word for per-artifact output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Written => "created",
            Self::Overwritten => "overwritten",
            Self::Skipped(SkipReason::Conflict) => "skipped (conflict)",
            Self::Skipped(SkipReason::Unchanged) => "unchanged",
            Self::Skipped(SkipReason::DryRun) => "skipped (dry run)",
            Self::Failed => "failed",
        }
    }
}

/// Outcome of one planned artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    /// Template the artifact was rendered from.
    pub template: TemplateId,

    /// Path relative to the application root.
    pub path: Utf8PathBuf,

    /// What happened.
    pub status: WriteStatus,

    /// Error message when `status` is [`WriteStatus::Failed`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WriteResult {
    /// Creates a successful or skipped result.
    #[must_use]
    pub fn new(template: TemplateId, path: Utf8PathBuf, status: WriteStatus) -> Self {
        Self {
            template,
            path,
            status,
            error: None,
        }
    }

    /// Creates a failed result carrying `error`'s message.
    #[must_use]
    pub fn failed(template: TemplateId, path: Utf8PathBuf, error: impl ToString) -> Self {
        Self {
            template,
            path,
            status: WriteStatus::Failed,
            error: Some(error.to_string()),
        }
    }
}

/// One [`WriteResult`] per planned artifact, in plan order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WriteReport {
    /// Per-artifact results.
    pub results: Vec<WriteResult>,
}

impl WriteReport {
    /// Number of results with the given status.
    #[must_use]
    pub fn count(&self, status: WriteStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Failed results.
    pub fn failures(&self) -> impl Iterator<Item = &WriteResult> {
        self.results.iter().filter(|r| !r.status.is_success())
    }

    /// Returns `true` if any artifact failed to write.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Number of files created or overwritten.
    #[must_use]
    pub fn files_touched(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status.touched_disk())
            .count()
    }
}
