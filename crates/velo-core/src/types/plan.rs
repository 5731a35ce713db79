//! Generation plans.
//!
//! A [`GenerationPlan`] is a snapshot: every artifact is classified against
//! the filesystem once, at planning time, and the writer trusts that
//! classification.

use serde::Serialize;
use smallvec::SmallVec;

use super::artifact::{ArtifactSpec, TemplateId};
use crate::naming::NameSet;

/// What the writer should do with one artifact.
///
/// # Examples
///
/// ```
/// use velo_core::Classification;
///
/// assert!(Classification::Create { overwrite: false }.will_write());
/// assert!(!Classification::Conflict.will_write());
/// assert!(!Classification::Skip.will_write());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Classification {
    /// Write the file. `overwrite` is set when replacing an existing file.
    Create {
        /// Whether an existing file will be replaced.
        overwrite: bool,
    },

    /// The file exists with different content and overwriting was not
    /// requested.
    Conflict,

    /// The file exists and is byte-identical to the fresh rendering.
    Skip,
}

impl Classification {
    /// Returns `true` if the writer will touch the file.
    #[inline]
    #[must_use]
    pub const fn will_write(self) -> bool {
        matches!(self, Self::Create { .. })
    }

    /// Returns `true` for [`Classification::Conflict`].
    #[inline]
    #[must_use]
    pub const fn is_conflict(self) -> bool {
        matches!(self, Self::Conflict)
    }

    /// Short label for status output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create { overwrite: false } => "create",
            Self::Create { overwrite: true } => "overwrite",
            Self::Conflict => "conflict",
            Self::Skip => "unchanged",
        }
    }
}

/// Flags controlling a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct GenerationFlags {
    /// Plan only; never touch the filesystem.
    pub dry_run: bool,

    /// Replace existing files whose content differs.
    pub force: bool,
}

/// An artifact paired with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedArtifact {
    /// The rendered artifact.
    pub spec: ArtifactSpec,

    /// What the writer should do with it.
    pub classification: Classification,
}

/// The ordered, classified set of artifacts for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationPlan {
    /// Names the plan was rendered from.
    pub names: NameSet,

    /// Flags the plan was computed with.
    pub flags: GenerationFlags,

    /// Artifacts in template order.
    pub artifacts: SmallVec<[PlannedArtifact; 6]>,
}

impl GenerationPlan {
    /// Number of planned artifacts.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Returns `true` if the plan has no artifacts.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Iterates over the planned artifacts in order.
    pub fn iter(&self) -> impl Iterator<Item = &PlannedArtifact> {
        self.artifacts.iter()
    }

    /// Finds the artifact rendered from `template`.
    #[must_use]
    pub fn get(&self, template: TemplateId) -> Option<&PlannedArtifact> {
        self.artifacts.iter().find(|a| a.spec.template == template)
    }

    /// Artifacts classified as conflicts.
    pub fn conflicts(&self) -> impl Iterator<Item = &PlannedArtifact> {
        self.artifacts.iter().filter(|a| a.classification.is_conflict())
    }

    /// Returns `true` if any artifact conflicts with an existing file.
    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        self.conflicts().next().is_some()
    }

    /// Number of artifacts the writer would touch.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.classification.will_write())
            .count()
    }
}
