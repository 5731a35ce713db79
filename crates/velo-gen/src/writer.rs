//! Plan execution.
//!
//! Every `Create` artifact is written independently. A failure is recorded
//! and the remaining artifacts are still attempted, so the report always
//! has exactly one result per planned artifact.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use velo_core::{
    ArtifactSpec, Classification, GenerationPlan, SkipReason, WriteReport, WriteResult,
    WriteStatus,
};

/// Writes planned artifacts under an application root.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    app_root: Utf8PathBuf,
}

impl ArtifactWriter {
    /// Creates a writer rooted at `app_root`.
    pub fn new(app_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
        }
    }

    /// Executes `plan`.
    ///
    /// A dry-run plan is never written; every artifact is reported as
    /// `Skipped(DryRun)`.
    pub fn write(&self, plan: &GenerationPlan) -> WriteReport {
        let results = plan
            .iter()
            .map(|artifact| {
                let spec = &artifact.spec;
                let status = match artifact.classification {
                    _ if plan.flags.dry_run => WriteStatus::Skipped(SkipReason::DryRun),
                    Classification::Conflict => WriteStatus::Skipped(SkipReason::Conflict),
                    Classification::Skip => WriteStatus::Skipped(SkipReason::Unchanged),
                    Classification::Create { overwrite } => {
                        match self.write_artifact(spec, overwrite) {
                            Ok(status) => status,
                            Err(err) => {
                                tracing::warn!(
                                    path = %spec.relative_path,
                                    error = %err,
                                    "failed to write artifact"
                                );
                                return WriteResult::failed(
                                    spec.template,
                                    spec.relative_path.clone(),
                                    err,
                                );
                            }
                        }
                    }
                };
                WriteResult::new(spec.template, spec.relative_path.clone(), status)
            })
            .collect();

        let report = WriteReport { results };
        tracing::info!(
            module = %plan.names.snake,
            touched = report.files_touched(),
            failed = report.failures().count(),
            "wrote module"
        );
        report
    }

    fn write_artifact(&self, spec: &ArtifactSpec, overwrite: bool) -> io::Result<WriteStatus> {
        let path = self.app_root.join(&spec.relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = open_target(&path, overwrite)?;
        file.write_all(spec.content.as_bytes())?;
        file.flush()?;

        tracing::debug!(path = %path, overwrite, "wrote artifact");
        Ok(if overwrite {
            WriteStatus::Overwritten
        } else {
            WriteStatus::Written
        })
    }

    /// The application root artifacts are written under.
    #[must_use]
    pub fn app_root(&self) -> &Utf8Path {
        &self.app_root
    }
}

/// Fresh files are opened create-new: a file that appeared after planning
/// fails instead of being replaced.
fn open_target(path: &Utf8Path, overwrite: bool) -> io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use velo_core::{Config, GenerationFlags, TemplateId};

    use super::*;
    use crate::planner::GenerationPlanner;

    fn setup() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.layout.project_root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(config.layout.app_root()).unwrap();
        (dir, config)
    }

    fn plan(config: &Config, force: bool, dry_run: bool) -> GenerationPlan {
        GenerationPlanner::new(config)
            .plan("orders", GenerationFlags { dry_run, force })
            .unwrap()
    }

    #[test]
    fn test_writes_every_artifact() {
        let (_dir, config) = setup();
        let writer = ArtifactWriter::new(config.layout.app_root());
        let plan = plan(&config, false, false);

        let report = writer.write(&plan);
        assert_eq!(report.results.len(), 6);
        assert_eq!(report.count(WriteStatus::Written), 6);

        for artifact in plan.iter() {
            let on_disk = fs::read_to_string(writer.app_root().join(&artifact.spec.relative_path)).unwrap();
            assert_eq!(on_disk, artifact.spec.content);
        }
    }

    #[test]
    fn test_second_run_is_unchanged() {
        let (_dir, config) = setup();
        let writer = ArtifactWriter::new(config.layout.app_root());
        writer.write(&plan(&config, false, false));

        let report = writer.write(&plan(&config, false, false));
        assert_eq!(report.count(WriteStatus::Skipped(SkipReason::Unchanged)), 6);
        assert_eq!(report.files_touched(), 0);
    }

    #[test]
    fn test_conflict_is_preserved_without_force() {
        let (_dir, config) = setup();
        let writer = ArtifactWriter::new(config.layout.app_root());
        let router = config.layout.router_path("orders");
        fs::create_dir_all(router.parent().unwrap()).unwrap();
        fs::write(&router, "# mine\n").unwrap();

        let report = writer.write(&plan(&config, false, false));
        assert_eq!(report.count(WriteStatus::Skipped(SkipReason::Conflict)), 1);
        assert_eq!(report.count(WriteStatus::Written), 5);
        assert!(!report.has_failures());
        assert_eq!(fs::read_to_string(&router).unwrap(), "# mine\n");
    }

    #[test]
    fn test_force_overwrites_conflict() {
        let (_dir, config) = setup();
        let writer = ArtifactWriter::new(config.layout.app_root());
        let router = config.layout.router_path("orders");
        fs::create_dir_all(router.parent().unwrap()).unwrap();
        fs::write(&router, "# mine\n").unwrap();

        let plan = plan(&config, true, false);
        let report = writer.write(&plan);
        assert_eq!(report.count(WriteStatus::Overwritten), 1);
        assert_eq!(
            fs::read_to_string(&router).unwrap(),
            plan.get(TemplateId::Router).unwrap().spec.content
        );
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_dir, config) = setup();
        let writer = ArtifactWriter::new(config.layout.app_root());

        let report = writer.write(&plan(&config, false, true));
        assert_eq!(report.count(WriteStatus::Skipped(SkipReason::DryRun)), 6);
        assert!(!config.layout.modules_root().exists());
        assert!(!config.layout.app_root().join("models").exists());
    }

    #[test]
    fn test_file_created_after_planning_fails() {
        let (_dir, config) = setup();
        let writer = ArtifactWriter::new(config.layout.app_root());
        let plan = plan(&config, false, false);

        let router = config.layout.router_path("orders");
        fs::create_dir_all(router.parent().unwrap()).unwrap();
        fs::write(&router, "# raced\n").unwrap();

        let report = writer.write(&plan);
        assert_eq!(report.results.len(), 6);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.count(WriteStatus::Written), 5);
        assert_eq!(fs::read_to_string(&router).unwrap(), "# raced\n");

        let failure = report.failures().next().unwrap();
        assert_eq!(failure.template, TemplateId::Router);
        assert!(failure.error.is_some());
    }

    #[test]
    fn test_failure_does_not_stop_remaining_writes() {
        let (_dir, config) = setup();
        let writer = ArtifactWriter::new(config.layout.app_root());
        let plan = plan(&config, false, false);

        // A file where the models directory should be.
        fs::write(config.layout.app_root().join("models"), "blocker").unwrap();

        let report = writer.write(&plan);
        assert_eq!(report.results.len(), 6);
        assert_eq!(report.count(WriteStatus::Written), 5);
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.template, TemplateId::Model);
    }
}
