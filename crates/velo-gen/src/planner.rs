//! Generation planning.
//!
//! The planner renders every artifact and classifies it against the
//! filesystem. It never writes.
//!
//! | On disk | `force` | Classification |
//! |---------|---------|----------------|
//! | absent | any | `Create { overwrite: false }` |
//! | identical bytes | any | `Skip` |
//! | different bytes | `false` | `Conflict` |
//! | different bytes | `true` | `Create { overwrite: true }` |

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use smallvec::SmallVec;
use velo_core::{
    ArtifactSpec, Classification, Config, GenerationFlags, GenerationPlan, NameSet,
    NameTransformer, PlannedArtifact, ProjectLayout, TemplateId,
};

use crate::error::GenerateError;
use crate::templates::TemplateRenderer;

/// Turns a module name into a classified [`GenerationPlan`].
#[derive(Debug, Clone)]
pub struct GenerationPlanner {
    layout: ProjectLayout,
    transformer: NameTransformer,
    renderer: TemplateRenderer,
}

impl GenerationPlanner {
    /// Creates a planner from the full configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            layout: config.layout.clone(),
            transformer: NameTransformer::new(&config.naming),
            renderer: TemplateRenderer::new(&config.layout),
        }
    }

    /// Plans the artifacts for `raw`.
    ///
    /// The name is validated before the filesystem is touched. The plan is
    /// all-or-nothing: any I/O failure while classifying aborts it.
    ///
    /// # Errors
    ///
    /// - [`GenerateError::InvalidName`] if `raw` is not a valid module name
    /// - [`GenerateError::PlanningIo`] if an existence check fails for a
    ///   reason other than "not found"
    /// - [`GenerateError::Render`] if a template fails to render
    pub fn plan(&self, raw: &str, flags: GenerationFlags) -> Result<GenerationPlan, GenerateError> {
        let names = self.transformer.transform(raw)?;
        let app_root = self.layout.app_root();

        let mut artifacts: SmallVec<[PlannedArtifact; 6]> = SmallVec::new();
        for template in TemplateId::ALL {
            let spec = ArtifactSpec {
                template,
                relative_path: self.artifact_path(template, &names),
                content: self.renderer.render(template, &names)?,
            };
            let classification = classify(&app_root.join(&spec.relative_path), &spec.content, flags.force)?;

            tracing::debug!(
                %template,
                path = %spec.relative_path,
                action = classification.label(),
                "classified artifact"
            );
            artifacts.push(PlannedArtifact {
                spec,
                classification,
            });
        }

        let plan = GenerationPlan {
            names,
            flags,
            artifacts,
        };

        tracing::info!(
            module = %plan.names.snake,
            artifacts = plan.len(),
            pending = plan.pending_writes(),
            conflicts = plan.conflicts().count(),
            dry_run = flags.dry_run,
            "planned module"
        );

        Ok(plan)
    }

    /// Path of `template`'s artifact, relative to the application root.
    #[must_use]
    pub fn artifact_path(&self, template: TemplateId, names: &NameSet) -> Utf8PathBuf {
        match template.module_file_stem() {
            Some(stem) => self.layout.module_artifact(&names.snake, stem),
            None => self.layout.model_artifact(&names.snake),
        }
    }

    /// The layout this planner targets.
    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }
}

/// Classifies one artifact against what is on disk at `path`.
///
/// # Errors
///
/// Returns [`GenerateError::PlanningIo`] if `path` cannot be read for any
/// reason other than not existing.
pub fn classify(path: &Utf8Path, content: &str, force: bool) -> Result<Classification, GenerateError> {
    match fs::read(path) {
        Ok(existing) if existing == content.as_bytes() => Ok(Classification::Skip),
        Ok(_) if force => Ok(Classification::Create { overwrite: true }),
        Ok(_) => Ok(Classification::Conflict),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Ok(Classification::Create { overwrite: false })
        }
        Err(err) => Err(GenerateError::planning_io(path, err)),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.layout.project_root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(config.layout.app_root()).unwrap();
        (dir, config)
    }

    fn flags(dry_run: bool, force: bool) -> GenerationFlags {
        GenerationFlags { dry_run, force }
    }

    #[test]
    fn test_plan_is_complete_and_ordered() {
        let (_dir, config) = setup();
        let plan = GenerationPlanner::new(&config)
            .plan("orders", GenerationFlags::default())
            .unwrap();

        let paths: Vec<_> = plan
            .iter()
            .map(|a| a.spec.relative_path.as_str())
            .collect();
        assert_eq!(
            paths,
            [
                "modules/orders/__init__.py",
                "modules/orders/schemas.py",
                "modules/orders/repository.py",
                "modules/orders/use_case.py",
                "modules/orders/router.py",
                "models/orders_model.py",
            ]
        );
        assert!(plan.iter().all(|a| !a.spec.content.is_empty()));
        assert!(
            plan.iter()
                .all(|a| a.classification == Classification::Create { overwrite: false })
        );
    }

    #[test]
    fn test_invalid_name_aborts_before_filesystem() {
        let mut config = Config::default();
        config.layout.project_root = Utf8PathBuf::from("/nonexistent/project");
        let err = GenerationPlanner::new(&config)
            .plan("bad name", GenerationFlags::default())
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidName(_)));
    }

    #[test]
    fn test_classification_rules() {
        let (dir, _config) = setup();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("file.py")).unwrap();

        assert_eq!(
            classify(&path, "x = 1\n", false).unwrap(),
            Classification::Create { overwrite: false }
        );

        fs::write(&path, "x = 1\n").unwrap();
        assert_eq!(classify(&path, "x = 1\n", false).unwrap(), Classification::Skip);
        assert_eq!(classify(&path, "x = 1\n", true).unwrap(), Classification::Skip);

        assert_eq!(classify(&path, "x = 2\n", false).unwrap(), Classification::Conflict);
        assert_eq!(
            classify(&path, "x = 2\n", true).unwrap(),
            Classification::Create { overwrite: true }
        );
    }

    #[test]
    fn test_conflict_policy() {
        let (_dir, config) = setup();
        let planner = GenerationPlanner::new(&config);
        let router = config.layout.modules_root().join("orders").join("router.py");
        fs::create_dir_all(router.parent().unwrap()).unwrap();
        fs::write(&router, "# hand edited\n").unwrap();

        let plan = planner.plan("orders", flags(false, false)).unwrap();
        let conflict = plan.get(TemplateId::Router).unwrap();
        assert_eq!(conflict.classification, Classification::Conflict);
        assert!(conflict.spec.content.contains("APIRouter"));
        assert_eq!(plan.conflicts().count(), 1);

        let forced = planner.plan("orders", flags(false, true)).unwrap();
        assert_eq!(
            forced.get(TemplateId::Router).unwrap().classification,
            Classification::Create { overwrite: true }
        );
    }

    #[test]
    fn test_dry_run_matches_real_plan() {
        let (_dir, config) = setup();
        let planner = GenerationPlanner::new(&config);

        let dry = planner.plan("orders", flags(true, false)).unwrap();
        let real = planner.plan("orders", flags(false, false)).unwrap();

        let classes = |plan: &GenerationPlan| -> Vec<Classification> {
            plan.iter().map(|a| a.classification).collect()
        };
        assert_eq!(classes(&dry), classes(&real));
        assert!(!config.layout.modules_root().join("orders").exists());
    }

    #[test]
    fn test_repeated_dry_runs_are_idempotent() {
        let (_dir, config) = setup();
        let router = config.layout.router_path("orders");
        fs::create_dir_all(router.parent().unwrap()).unwrap();
        fs::write(&router, "# hand edited\n").unwrap();

        let generator = crate::Generator::new(&config);
        let first = generator.generate("orders", flags(true, false)).unwrap();
        assert!(first.report().is_none());

        let expected: Vec<_> = first.plan().iter().map(|a| a.classification).collect();
        assert_eq!(expected.iter().filter(|c| c.is_conflict()).count(), 1);
        assert_eq!(
            first.plan().get(TemplateId::Router).unwrap().classification,
            Classification::Conflict
        );

        for _ in 0..5 {
            let again = generator.generate("orders", flags(true, false)).unwrap();
            let classes: Vec<_> = again.plan().iter().map(|a| a.classification).collect();
            assert_eq!(classes, expected);
            assert_eq!(again.plan(), first.plan());
        }

        assert_eq!(fs::read_to_string(&router).unwrap(), "# hand edited\n");
        let module_dir = router.parent().unwrap();
        assert_eq!(fs::read_dir(module_dir).unwrap().count(), 1);
        assert!(!config.layout.app_root().join("models").exists());
    }

    #[test]
    fn test_unreadable_path_aborts_plan() {
        let (_dir, config) = setup();
        // A file where the module directory should be.
        let modules = config.layout.modules_root();
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join("orders"), "not a directory").unwrap();

        let err = GenerationPlanner::new(&config)
            .plan("orders", GenerationFlags::default())
            .unwrap_err();
        assert!(matches!(err, GenerateError::PlanningIo { .. }), "{err:?}");
    }

    #[test]
    fn test_camel_case_token_uses_snake_paths() {
        let (_dir, config) = setup();
        let plan = GenerationPlanner::new(&config)
            .plan("UserProfile", GenerationFlags::default())
            .unwrap();
        assert_eq!(
            plan.get(TemplateId::Model).unwrap().spec.relative_path,
            Utf8PathBuf::from("models/user_profile_model.py")
        );
        assert_eq!(plan.names.type_name, "UserProfile");
    }
}
