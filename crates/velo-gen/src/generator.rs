//! The generation facade tying planner and writer together.

use velo_core::{
    Config, GenerationFlags, GenerationPlan, ModuleToken, NameSet, WriteReport, types::join_route,
};

use crate::error::GenerateError;
use crate::planner::GenerationPlanner;
use crate::writer::ArtifactWriter;

/// What a generation request produced.
#[derive(Debug, Clone)]
pub enum GenerateOutcome {
    /// Dry run: the plan was computed and nothing was written.
    Preview(GenerationPlan),

    /// The plan was executed.
    Applied {
        /// The executed plan.
        plan: GenerationPlan,
        /// One result per planned artifact.
        report: WriteReport,
    },
}

impl GenerateOutcome {
    /// The plan behind this outcome.
    #[must_use]
    pub fn plan(&self) -> &GenerationPlan {
        match self {
            Self::Preview(plan) | Self::Applied { plan, .. } => plan,
        }
    }

    /// The write report, unless this was a dry run.
    #[must_use]
    pub fn report(&self) -> Option<&WriteReport> {
        match self {
            Self::Preview(_) => None,
            Self::Applied { report, .. } => Some(report),
        }
    }

    /// Returns `true` if any artifact failed to write.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.report().is_some_and(WriteReport::has_failures)
    }
}

/// Plans and writes modules for one project.
///
/// # Examples
///
/// ```no_run
/// use velo_core::{Config, GenerationFlags};
/// use velo_gen::Generator;
///
/// let config = Config::default();
/// let outcome = Generator::new(&config).generate("invoices", GenerationFlags::default())?;
///
/// for line in velo_gen::next_steps(&config, &outcome.plan().names) {
///     println!("{line}");
/// }
/// # Ok::<(), velo_gen::GenerateError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    config: Config,
    planner: GenerationPlanner,
}

impl Generator {
    /// Creates a generator for `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            planner: GenerationPlanner::new(config),
        }
    }

    /// Plans `raw` and, unless `flags.dry_run` is set, writes the plan.
    ///
    /// # Errors
    ///
    /// - [`GenerateError::InvalidName`] before anything else is checked
    /// - [`GenerateError::Config`] if the application directory is missing
    /// - Any planning error from [`GenerationPlanner::plan`]
    pub fn generate(
        &self,
        raw: &str,
        flags: GenerationFlags,
    ) -> Result<GenerateOutcome, GenerateError> {
        ModuleToken::parse(raw)?;
        let app_root = self.config.layout.require_app_root()?;

        let plan = self.planner.plan(raw, flags)?;
        if flags.dry_run {
            return Ok(GenerateOutcome::Preview(plan));
        }

        let report = ArtifactWriter::new(app_root).write(&plan);
        Ok(GenerateOutcome::Applied { plan, report })
    }

    /// The planner used by this generator.
    #[must_use]
    pub fn planner(&self) -> &GenerationPlanner {
        &self.planner
    }
}

/// Follow-up instructions printed after a module is generated.
#[must_use]
pub fn next_steps(config: &Config, names: &NameSet) -> Vec<String> {
    let layout = &config.layout;
    let mounted_at = join_route(&config.discovery.api_prefix, &names.route_prefix);

    vec![
        format!(
            "Register {} in {}/infrastructure/database.py so Beanie initializes it",
            names.type_name, layout.app_dir
        ),
        format!(
            "Add model fields in {}",
            layout.app_root().join(layout.model_artifact(&names.snake))
        ),
        format!(
            "Adjust schemas, repository and use case under {}",
            layout.modules_root().join(&names.snake)
        ),
        format!("The router is mounted at {mounted_at} on the next application start"),
    ]
}
