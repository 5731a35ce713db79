//! CLI entry point for velo.
//!
//! This binary scaffolds feature modules into a FastAPI/Beanie project and
//! inspects the routes the application will auto-mount from them.
//!
//! # Usage
//!
//! ```bash
//! velo [OPTIONS] <COMMAND>
//!
//! # Generate a module (five module files plus the document model)
//! velo generate invoices
//!
//! # Preview what would be written, as JSON
//! velo generate invoices --dry-run --json
//!
//! # List generated modules
//! velo list --path /path/to/project
//!
//! # Show the mount table discovery would produce
//! velo routes
//!
//! # Run the development server after a discovery preflight
//! velo dev -- --port 9000
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::process::{ExitCode, ExitStatus};

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use velo_core::{Config, GenerationFlags, GenerationPlan, NameSet, WriteReport};
use velo_gen::{GenerateOutcome, Generator, next_steps};
use velo_scanner::{
    DiscoveryReport, ModuleRegistry, MountedRoute, RouteDiscovery, RouteTable, ShadowedRoute,
};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Module generator and route inspector for FastAPI/Beanie projects.
///
/// Generated modules are picked up by the application's route
/// auto-discovery; nothing needs to be registered by hand.
#[derive(Parser)]
#[command(name = "velo", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Project root containing the application package.
    #[arg(short, long, global = true, env = "VELO_PROJECT_ROOT", default_value = ".")]
    path: Utf8PathBuf,

    /// Configuration file.
    ///
    /// Defaults to `<path>/velo.json` when that file exists.
    #[arg(short, long, global = true, env = "VELO_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Generate a feature module and its document model.
    Generate {
        /// Module name, e.g. `invoices` or `user_profiles`.
        name: String,

        /// Replace existing files whose content differs.
        #[arg(long)]
        overwrite: bool,

        /// Show what would be written without touching the filesystem.
        #[arg(long)]
        dry_run: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List generated modules.
    List {
        /// Print the module names as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show every route the application would mount.
    Routes {
        /// Print the mount table as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run the development server after checking every module loads.
    Dev {
        /// Extra arguments passed to the server command.
        #[arg(last = true)]
        args: Vec<String>,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from CLI arguments.
///
/// An explicit `--config` file is loaded as is; otherwise `velo.json` in the
/// project root is used when present. The project root always comes from
/// `--path`.
///
/// # Errors
///
/// Returns an error if the project root is not a directory or the
/// configuration cannot be loaded or is invalid.
fn build_config(path: &Utf8Path, config_file: Option<&Utf8Path>) -> color_eyre::Result<Config> {
    if !path.exists() {
        return Err(eyre!("Path does not exist: {path}"));
    }
    if !path.is_dir() {
        return Err(eyre!("Path is not a directory: {path}"));
    }

    let config = match config_file {
        Some(file) => {
            let mut config =
                Config::load(file).map_err(|e| eyre!("Failed to load {file}: {e}"))?;
            config.layout.project_root = path.to_owned();
            config
        }
        None => Config::discover(path)?,
    };

    config.validate()?;
    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Generates (or previews) one module.
///
/// Skipped conflicts succeed; any failed artifact makes the command fail
/// after the full report is printed.
fn run_generate(
    config: &Config,
    name: &str,
    flags: GenerationFlags,
    json: bool,
) -> color_eyre::Result<()> {
    info!(module = name, dry_run = flags.dry_run, force = flags.force, "Generating module");

    let outcome = Generator::new(config).generate(name, flags)?;
    let steps = next_steps(config, &outcome.plan().names);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if json {
        writeln!(handle, "{}", generate_json(&outcome, &steps)?)?;
    } else {
        match &outcome {
            GenerateOutcome::Preview(plan) => print_preview(&mut handle, plan)?,
            GenerateOutcome::Applied { report, .. } => print_report(&mut handle, report)?,
        }
        print_next_steps(&mut handle, &steps)?;
    }

    if let Some(report) = outcome.report() {
        let failed = report.failures().count();
        if failed > 0 {
            return Err(eyre!(
                "{failed} of {} artifacts failed to write",
                report.results.len()
            ));
        }
    }

    Ok(())
}

/// Lists generated modules.
fn run_list(config: &Config, json: bool) -> color_eyre::Result<()> {
    let names = ModuleRegistry::new(&config.layout).list()?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if json {
        writeln!(handle, "{}", serde_json::to_string_pretty(&names)?)?;
    } else if names.is_empty() {
        writeln!(handle, "No modules under {}", config.layout.modules_root())?;
    } else {
        for name in &names {
            writeln!(handle, "{name}")?;
        }
    }

    Ok(())
}

/// Runs discovery into a [`RouteTable`].
fn discover_routes(config: &Config) -> color_eyre::Result<(RouteTable, DiscoveryReport)> {
    let mut table = RouteTable::new();
    let report = RouteDiscovery::new(config).discover(&mut table)?;
    Ok((table, report))
}

/// Prints the mount table, load failures and shadowed routes.
fn run_routes(config: &Config, json: bool) -> color_eyre::Result<()> {
    let (table, report) = discover_routes(config)?;
    let shadowed = table.shadowed();

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if json {
        writeln!(handle, "{}", routes_json(&table, &report, &shadowed)?)?;
    } else {
        print_routes(&mut handle, table.routes())?;
        print_shadowed(&mut handle, &shadowed)?;
        print_failures(&mut handle, &report)?;
    }

    Ok(())
}

/// Runs the configured development server.
///
/// Discovery runs first as a preflight and only reports; the server is
/// started even when some modules fail to load, since the application
/// skips them the same way.
async fn run_dev(config: &Config, extra: &[String]) -> color_eyre::Result<ExitCode> {
    match discover_routes(config) {
        Ok((table, report)) => {
            info!(
                modules = report.mounted.len(),
                routes = table.len(),
                "Discovery preflight"
            );
            for failure in &report.failures {
                warn!(%failure, "Module will not be mounted");
            }
        }
        Err(err) => warn!(error = %err, "Discovery preflight failed"),
    }

    let command_line = config.dev.command_line(&config.layout);
    let Some((program, args)) = command_line.split_first() else {
        return Err(eyre!("dev.command is empty"));
    };

    let root = &config.layout.project_root;
    let mut command = tokio::process::Command::new(program);
    command.args(args).args(extra).kill_on_drop(true);
    if !root.as_str().is_empty() {
        command.current_dir(root);
    }

    info!(program = %program, "Starting development server");
    let mut child = command
        .spawn()
        .map_err(|e| eyre!("Failed to start `{program}`: {e}"))?;

    let status = wait_for_child(&mut child).await?;
    info!(%status, "Development server exited");
    Ok(exit_code(status))
}

/// Waits for the server, forwarding termination requests.
///
/// Ctrl-C reaches the child through the terminal's process group, so only
/// SIGTERM has to be passed on explicitly.
#[cfg(unix)]
async fn wait_for_child(child: &mut tokio::process::Child) -> color_eyre::Result<ExitStatus> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;

    loop {
        tokio::select! {
            status = child.wait() => return Ok(status?),
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received Ctrl-C, waiting for the development server to stop");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, stopping the development server");
                child.start_kill()?;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_child(child: &mut tokio::process::Child) -> color_eyre::Result<ExitStatus> {
    Ok(child.wait().await?)
}

/// Maps a child exit status onto our own exit code.
fn exit_code(status: ExitStatus) -> ExitCode {
    status
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from)
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_preview(out: &mut impl Write, plan: &GenerationPlan) -> std::io::Result<()> {
    writeln!(out, "Dry run for module `{}`:", plan.names.snake)?;
    for artifact in plan.iter() {
        writeln!(
            out,
            "  {:<10} {}",
            artifact.classification.label(),
            artifact.spec.relative_path
        )?;
    }
    Ok(())
}

fn print_report(out: &mut impl Write, report: &WriteReport) -> std::io::Result<()> {
    for result in &report.results {
        match &result.error {
            Some(error) => writeln!(out, "  {:<18} {} ({error})", result.status.label(), result.path)?,
            None => writeln!(out, "  {:<18} {}", result.status.label(), result.path)?,
        }
    }
    Ok(())
}

fn print_next_steps(out: &mut impl Write, steps: &[String]) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Next steps:")?;
    for (i, step) in steps.iter().enumerate() {
        writeln!(out, "  {}. {step}", i + 1)?;
    }
    Ok(())
}

fn print_routes(out: &mut impl Write, routes: &[MountedRoute]) -> std::io::Result<()> {
    if routes.is_empty() {
        return writeln!(out, "No routes mounted");
    }
    for route in routes {
        writeln!(
            out,
            "{:<7} {:<40} {}::{}",
            route.method.as_str(),
            route.path,
            route.module,
            route.handler
        )?;
    }
    Ok(())
}

fn print_shadowed(out: &mut impl Write, shadowed: &[ShadowedRoute]) -> std::io::Result<()> {
    if shadowed.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Unreachable routes ({}):", shadowed.len())?;
    for entry in shadowed {
        writeln!(
            out,
            "  {} {} in {} is shadowed by {}::{}",
            entry.route.method,
            entry.route.path,
            entry.route.module,
            entry.shadowed_by.module,
            entry.shadowed_by.handler
        )?;
    }
    Ok(())
}

fn print_failures(out: &mut impl Write, report: &DiscoveryReport) -> std::io::Result<()> {
    if report.failures.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Modules not mounted ({}):", report.failures.len())?;
    for failure in &report.failures {
        writeln!(out, "  {failure}")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ArtifactLine<'a> {
    template: &'static str,
    path: &'a Utf8Path,
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Serializes a generation outcome.
///
/// `action` is the planned classification for a dry run and the write status
/// otherwise.
fn generate_json(outcome: &GenerateOutcome, steps: &[String]) -> color_eyre::Result<String> {
    #[derive(Serialize)]
    struct Output<'a> {
        names: &'a NameSet,
        dry_run: bool,
        artifacts: Vec<ArtifactLine<'a>>,
        next_steps: &'a [String],
    }

    let artifacts = match outcome {
        GenerateOutcome::Preview(plan) => plan
            .iter()
            .map(|artifact| ArtifactLine {
                template: artifact.spec.template.as_str(),
                path: &artifact.spec.relative_path,
                action: artifact.classification.label(),
                error: None,
            })
            .collect(),
        GenerateOutcome::Applied { report, .. } => report
            .results
            .iter()
            .map(|result| ArtifactLine {
                template: result.template.as_str(),
                path: &result.path,
                action: result.status.label(),
                error: result.error.as_deref(),
            })
            .collect(),
    };

    let output = Output {
        names: &outcome.plan().names,
        dry_run: outcome.report().is_none(),
        artifacts,
        next_steps: steps,
    };
    serde_json::to_string_pretty(&output)
        .map_err(|e| eyre!("Failed to serialize JSON: {}", e))
}

/// Serializes the mount table with failures and shadowed routes.
fn routes_json(
    table: &RouteTable,
    report: &DiscoveryReport,
    shadowed: &[ShadowedRoute],
) -> color_eyre::Result<String> {
    #[derive(Serialize)]
    struct Failure<'a> {
        module: &'a str,
        path: &'a Utf8Path,
        error: String,
    }

    #[derive(Serialize)]
    struct Output<'a> {
        modules_root: &'a Utf8Path,
        routes: &'a [MountedRoute],
        shadowed: &'a [ShadowedRoute],
        failures: Vec<Failure<'a>>,
    }

    let output = Output {
        modules_root: &report.modules_root,
        routes: table.routes(),
        shadowed,
        failures: report
            .failures
            .iter()
            .map(|failure| Failure {
                module: &failure.module.module_name,
                path: &failure.module.route_entry_path,
                error: failure.error.to_string(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
        .map_err(|e| eyre!("Failed to serialize JSON: {}", e))
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration
    let config = build_config(&cli.path, cli.config.as_deref())?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Generate {
            name,
            overwrite,
            dry_run,
            json,
        } => {
            let flags = GenerationFlags {
                dry_run: *dry_run,
                force: *overwrite,
            };
            run_generate(&config, name, flags, *json)?;
        }
        Commands::List { json } => run_list(&config, *json)?,
        Commands::Routes { json } => run_routes(&config, *json)?,
        Commands::Dev { args } => return run_dev(&config, args).await,
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::CommandFactory;
    use tempfile::TempDir;
    use velo_core::{GenerationFlags, WriteStatus};

    use super::*;

    fn project() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("api_app")).unwrap();
        (dir, root)
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::try_parse_from(["velo", "generate", "invoices", "--dry-run", "--overwrite"])
            .unwrap();
        assert_eq!(cli.path, Utf8PathBuf::from("."));
        let Commands::Generate {
            name,
            overwrite,
            dry_run,
            json,
        } = cli.command
        else {
            panic!("expected generate");
        };
        assert_eq!(name, "invoices");
        assert!(overwrite && dry_run && !json);
    }

    #[test]
    fn test_parse_dev_passthrough() {
        let cli = Cli::try_parse_from(["velo", "dev", "--", "--port", "9000"]).unwrap();
        let Commands::Dev { args } = cli.command else {
            panic!("expected dev");
        };
        assert_eq!(args, ["--port", "9000"]);
    }

    #[test]
    fn test_build_config_discovers_velo_json() {
        let (_dir, root) = project();
        fs::write(
            root.join("velo.json"),
            r#"{ "discovery": { "api_prefix": "/internal" } }"#,
        )
        .unwrap();

        let config = build_config(&root, None).unwrap();
        assert_eq!(config.discovery.api_prefix, "/internal");
        assert_eq!(config.layout.project_root, root);
        assert_eq!(config.layout.app_dir, "api_app");
    }

    #[test]
    fn test_build_config_explicit_file() {
        let (dir, root) = project();
        let file = Utf8PathBuf::from_path_buf(dir.path().join("custom.json")).unwrap();
        fs::write(&file, r#"{ "layout": { "app_dir": "service" } }"#).unwrap();

        let config = build_config(&root, Some(&file)).unwrap();
        assert_eq!(config.layout.app_dir, "service");
        assert_eq!(config.layout.project_root, root);
    }

    #[test]
    fn test_build_config_rejects_missing_root() {
        let (_dir, root) = project();
        assert!(build_config(&root.join("nope"), None).is_err());
    }

    #[test]
    fn test_build_config_rejects_invalid_options() {
        let (_dir, root) = project();
        fs::write(
            root.join("velo.json"),
            r#"{ "discovery": { "api_prefix": "api" } }"#,
        )
        .unwrap();
        assert!(build_config(&root, None).is_err());
    }

    #[test]
    fn test_report_lines() {
        let (_dir, root) = project();
        let config = build_config(&root, None).unwrap();
        let outcome = Generator::new(&config)
            .generate("invoices", GenerationFlags::default())
            .unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.count(WriteStatus::Written), 6);

        let mut out = Vec::new();
        print_report(&mut out, report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("created"));
        assert!(text.contains("modules/invoices/router.py"));
    }

    #[test]
    fn test_generate_json_preview() {
        let (_dir, root) = project();
        let config = build_config(&root, None).unwrap();
        let outcome = Generator::new(&config)
            .generate(
                "invoices",
                GenerationFlags {
                    dry_run: true,
                    force: false,
                },
            )
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&generate_json(&outcome, &[]).unwrap()).unwrap();
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["names"]["type_name"], "Invoice");
        assert_eq!(json["artifacts"].as_array().unwrap().len(), 6);
        assert_eq!(json["artifacts"][0]["action"], "create");
        assert!(!root.join("api_app/modules").exists());
    }

    #[test]
    fn test_routes_after_generate() {
        let (_dir, root) = project();
        let config = build_config(&root, None).unwrap();
        Generator::new(&config)
            .generate("invoices", GenerationFlags::default())
            .unwrap();

        let (table, report) = discover_routes(&config).unwrap();
        assert!(report.is_clean());
        assert_eq!(table.len(), 5);

        let mut out = Vec::new();
        print_routes(&mut out, table.routes()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("/api/v1/invoices/{entity_id}"));
        assert!(text.contains("invoices::get_invoice"));

        let json: serde_json::Value =
            serde_json::from_str(&routes_json(&table, &report, &table.shadowed()).unwrap())
                .unwrap();
        assert_eq!(json["routes"].as_array().unwrap().len(), 5);
        assert!(json["failures"].as_array().unwrap().is_empty());
    }
}
