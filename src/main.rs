//! winsetup - Main entry point
//!
//! Parses the command line, loads configuration, sets up logging and
//! dispatches to the session runner or one of the catalog utilities.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use winsetup::catalog::{Catalog, CatalogEntry, check_catalog};
use winsetup::cli::{Cli, Commands, RunArgs};
use winsetup::report::{ConsoleReporter, SessionReport};
use winsetup::session::{Mode, Services, Session};
use winsetup::{
    BloatwareCatalog, CatalogKind, CommandRunner, SetupConfig, SoftwareCatalog, TweaksCatalog,
    load_catalog, sanity,
};

/// Exit status when the session finished but some entries failed
const EXIT_ENTRY_FAILURES: i32 = 2;
/// Exit status after Ctrl+C
const EXIT_INTERRUPTED: i32 = 130;

/// Console on stderr, plus a plain-text session log file when `log_dir` is
/// given.
///
/// Returns the log file path, or `None` if no file was created.
fn init_logging(log_dir: Option<&Path>) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let log_path = log_dir.map(|dir| dir.join(format!("winsetup-{}.log", stamp)));
    let log_file = match (log_dir, &log_path) {
        (Some(dir), Some(path)) => fs::create_dir_all(dir).and_then(|_| File::create(path)).ok(),
        _ => None,
    };
    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
    });
    let opened = file_layer.is_some();

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    if opened {
        return log_path;
    }
    if let Some(dir) = log_dir {
        warn!("Could not create log file in {}; logging to console only", dir.display());
    }
    None
}

/// Configuration file values with command-line overrides applied
fn load_config(cli: &Cli) -> Result<SetupConfig> {
    let mut config = match &cli.config {
        Some(path) => SetupConfig::load_from_file(path)?,
        None => SetupConfig::default(),
    };
    if let Some(dir) = &cli.catalog_dir {
        config.catalog_dir = dir.clone();
    }
    if let Some(Commands::Auto {
        no_restore_point: true,
        ..
    }) = &cli.command
    {
        config.create_restore_point = false;
    }
    if let Some(args) = run_args(cli) {
        if args.no_restore_point {
            config.create_restore_point = false;
        }
    }
    config.validate()?;
    Ok(config)
}

fn run_args(cli: &Cli) -> Option<&RunArgs> {
    match &cli.command {
        Some(Commands::Software(args) | Commands::Tweaks(args) | Commands::Bloatware(args)) => Some(args),
        _ => None,
    }
}

/// Main application entry point
fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            std::process::exit(1);
        }
    };

    let log_dir = cli.changes_system().then_some(config.log_dir.as_path());
    let log_path = init_logging(log_dir);
    info!("winsetup {} starting up", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &log_path {
        info!("Session log: {}", path.display());
    }
    if cli.dry_run {
        info!("Dry-run mode: no changes will be made");
    }

    if let Err(e) = ctrlc::set_handler(|| {
        warn!("Interrupted; changes made so far are kept");
        std::process::exit(EXIT_INTERRUPTED);
    }) {
        warn!("Failed to install Ctrl+C handler: {}", e);
    }

    let runner = CommandRunner::new(cli.dry_run);

    match &cli.command {
        Some(Commands::InitConfig { path }) => {
            SetupConfig::default()
                .save_to_file(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Default configuration written to {}", path.display());
        }
        Some(Commands::Validate { kind, path }) => validate_catalog(*kind, path),
        Some(Commands::List { kind }) => list_catalog(*kind, &config),
        Some(Commands::RestorePoint { description }) => {
            preflight(&runner, cli.skip_preflight);
            let mut session = Session::new(config, Services::windows(runner), cli.dry_run);
            if !session.create_restore_point(description) {
                std::process::exit(1);
            }
        }
        Some(Commands::Auto { report, .. }) => {
            preflight(&runner, cli.skip_preflight);
            let mut session = Session::new(config, Services::windows(runner), cli.dry_run);
            let mut reporter = ConsoleReporter::stdout();
            let result = session.run_auto(&mut reporter);
            finish(&result, report.as_deref())?;
        }
        Some(Commands::Software(args)) => run_one(CatalogKind::Software, args, &cli, config, runner)?,
        Some(Commands::Tweaks(args)) => run_one(CatalogKind::Tweaks, args, &cli, config, runner)?,
        Some(Commands::Bloatware(args)) => run_one(CatalogKind::Bloatware, args, &cli, config, runner)?,
        None => {
            info!("No command specified, starting interactive mode");
            preflight(&runner, cli.skip_preflight);
            let mut session = Session::new(config, Services::windows(runner), cli.dry_run);
            let mut reporter = ConsoleReporter::stdout();
            let result = session.run(
                &[CatalogKind::Software, CatalogKind::Tweaks, CatalogKind::Bloatware],
                &Mode::Interactive,
                &mut reporter,
            );
            finish(&result, None)?;
        }
    }

    Ok(())
}

/// Exit 1 when the environment is unusable
fn preflight(runner: &CommandRunner, skip: bool) {
    if let Err(e) = sanity::run_preflight_checks(runner, skip) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run_one(kind: CatalogKind, args: &RunArgs, cli: &Cli, config: SetupConfig, runner: CommandRunner) -> Result<()> {
    preflight(&runner, cli.skip_preflight);

    let mode = if args.interactive {
        Mode::Interactive
    } else if !args.select.is_empty() {
        Mode::Named(args.select.clone())
    } else {
        Mode::Recommended
    };
    debug!("Running {} in {:?} mode", kind, mode);

    let mut session = Session::new(config, Services::windows(runner), cli.dry_run);
    let mut reporter = ConsoleReporter::stdout();
    let result = session.run(&[kind], &mode, &mut reporter);
    finish(&result, args.report.as_deref())
}

/// Print the session total, write the report, set the exit status
fn finish(result: &SessionReport, report_path: Option<&Path>) -> Result<()> {
    let ran = [CatalogKind::Software, CatalogKind::Tweaks, CatalogKind::Bloatware]
        .into_iter()
        .filter(|kind| result.get(*kind).is_some())
        .count();
    if ran > 1 {
        println!();
        println!("=== Session total ===");
        print!("{}", result.total);
    }

    if let Some(path) = report_path {
        result
            .save(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    if result.has_failures() {
        std::process::exit(EXIT_ENTRY_FAILURES);
    }
    Ok(())
}

fn validate_catalog(kind: CatalogKind, path: &Path) {
    match check_catalog(kind, path) {
        Ok((categories, entries)) => {
            println!(
                "✓ {} catalog is valid: {} categories, {} entries",
                kind, categories, entries
            );
        }
        Err(e) => {
            error!("Catalog validation failed: {}", e);
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn list_catalog(kind: CatalogKind, config: &SetupConfig) {
    let path = config.catalog_path(kind.file_name());
    let printed = match kind {
        CatalogKind::Software => load_catalog::<SoftwareCatalog>(&path).map(|c| print_catalog(&c)),
        CatalogKind::Tweaks => load_catalog::<TweaksCatalog>(&path).map(|c| print_catalog(&c)),
        CatalogKind::Bloatware => load_catalog::<BloatwareCatalog>(&path).map(|c| print_catalog(&c)),
    };
    if printed.is_none() {
        std::process::exit(1);
    }
}

fn print_catalog<C: Catalog>(catalog: &C) {
    for group in catalog.groups() {
        println!("{}", group.name);
        for entry in group.entries {
            let mark = if entry.recommended() { "*" } else { " " };
            println!("  {} {} ({})", mark, entry.name(), entry.id());
        }
    }
    println!();
    println!(
        "{} categories, {} entries (* = recommended)",
        catalog.category_count(),
        catalog.entry_count()
    );
}
