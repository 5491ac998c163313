//! Session orchestration
//!
//! Wires catalogs, selection, actions and the batch executor together for
//! one run over one or more subsystems.
//!
//! # Failure Policy
//!
//! Nothing here is fatal. A catalog that cannot be loaded skips its
//! subsystem (`None` slot in the report), a failed restore point is a
//! warning, and per-entry failures are already contained by the executor.

use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};

use crate::actions::bloatware::{EnvLookup, process_env};
use crate::actions::{BloatwareRemover, RegistryBackup, SoftwareInstaller, TweakApplier, is_protected};
use crate::catalog::{BloatwareCatalog, BloatwareItem, Catalog, CatalogEntry, SoftwareCatalog, TweaksCatalog, load_catalog};
use crate::config::SetupConfig;
use crate::executor::{BatchExecutor, Reporter};
use crate::menu;
use crate::outcome::OperationResult;
use crate::report::SessionReport;
use crate::retry::{Sleeper, ThreadSleeper};
use crate::runner::CommandRunner;
use crate::selection::{Selection, filter, resolve_names};
use crate::system::{AppxPowerShell, AppxStore, PackageManager, Registry, SystemShell, Winget, WindowsRegistry, WindowsShell};
use crate::types::CatalogKind;

/// Description used for the restore point taken before changes
pub const RESTORE_POINT_DESCRIPTION: &str = "winsetup: before workstation setup";

/// How entries are chosen for each subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Entries flagged `recommended`
    Recommended,
    /// Entries matching these names or ids
    Named(Vec<String>),
    /// Line-based menu on stdin/stdout
    Interactive,
}

/// The machine-facing collaborators of a session
pub struct Services {
    pub packages: Box<dyn PackageManager>,
    pub appx: Box<dyn AppxStore>,
    pub registry: Box<dyn Registry>,
    pub shell: Box<dyn SystemShell>,
    pub sleeper: Box<dyn Sleeper>,
    pub env: Box<EnvLookup>,
}

impl Services {
    /// Production collaborators sharing one command runner
    pub fn windows(runner: CommandRunner) -> Self {
        Self {
            packages: Box::new(Winget::new(runner)),
            appx: Box::new(AppxPowerShell::new(runner)),
            registry: Box::new(WindowsRegistry::new(runner)),
            shell: Box::new(WindowsShell::new(runner)),
            sleeper: Box::new(ThreadSleeper),
            env: Box::new(process_env),
        }
    }
}

pub struct Session {
    config: SetupConfig,
    services: Services,
    backup: RegistryBackup,
    dry_run: bool,
}

impl Session {
    pub fn new(config: SetupConfig, services: Services, dry_run: bool) -> Self {
        let backup = RegistryBackup::new(config.backup_dir.clone());
        Self {
            config,
            services,
            backup,
            dry_run,
        }
    }

    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    /// Take a system restore point. Failure is logged, never fatal.
    pub fn create_restore_point(&mut self, description: &str) -> bool {
        info!("Creating system restore point: {}", description);
        match self.services.shell.create_restore_point(description) {
            Ok(true) => {
                info!("Restore point created");
                true
            }
            Ok(false) => {
                warn!("Restore point could not be created; continuing without one");
                false
            }
            Err(e) => {
                warn!("Restore point could not be created: {:#}; continuing", e);
                false
            }
        }
    }

    /// Run the given subsystems in order and collect their results.
    ///
    /// A restore point is taken first when the configuration asks for one.
    pub fn run(&mut self, kinds: &[CatalogKind], mode: &Mode, reporter: &mut dyn Reporter) -> SessionReport {
        let mut report = SessionReport::new(self.dry_run);
        if kinds.is_empty() {
            return report;
        }

        if self.config.create_restore_point {
            self.create_restore_point(RESTORE_POINT_DESCRIPTION);
        }

        for &kind in kinds {
            if let Some(result) = self.run_kind(kind, mode, reporter) {
                report.record(kind, result);
            }
        }

        if kinds.len() > 1 {
            info!(
                "Session finished: {} succeeded, {} failed, {} skipped",
                report.total.success.len(),
                report.total.failed.len(),
                report.total.skipped.len()
            );
        }
        report
    }

    /// Recommended entries of every subsystem: software, tweaks, bloatware
    pub fn run_auto(&mut self, reporter: &mut dyn Reporter) -> SessionReport {
        self.run(
            &[CatalogKind::Software, CatalogKind::Tweaks, CatalogKind::Bloatware],
            &Mode::Recommended,
            reporter,
        )
    }

    /// Run one subsystem. `None` when it did not run.
    pub fn run_kind(&mut self, kind: CatalogKind, mode: &Mode, reporter: &mut dyn Reporter) -> Option<OperationResult> {
        match kind {
            CatalogKind::Software => self.run_software(mode, reporter),
            CatalogKind::Tweaks => self.run_tweaks(mode, reporter),
            CatalogKind::Bloatware => self.run_bloatware(mode, reporter),
        }
    }

    pub fn run_software(&mut self, mode: &Mode, reporter: &mut dyn Reporter) -> Option<OperationResult> {
        let catalog: SoftwareCatalog = self.load()?;
        let entries = choose(&catalog, mode)?;

        let mut installer = SoftwareInstaller::new(
            &mut *self.services.packages,
            &mut *self.services.shell,
            &*self.services.sleeper,
            self.config.retry_policy(),
        )
        .with_locale(self.config.locale.clone());

        Some(BatchExecutor::new(CatalogKind::Software, reporter).run(
            &entries,
            |entry| installer.install(entry),
            None,
        ))
    }

    pub fn run_tweaks(&mut self, mode: &Mode, reporter: &mut dyn Reporter) -> Option<OperationResult> {
        let catalog: TweaksCatalog = self.load()?;
        let entries = choose(&catalog, mode)?;

        let mut applier = TweakApplier::new(
            &mut *self.services.registry,
            &mut *self.services.shell,
            &mut self.backup,
        );

        let result = BatchExecutor::new(CatalogKind::Tweaks, reporter).run(
            &entries,
            |tweak| applier.apply(tweak),
            None,
        );
        if let Some(dir) = self.backup.dir() {
            info!("Registry backups in {}", dir.display());
        }
        Some(result)
    }

    pub fn run_bloatware(&mut self, mode: &Mode, reporter: &mut dyn Reporter) -> Option<OperationResult> {
        let catalog: BloatwareCatalog = self.load()?;
        let entries = choose(&catalog, mode)?;

        let mut remover = BloatwareRemover::new(
            &mut *self.services.appx,
            &mut *self.services.packages,
            &mut *self.services.shell,
        )
        .with_env(&*self.services.env);

        let protected = &catalog.protected;
        let guard = |item: &BloatwareItem| is_protected(item.id(), protected);

        Some(BatchExecutor::new(CatalogKind::Bloatware, reporter).run(
            &entries,
            |item| remover.remove(item),
            Some(&guard),
        ))
    }

    fn load<C: Catalog>(&self) -> Option<C> {
        load_catalog(&self.config.catalog_path(C::KIND.file_name()))
    }
}

/// Resolve `mode` into the ordered entry list. `None` when the user
/// cancelled the menu or it could not be shown.
fn choose<'a, C: Catalog>(catalog: &'a C, mode: &Mode) -> Option<Vec<&'a C::Entry>> {
    let selection = match mode {
        Mode::Recommended => Selection::RecommendedOnly,
        Mode::Named(names) => {
            let (matched, unknown) = resolve_names(catalog, names);
            for name in &unknown {
                warn!("'{}' is not in the {} catalog", name, C::KIND);
            }
            Selection::Explicit(matched)
        }
        Mode::Interactive => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            match pick_interactive(catalog, &mut stdin.lock(), &mut stdout) {
                Some(chosen) => Selection::Explicit(chosen),
                None => return None,
            }
        }
    };
    Some(filter(catalog, &selection))
}

fn pick_interactive<'a, C: Catalog, R: BufRead, W: Write>(
    catalog: &'a C,
    input: &mut R,
    output: &mut W,
) -> Option<Vec<&'a C::Entry>> {
    match menu::pick(catalog, input, output) {
        Ok(Some(chosen)) => Some(chosen),
        Ok(None) => {
            info!("{} selection cancelled", C::KIND);
            None
        }
        Err(e) => {
            error!("{} menu failed: {}", C::KIND, e);
            None
        }
    }
}
