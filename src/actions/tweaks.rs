//! Apply-tweak action.
//!
//! A tweak has up to two phases, each optional:
//!
//! - **registry**: every value is written even if an earlier one failed.
//!   Each key is exported to this session's backup directory once before
//!   its first write. Backups are best-effort and meant for manual restore.
//! - **commands** (`powerConfig`): run in order through `cmd /C`; a failing
//!   command marks the phase failed and the rest still run.
//!
//! The phase outcomes are folded with [`combine`].

use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::catalog::{RegistryValue, TweakEntry};
use crate::outcome::Outcome;
use crate::system::{Registry, SystemShell};
use crate::types::{RegistryData, RegistryPath};

/// Fold the registry and command phase outcomes of one tweak.
///
/// Any `Failed` wins, then any `Success`; with neither phase present the
/// tweak is `Skipped`.
pub fn combine(registry: Option<Outcome>, commands: Option<Outcome>) -> Outcome {
    let phases = [registry, commands];
    if phases.contains(&Some(Outcome::Failed)) {
        Outcome::Failed
    } else if phases.contains(&Some(Outcome::Success)) {
        Outcome::Success
    } else {
        Outcome::Skipped
    }
}

// ============================================================================
// Registry backup
// ============================================================================

/// Tracks which keys were already exported this session.
///
/// Every session writes into its own `<root>/<unix-seconds>` directory
/// (with a `-N` suffix if that name is taken), so a later run never
/// overwrites the pre-change exports of an earlier one. The directory is
/// claimed on the first backup.
#[derive(Debug)]
pub struct RegistryBackup {
    root: PathBuf,
    dir: Option<PathBuf>,
    exported: HashSet<String>,
}

impl RegistryBackup {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dir: None,
            exported: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// This session's backup directory, once claimed
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Keys attempted so far, successful or not
    pub fn exported_count(&self) -> usize {
        self.exported.len()
    }

    /// Export `path` unless it was already attempted. Never fails.
    pub fn backup(&mut self, registry: &mut dyn Registry, path: &RegistryPath) {
        if !self.exported.insert(path.to_string()) {
            return;
        }

        let dir = match &self.dir {
            Some(dir) => dir.clone(),
            None => match claim_session_dir(&self.root) {
                Ok(dir) => {
                    debug!("Registry backups for this session go to {}", dir.display());
                    self.dir = Some(dir.clone());
                    dir
                }
                Err(e) => {
                    warn!("Cannot create backup directory in {}: {}", self.root.display(), e);
                    return;
                }
            },
        };

        let dest = dir.join(backup_file_name(path));
        match registry.export_key(path, &dest) {
            Ok(written) => debug!("Backed up {} to {}", path, written.display()),
            // Keys that do not exist yet have nothing to back up
            Err(e) => debug!("No backup for {}: {:#}", path, e),
        }
    }
}

/// Create a fresh stamped directory under `root`
fn claim_session_dir(root: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(root)?;
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            stamp.to_string()
        } else {
            format!("{}-{}", stamp, suffix)
        };
        let candidate = root.join(name);
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e),
        }
    }
}

/// `HKCU\Software\Foo Bar` → `HKCU_Software_Foo_Bar.reg`
fn backup_file_name(path: &RegistryPath) -> String {
    let stem: String = path
        .to_string()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{}.reg", stem)
}

// ============================================================================
// Tweak applier
// ============================================================================

pub struct TweakApplier<'a> {
    registry: &'a mut dyn Registry,
    shell: &'a mut dyn SystemShell,
    backup: &'a mut RegistryBackup,
}

impl<'a> TweakApplier<'a> {
    pub fn new(
        registry: &'a mut dyn Registry,
        shell: &'a mut dyn SystemShell,
        backup: &'a mut RegistryBackup,
    ) -> Self {
        Self {
            registry,
            shell,
            backup,
        }
    }

    pub fn apply(&mut self, tweak: &TweakEntry) -> Result<Outcome> {
        if tweak.info {
            debug!("{} is informational only", tweak.name);
            return Ok(Outcome::Skipped);
        }

        let registry = tweak.registry_phase().map(|values| self.apply_registry(values));
        let commands = tweak.command_phase().map(|commands| self.run_commands(commands));

        Ok(combine(registry, commands))
    }

    fn apply_registry(&mut self, values: &[RegistryValue]) -> Outcome {
        let mut outcome = Outcome::Success;
        for value in values {
            if let Err(e) = self.write_one(value) {
                warn!("Registry write {}\\{} failed: {}", value.path, value.name, e);
                outcome = Outcome::Failed;
            }
        }
        outcome
    }

    fn write_one(&mut self, value: &RegistryValue) -> std::result::Result<(), String> {
        let path = value.key_path()?;
        let value_type = value.kind()?;
        let data = RegistryData::from_json(value_type, &value.value)?;

        self.backup.backup(&mut *self.registry, &path);

        match self.registry.write_value(&path, &value.name, &data) {
            Ok(()) => return Ok(()),
            Err(e) => debug!("Direct write to {} failed ({:#}), trying reg add", path, e),
        }

        match self.registry.reg_add(&path, &value.name, value_type, &data) {
            Ok(true) => {
                info!("Wrote {}\\{} through reg add", path, value.name);
                Ok(())
            }
            Ok(false) => Err("reg add was refused".to_string()),
            Err(e) => Err(format!("reg add could not run: {:#}", e)),
        }
    }

    fn run_commands(&mut self, commands: &[String]) -> Outcome {
        let mut outcome = Outcome::Success;
        for command in commands {
            match self.shell.run_system_command(command) {
                Ok(true) => debug!("Ran '{}'", command),
                Ok(false) => {
                    warn!("Command '{}' failed", command);
                    outcome = Outcome::Failed;
                }
                Err(e) => {
                    warn!("Command '{}' could not run: {:#}", command, e);
                    outcome = Outcome::Failed;
                }
            }
        }
        outcome
    }
}
