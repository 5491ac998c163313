//! winget-backed `PackageManager`.

use anyhow::Result;
use tracing::{debug, warn};

use super::{InstallSignal, PackageManager};
use crate::commands::validate_identifier;
use crate::commands::winget::{WingetInstallArgs, WingetListArgs, WingetUninstallArgs};
use crate::runner::CommandRunner;

/// `APPINSTALLER_CLI_ERROR_INSTALLER_HASH_MISMATCH` (0x8A150011)
pub const HASH_MISMATCH: i32 = 0x8A15_0011_u32 as i32;
/// `APPINSTALLER_CLI_ERROR_PACKAGE_ALREADY_INSTALLED` (0x8A150061)
pub const PACKAGE_ALREADY_INSTALLED: i32 = 0x8A15_0061_u32 as i32;
/// `APPINSTALLER_CLI_ERROR_UPDATE_NOT_APPLICABLE` (0x8A15002B): installed, nothing newer
pub const UPDATE_NOT_APPLICABLE: i32 = 0x8A15_002B_u32 as i32;

impl InstallSignal {
    /// Translate a winget exit code.
    ///
    /// Only the hash-mismatch code is special-cased for retries; every
    /// other non-zero code is an ordinary failure.
    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => Self::Installed,
            PACKAGE_ALREADY_INSTALLED | UPDATE_NOT_APPLICABLE => Self::AlreadyInstalled,
            HASH_MISMATCH => Self::HashMismatch,
            other => Self::Failed(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Winget {
    runner: CommandRunner,
}

impl Winget {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

impl PackageManager for Winget {
    fn is_installed(&mut self, id: &str) -> Result<bool> {
        validate_identifier(id)?;
        let output = self.runner.run(&WingetListArgs { id: id.to_string() })?;
        // winget list exits non-zero when nothing matches
        let installed = output.success && output.stdout.to_lowercase().contains(&id.to_lowercase());
        debug!("winget list {}: installed={}", id, installed);
        Ok(installed)
    }

    fn install(&mut self, id: &str, locale: Option<&str>, force: bool) -> Result<InstallSignal> {
        validate_identifier(id)?;
        let output = self.runner.run(&WingetInstallArgs {
            id: id.to_string(),
            locale: locale.map(str::to_string),
            force,
        })?;
        let signal = match output.exit_code {
            Some(code) => InstallSignal::from_exit_code(code),
            None => InstallSignal::Failed(-1),
        };
        if let InstallSignal::Failed(code) = signal {
            warn!("winget install {} failed with exit code {:#X}", id, code);
        }
        Ok(signal)
    }

    fn uninstall(&mut self, id: &str) -> Result<bool> {
        validate_identifier(id)?;
        let output = self.runner.run(&WingetUninstallArgs { id: id.to_string() })?;
        Ok(output.success)
    }
}
