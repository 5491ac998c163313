//! PowerShell-backed `AppxStore`.

use anyhow::Result;
use tracing::debug;

use super::{AppxStore, InstalledPackage};
use crate::commands::powershell::{PowerShellArgs, quote};
use crate::commands::validate_identifier;
use crate::runner::CommandRunner;

#[derive(Debug, Clone)]
pub struct AppxPowerShell {
    runner: CommandRunner,
}

impl AppxPowerShell {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }

    fn run_removal(&self, script: String, what: &str) -> Result<bool> {
        let output = self.runner.run(&PowerShellArgs::action(script))?;
        if !output.success {
            debug!("{} failed: {}", what, output.stderr.trim());
        }
        Ok(output.success)
    }
}

impl AppxStore for AppxPowerShell {
    fn list_installed(&mut self) -> Result<Vec<InstalledPackage>> {
        let output = self.runner.run(&PowerShellArgs::query(
            "Get-AppxPackage | Select-Object -ExpandProperty Name",
        ))?;
        output.ensure_success("Get-AppxPackage")?;
        Ok(parse_package_names(&output.stdout))
    }

    fn remove_user_package(&mut self, id: &str) -> Result<bool> {
        validate_identifier(id)?;
        let script = format!(
            "$ErrorActionPreference = 'Stop'; Get-AppxPackage -Name {} | Remove-AppxPackage",
            quote(id)
        );
        self.run_removal(script, "Remove-AppxPackage")
    }

    fn remove_provisioned_package(&mut self, id: &str) -> Result<bool> {
        validate_identifier(id)?;
        let script = format!(
            "$ErrorActionPreference = 'Stop'; Get-AppxProvisionedPackage -Online | \
             Where-Object {{ $_.DisplayName -like {} }} | Remove-AppxProvisionedPackage -Online",
            quote(id)
        );
        self.run_removal(script, "Remove-AppxProvisionedPackage")
    }
}

/// One package name per non-empty line
fn parse_package_names(stdout: &str) -> Vec<InstalledPackage> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|name| InstalledPackage {
            name: name.to_string(),
        })
        .collect()
}
