//! `SystemShell` implementation over cmd, tasklist/taskkill and PowerShell.

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use super::SystemShell;
use crate::commands::powershell::{PowerShellArgs, quote};
use crate::commands::shell::{CmdArgs, ExecutableArgs, OpenUrlArgs, TaskkillArgs, TasklistArgs};
use crate::runner::CommandRunner;

#[derive(Debug, Clone)]
pub struct WindowsShell {
    runner: CommandRunner,
}

impl WindowsShell {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

impl SystemShell for WindowsShell {
    fn run_system_command(&mut self, command: &str) -> Result<bool> {
        let output = self.runner.run(&CmdArgs {
            command: command.to_string(),
        })?;
        if !output.success {
            debug!(
                "'{}' exited with {}: {}",
                command,
                output.exit_code.unwrap_or(-1),
                output.stderr.trim()
            );
        }
        Ok(output.success)
    }

    fn open_url(&mut self, url: &str) -> Result<bool> {
        let output = self.runner.run(&OpenUrlArgs {
            url: url.to_string(),
        })?;
        Ok(output.success)
    }

    fn is_process_running(&mut self, image: &str) -> Result<bool> {
        let output = self.runner.run(&TasklistArgs {
            image: image.to_string(),
        })?;
        // tasklist prints "INFO: No tasks are running..." when nothing matches
        Ok(output.success
            && output
                .stdout
                .to_lowercase()
                .contains(&image.to_lowercase()))
    }

    fn stop_process(&mut self, image: &str) -> Result<bool> {
        let output = self.runner.run(&TaskkillArgs {
            image: image.to_string(),
        })?;
        Ok(output.success)
    }

    fn run_executable(&mut self, path: &Path, args: &[&str]) -> Result<bool> {
        let output = self.runner.run(&ExecutableArgs::new(
            path.to_path_buf(),
            args.iter().map(|a| a.to_string()).collect(),
        ))?;
        Ok(output.success)
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_restore_point(&mut self, description: &str) -> Result<bool> {
        let script = format!(
            "$ErrorActionPreference = 'Stop'; Checkpoint-Computer -Description {} -RestorePointType 'MODIFY_SETTINGS'",
            quote(description)
        );
        let output = self.runner.run(&PowerShellArgs::action(script))?;
        if !output.success {
            debug!("Checkpoint-Computer failed: {}", output.stderr.trim());
        }
        Ok(output.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_mutations_succeed() {
        let mut shell = WindowsShell::new(CommandRunner::new(true));
        assert!(shell.run_system_command("powercfg /hibernate off").unwrap());
        assert!(shell.stop_process("OneDrive.exe").unwrap());
        assert!(shell.create_restore_point("before setup").unwrap());
    }

    #[test]
    fn test_path_exists() {
        let shell = WindowsShell::new(CommandRunner::new(true));
        let dir = tempfile::tempdir().unwrap();
        assert!(shell.path_exists(dir.path()));
        assert!(!shell.path_exists(&dir.path().join("missing.exe")));
    }
}
