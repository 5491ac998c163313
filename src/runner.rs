//! Type-safe command execution
//!
//! This module provides the ONLY sanctioned way to run external programs.
//! All execution MUST go through `CommandRunner::run` so that:
//!
//! - every invocation is logged with its exact argv
//! - dry-run mode is honoured in one place
//! - exit statuses are captured uniformly in `CommandOutput`
//!
//! Commands run to completion synchronously. There is no timeout: a hung
//! external process hangs the batch.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::commands::CommandArgs;
use crate::error::SetupError;

/// Executes typed commands, optionally in dry-run mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner {
    dry_run: bool,
}

impl CommandRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run a command described by `args`.
    ///
    /// # Returns
    ///
    /// - `Ok(output)` - the program ran (successfully or not); inspect
    ///   `output.success`
    /// - `Err` - the program could not be spawned or waited on
    ///
    /// In dry-run mode, mutating commands are logged and reported as
    /// successful without running.
    pub fn run<T: CommandArgs>(&self, args: &T) -> Result<CommandOutput> {
        let program = args.program();
        let cli_args = args.to_cli_args();

        if self.dry_run && args.mutates_system() {
            info!("[DRY RUN] Skipped: {} {:?}", program, cli_args);
            return Ok(CommandOutput {
                stdout: format!("[DRY RUN] Skipped: {} {}\n", program, cli_args.join(" ")),
                stderr: String::new(),
                exit_code: Some(0),
                success: true,
                dry_run: true,
            });
        }

        debug!("run: {} args={:?}", program, cli_args);

        let mut cmd = Command::new(program);
        push_args(&mut cmd, &cli_args, args.raw_args());
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd
            .output()
            .with_context(|| format!("Failed to run {}", program))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code();

        if output.status.success() {
            debug!("{} exited successfully", program);
        } else {
            debug!(
                "{} failed with exit code {}: {}",
                program,
                exit_code.unwrap_or(-1),
                stderr.trim()
            );
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
            success: output.status.success(),
            dry_run: false,
        })
    }
}

#[cfg(windows)]
fn push_args(cmd: &mut Command, args: &[String], raw: bool) {
    use std::os::windows::process::CommandExt;

    if raw {
        for arg in args {
            cmd.raw_arg(arg);
        }
    } else {
        cmd.args(args);
    }
}

#[cfg(not(windows))]
fn push_args(cmd: &mut Command, args: &[String], _raw: bool) {
    cmd.args(args);
}

/// Output from a command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code (None if terminated without one).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
    /// Whether the command was skipped by dry-run mode.
    pub dry_run: bool,
}

impl CommandOutput {
    /// Check if the command succeeded and return an error if not.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            let code = self.exit_code.unwrap_or(-1);
            Err(SetupError::command(format!(
                "{} failed (exit code {}): {}",
                context,
                code,
                self.stderr.trim()
            ))
            .into())
        }
    }
}
