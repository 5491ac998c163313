//! Pre-flight sanity checks for the runtime environment
//!
//! Verified before any catalog is touched:
//! - running on Windows
//! - running elevated (`net session` only succeeds as administrator)
//! - required binaries are on PATH
//!
//! If any check fails, a framed error is printed and the caller exits.

use tracing::{debug, info, warn};

use crate::commands::shell::{NetSessionArgs, WhereArgs};
use crate::error::{Result, SetupError};
use crate::runner::CommandRunner;

/// Result of environment verification
#[derive(Debug)]
pub struct SanityCheckResult {
    pub is_windows: bool,
    pub is_admin: bool,
    pub missing_binaries: Vec<String>,
}

impl SanityCheckResult {
    /// Returns true if all checks passed
    pub fn is_ok(&self) -> bool {
        self.is_windows && self.is_admin && self.missing_binaries.is_empty()
    }

    /// One-line description of what failed
    pub fn summary(&self) -> String {
        let mut problems = Vec::new();
        if !self.is_windows {
            problems.push("not running on Windows".to_string());
        } else if !self.is_admin {
            problems.push("not elevated".to_string());
        }
        if !self.missing_binaries.is_empty() {
            problems.push(format!("missing {}", self.missing_binaries.join(", ")));
        }
        problems.join("; ")
    }
}

/// Required runtime binaries
const REQUIRED_BINARIES: &[&str] = &[
    "winget",     // Package installs
    "powershell", // Appx removal, restore point
    "reg",        // Registry export and fallback writes
];

/// Check if a binary is available in PATH
fn binary_exists(runner: &CommandRunner, name: &str) -> bool {
    runner
        .run(&WhereArgs {
            program: name.to_string(),
        })
        .map(|output| output.success)
        .unwrap_or(false)
}

/// Check for an elevated token
fn is_running_as_admin(runner: &CommandRunner) -> bool {
    runner
        .run(&NetSessionArgs)
        .map(|output| output.success)
        .unwrap_or(false)
}

/// Perform all sanity checks and return the result
pub fn verify_environment(runner: &CommandRunner) -> SanityCheckResult {
    let is_windows = cfg!(windows);
    if !is_windows {
        return SanityCheckResult {
            is_windows,
            is_admin: false,
            missing_binaries: Vec::new(),
        };
    }

    let missing_binaries = REQUIRED_BINARIES
        .iter()
        .filter(|binary| !binary_exists(runner, binary))
        .map(|binary| binary.to_string())
        .collect();

    SanityCheckResult {
        is_windows,
        is_admin: is_running_as_admin(runner),
        missing_binaries,
    }
}

/// Print a framed error message to stderr
pub fn print_error(result: &SanityCheckResult) {
    eprintln!();
    eprintln!("╔══════════════════════════════════════════════════════════════════╗");
    eprintln!("║                winsetup - Pre-flight Check Failed                ║");
    eprintln!("╚══════════════════════════════════════════════════════════════════╝");
    eprintln!();

    if !result.is_windows {
        eprintln!("❌ ERROR: Windows required");
        eprintln!("   winsetup configures a Windows workstation and cannot run here.");
        eprintln!();
        eprintln!("   Use --dry-run --skip-preflight to preview catalogs elsewhere.");
        eprintln!();
    }

    if result.is_windows && !result.is_admin {
        eprintln!("❌ ERROR: Administrator privileges required");
        eprintln!("   Installing software and editing HKLM requires an elevated shell.");
        eprintln!();
        eprintln!("   Solution: right-click the terminal and choose \"Run as administrator\".");
        eprintln!();
    }

    if !result.missing_binaries.is_empty() {
        eprintln!("❌ ERROR: Missing required programs");
        eprintln!();
        for binary in &result.missing_binaries {
            eprintln!("   • {} ({})", binary, install_hint(binary));
        }
        eprintln!();
    }

    eprintln!("╔══════════════════════════════════════════════════════════════════╗");
    eprintln!("║  Fix the above issues and try again.                             ║");
    eprintln!("╚══════════════════════════════════════════════════════════════════╝");
    eprintln!();
}

/// Where to get a missing program
fn install_hint(binary: &str) -> &'static str {
    match binary {
        "winget" => "install \"App Installer\" from the Microsoft Store",
        "powershell" => "ships with Windows; check PATH",
        "reg" => "ships with Windows; check %SystemRoot%\\System32",
        _ => "unknown",
    }
}

/// Skip pre-flight checks (for development/testing)
/// Set WINSETUP_SKIP_PREFLIGHT=1 to skip
pub fn should_skip_preflight() -> bool {
    std::env::var("WINSETUP_SKIP_PREFLIGHT")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Verify the environment unless skipped.
///
/// On failure the framed error has already been printed when this returns.
pub fn run_preflight_checks(runner: &CommandRunner, skip: bool) -> Result<()> {
    if skip || should_skip_preflight() {
        warn!("Pre-flight checks skipped");
        return Ok(());
    }

    debug!("Running pre-flight sanity checks...");
    let result = verify_environment(runner);

    if !result.is_ok() {
        print_error(&result);
        return Err(SetupError::preflight(result.summary()));
    }

    info!("Pre-flight checks passed: elevated, all programs present");
    Ok(())
}
