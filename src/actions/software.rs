//! Install action for software entries.
//!
//! # Order of checks
//!
//! 1. `wingetUnavailable` entries take the manual fallback: the download
//!    page is opened and the entry counts as `Success` once control returns.
//!    The opener's own result is only logged.
//! 2. Already installed → `Skipped`. A failing presence query is logged and
//!    the install is attempted anyway.
//! 3. Install through the retry policy.

use anyhow::Result;
use tracing::{info, warn};

use crate::catalog::SoftwareEntry;
use crate::catalog::software::ManualFallback;
use crate::outcome::Outcome;
use crate::retry::{RetryPolicy, Sleeper, install_with_retry};
use crate::system::{PackageManager, SystemShell};

pub struct SoftwareInstaller<'a> {
    packages: &'a mut dyn PackageManager,
    shell: &'a mut dyn SystemShell,
    sleeper: &'a dyn Sleeper,
    policy: RetryPolicy,
    locale: Option<String>,
}

impl<'a> SoftwareInstaller<'a> {
    pub fn new(
        packages: &'a mut dyn PackageManager,
        shell: &'a mut dyn SystemShell,
        sleeper: &'a dyn Sleeper,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            packages,
            shell,
            sleeper,
            policy,
            locale: None,
        }
    }

    /// Installer locale passed to every install (e.g. `en-US`)
    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale;
        self
    }

    pub fn install(&mut self, entry: &SoftwareEntry) -> Result<Outcome> {
        if let Some(fallback) = entry.manual_fallback() {
            self.manual_install(&entry.name, fallback);
            return Ok(Outcome::Success);
        }

        match self.packages.is_installed(&entry.id) {
            Ok(true) => {
                info!("{} ({}) is already installed", entry.name, entry.id);
                return Ok(Outcome::Skipped);
            }
            Ok(false) => {}
            Err(e) => warn!("Could not query {}: {:#}; installing anyway", entry.id, e),
        }

        Ok(install_with_retry(
            &mut *self.packages,
            &entry.id,
            self.locale.as_deref(),
            &self.policy,
            self.sleeper,
        ))
    }

    fn manual_install(&mut self, name: &str, fallback: ManualFallback<'_>) {
        println!("  {} is not available through winget.", name);
        if let Some(note) = fallback.note {
            println!("  Note: {}", note);
        }
        let Some(url) = fallback.url else {
            warn!("{} has no download URL; install it manually", name);
            return;
        };
        println!("  Download: {}", url);
        match self.shell.open_url(url) {
            Ok(true) => info!("Opened download page for {}", name),
            Ok(false) => warn!("Could not open {} in a browser", url),
            Err(e) => warn!("Could not open {}: {:#}", url, e),
        }
    }
}
