//! Removal action for bloatware items, plus the protection guard.
//!
//! # Appx packages
//!
//! Packages not reported by the store are `Skipped`. Removal is two-phase
//! and both phases always run: the per-user package decides the outcome,
//! the provisioned copy is removed afterwards and a failure there only
//! produces a warning.
//!
//! # OneDrive
//!
//! Not an Appx package. The running client is stopped, then the first
//! `OneDriveSetup.exe` found in the known locations is run with
//! `/uninstall`. Without a setup program the winget registration is
//! uninstalled instead. With no trace at all the item is `Skipped`.

use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::catalog::bloatware::ONEDRIVE_ID;
use crate::catalog::{BloatwareEntry, BloatwareItem};
use crate::outcome::Outcome;
use crate::system::{AppxStore, PackageManager, SystemShell};

const ONEDRIVE_PROCESS: &str = "OneDrive.exe";
const ONEDRIVE_SETUP: &str = "OneDriveSetup.exe";

/// `true` when `id` contains a protected token or a protected token
/// contains `id`. Case-sensitive. Empty tokens are ignored.
pub fn is_protected(id: &str, protected: &[String]) -> bool {
    protected
        .iter()
        .filter(|token| !token.is_empty())
        .any(|token| id.contains(token.as_str()) || token.contains(id))
}

/// Environment variable lookup, injectable for tests
pub type EnvLookup = dyn Fn(&str) -> Option<String>;

/// Reads the process environment
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

pub struct BloatwareRemover<'a> {
    appx: &'a mut dyn AppxStore,
    packages: &'a mut dyn PackageManager,
    shell: &'a mut dyn SystemShell,
    env: &'a EnvLookup,
    /// Installed package names, listed once per batch. `None` inside means
    /// the listing failed and presence is unknown.
    installed: Option<Option<HashSet<String>>>,
}

impl<'a> BloatwareRemover<'a> {
    pub fn new(
        appx: &'a mut dyn AppxStore,
        packages: &'a mut dyn PackageManager,
        shell: &'a mut dyn SystemShell,
    ) -> Self {
        Self {
            appx,
            packages,
            shell,
            env: &process_env,
            installed: None,
        }
    }

    pub fn with_env(mut self, env: &'a EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn remove(&mut self, item: &BloatwareItem) -> Result<Outcome> {
        match item {
            BloatwareItem::App(entry) => self.remove_app(entry),
            BloatwareItem::OneDrive { .. } => self.remove_onedrive(),
        }
    }

    // ------------------------------------------------------------------------
    // Appx
    // ------------------------------------------------------------------------

    fn installed_names(&mut self) -> Option<&HashSet<String>> {
        if self.installed.is_none() {
            let listing = match self.appx.list_installed() {
                Ok(packages) => Some(packages.into_iter().map(|p| p.name).collect()),
                Err(e) => {
                    warn!("Could not list installed packages: {:#}", e);
                    None
                }
            };
            self.installed = Some(listing);
        }
        self.installed.as_ref().and_then(Option::as_ref)
    }

    fn is_present(&mut self, id: &str) -> bool {
        match self.installed_names() {
            Some(names) => names.iter().any(|name| matches_package(name, id)),
            // Unknown presence: let the removal itself decide
            None => true,
        }
    }

    fn remove_app(&mut self, entry: &BloatwareEntry) -> Result<Outcome> {
        if !self.is_present(&entry.id) {
            info!("{} ({}) is not installed", entry.name, entry.id);
            return Ok(Outcome::Skipped);
        }

        let user_removed = match self.appx.remove_user_package(&entry.id) {
            Ok(true) => true,
            Ok(false) => {
                warn!("Could not remove {} for the current user", entry.id);
                false
            }
            Err(e) => {
                warn!("Removal of {} could not run: {:#}", entry.id, e);
                false
            }
        };

        // The provisioned copy is removed even when the user package stays
        match self.appx.remove_provisioned_package(&entry.id) {
            Ok(true) => debug!("Removed provisioned package {}", entry.id),
            Ok(false) => warn!("Provisioned package {} remains", entry.id),
            Err(e) => warn!("Provisioned removal of {} could not run: {:#}", entry.id, e),
        }

        Ok(if user_removed {
            Outcome::Success
        } else {
            Outcome::Failed
        })
    }

    // ------------------------------------------------------------------------
    // OneDrive
    // ------------------------------------------------------------------------

    /// Known `OneDriveSetup.exe` locations, most common first
    fn onedrive_setup_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(root) = (self.env)("SystemRoot") {
            let root = PathBuf::from(root);
            candidates.push(root.join("System32").join(ONEDRIVE_SETUP));
            candidates.push(root.join("SysWOW64").join(ONEDRIVE_SETUP));
        }
        if let Some(local) = (self.env)("LOCALAPPDATA") {
            candidates.push(
                PathBuf::from(local)
                    .join("Microsoft")
                    .join("OneDrive")
                    .join(ONEDRIVE_SETUP),
            );
        }
        candidates
    }

    fn remove_onedrive(&mut self) -> Result<Outcome> {
        let was_running = self.shell.is_process_running(ONEDRIVE_PROCESS)?;
        if was_running {
            info!("Stopping {}", ONEDRIVE_PROCESS);
            if !self.shell.stop_process(ONEDRIVE_PROCESS)? {
                warn!("Could not stop {}; continuing", ONEDRIVE_PROCESS);
            }
        }

        let setup = self
            .onedrive_setup_candidates()
            .into_iter()
            .find(|path| self.shell.path_exists(path));

        if let Some(setup) = setup {
            info!("Running {} /uninstall", setup.display());
            return Ok(if self.shell.run_executable(&setup, &["/uninstall"])? {
                Outcome::Success
            } else {
                Outcome::Failed
            });
        }

        if self.packages.is_installed(ONEDRIVE_ID)? {
            info!("No OneDrive setup program found, uninstalling through winget");
            return Ok(if self.packages.uninstall(ONEDRIVE_ID)? {
                Outcome::Success
            } else {
                Outcome::Failed
            });
        }

        if was_running {
            warn!("OneDrive was running but no uninstaller was found");
            Ok(Outcome::Failed)
        } else {
            info!("OneDrive is not installed");
            Ok(Outcome::Skipped)
        }
    }
}

/// Exact match, or a `*` wildcard pattern such as `*CandyCrush*`
fn matches_package(name: &str, pattern: &str) -> bool {
    if !pattern.contains('*') {
        return name == pattern;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return false,
    };
    let Some(mut remaining) = name.strip_prefix(first) else {
        return false;
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return remaining.is_empty(),
    };
    for part in middle {
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_protection_either_direction() {
        assert!(is_protected("FooBar", &tokens(&["Foo"])));
        assert!(is_protected("Bar", &tokens(&["BarFoo"])));
        assert!(!is_protected("Baz", &tokens(&["Foo", "BarFoo"])));
    }

    #[test]
    fn test_protection_is_case_sensitive() {
        assert!(!is_protected("foobar", &tokens(&["Foo"])));
    }

    #[test]
    fn test_empty_token_protects_nothing() {
        assert!(!is_protected("Microsoft.BingNews", &tokens(&[""])));
    }

    #[test]
    fn test_matches_package() {
        assert!(matches_package("Microsoft.BingNews", "Microsoft.BingNews"));
        assert!(!matches_package("Microsoft.BingNewsX", "Microsoft.BingNews"));
        assert!(matches_package("king.com.CandyCrushSaga", "*CandyCrush*"));
        assert!(matches_package("Microsoft.Xbox.TCUI", "Microsoft.Xbox*"));
        assert!(matches_package("Contoso.App", "*.App"));
        assert!(!matches_package("Contoso.Apps", "*.App"));
        assert!(matches_package("anything", "*"));
    }
}
