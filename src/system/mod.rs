//! External collaborators: package manager, Appx store, registry, shell.
//!
//! Actions only talk to the machine through these traits. Production
//! implementations shell out through `CommandRunner`; tests substitute
//! in-memory fakes. Every method translates raw exit codes into a typed
//! answer (`bool`, `InstallSignal`) so no caller ever inspects a process
//! status directly.
//!
//! `Err` from any method means the call itself could not be made (spawn
//! failure, invalid identifier), not that the operation was refused.

pub mod appx;
pub mod registry;
pub mod shell;
pub mod winget;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::types::{RegistryData, RegistryPath, RegistryValueType};

pub use appx::AppxPowerShell;
pub use registry::WindowsRegistry;
pub use shell::WindowsShell;
pub use winget::Winget;

/// Result of one package install attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallSignal {
    Installed,
    AlreadyInstalled,
    /// Downloaded installer does not match the manifest hash (stale cache)
    HashMismatch,
    Failed(i32),
}

/// winget-like package manager
pub trait PackageManager {
    fn is_installed(&mut self, id: &str) -> Result<bool>;

    fn install(&mut self, id: &str, locale: Option<&str>, force: bool) -> Result<InstallSignal>;

    /// Returns `true` when the uninstall succeeded
    fn uninstall(&mut self, id: &str) -> Result<bool>;
}

/// An installed Appx package as reported by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
}

/// Appx package presence and removal
pub trait AppxStore {
    fn list_installed(&mut self) -> Result<Vec<InstalledPackage>>;

    /// Remove the package for the current user
    fn remove_user_package(&mut self, id: &str) -> Result<bool>;

    /// Remove the provisioned copy so new profiles do not get it
    fn remove_provisioned_package(&mut self, id: &str) -> Result<bool>;
}

/// Registry access
pub trait Registry {
    /// Export a key to a `.reg` file; returns the written path
    fn export_key(&mut self, path: &RegistryPath, dest: &Path) -> Result<PathBuf>;

    /// Direct write (creates the key if needed)
    fn write_value(&mut self, path: &RegistryPath, name: &str, data: &RegistryData) -> Result<()>;

    /// Write through the command-line registry tool; `true` on success
    fn reg_add(
        &mut self,
        path: &RegistryPath,
        name: &str,
        value_type: RegistryValueType,
        data: &RegistryData,
    ) -> Result<bool>;
}

/// Process, file and miscellaneous OS operations
pub trait SystemShell {
    /// Run a catalog system command; `true` on exit code 0
    fn run_system_command(&mut self, command: &str) -> Result<bool>;

    fn open_url(&mut self, url: &str) -> Result<bool>;

    fn is_process_running(&mut self, image: &str) -> Result<bool>;

    fn stop_process(&mut self, image: &str) -> Result<bool>;

    fn run_executable(&mut self, path: &Path, args: &[&str]) -> Result<bool>;

    fn path_exists(&self, path: &Path) -> bool;

    fn create_restore_point(&mut self, description: &str) -> Result<bool>;
}
