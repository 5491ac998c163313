//! In-memory collaborators for integration tests.
//!
//! Every mock is a cheap handle over shared state (`Rc<RefCell<_>>`), so a
//! test can hand a clone to a `Services` box and still inspect what
//! happened afterwards.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use winsetup::executor::Reporter;
use winsetup::outcome::OperationResult;
use winsetup::retry::Sleeper;
use winsetup::session::Services;
use winsetup::system::{AppxStore, InstallSignal, InstalledPackage, PackageManager, Registry, SystemShell};
use winsetup::types::{CatalogKind, RegistryData, RegistryPath, RegistryValueType};

// =============================================================================
// Package manager
// =============================================================================

#[derive(Debug, Default)]
pub struct PackagesState {
    pub installed: HashSet<String>,
    /// Per-id scripted install results, consumed in order
    pub scripted: HashMap<String, VecDeque<InstallSignal>>,
    /// Ids whose install panics
    pub panicking: HashSet<String>,
    /// Ids whose uninstall is refused
    pub refuse_uninstall: HashSet<String>,
    /// (id, locale, force) for every install call
    pub install_calls: Vec<(String, Option<String>, bool)>,
    pub uninstalled: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MockPackages(pub Rc<RefCell<PackagesState>>);

impl MockPackages {
    pub fn with_installed(ids: &[&str]) -> Self {
        let mock = Self::default();
        mock.0.borrow_mut().installed = ids.iter().map(|s| s.to_string()).collect();
        mock
    }

    pub fn script(&self, id: &str, signals: &[InstallSignal]) {
        self.0
            .borrow_mut()
            .scripted
            .insert(id.to_string(), signals.iter().copied().collect());
    }

    pub fn install_calls(&self) -> Vec<(String, Option<String>, bool)> {
        self.0.borrow().install_calls.clone()
    }

    pub fn uninstalled(&self) -> Vec<String> {
        self.0.borrow().uninstalled.clone()
    }
}

impl PackageManager for MockPackages {
    fn is_installed(&mut self, id: &str) -> anyhow::Result<bool> {
        Ok(self.0.borrow().installed.contains(id))
    }

    fn install(&mut self, id: &str, locale: Option<&str>, force: bool) -> anyhow::Result<InstallSignal> {
        let mut state = self.0.borrow_mut();
        state
            .install_calls
            .push((id.to_string(), locale.map(str::to_string), force));
        if state.panicking.contains(id) {
            drop(state);
            panic!("installer crashed for {}", id);
        }
        let signal = state
            .scripted
            .get_mut(id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(InstallSignal::Installed);
        if signal == InstallSignal::Installed {
            state.installed.insert(id.to_string());
        }
        Ok(signal)
    }

    fn uninstall(&mut self, id: &str) -> anyhow::Result<bool> {
        let mut state = self.0.borrow_mut();
        state.uninstalled.push(id.to_string());
        Ok(!state.refuse_uninstall.contains(id))
    }
}

// =============================================================================
// Appx store
// =============================================================================

#[derive(Debug, Default)]
pub struct AppxState {
    pub installed: Vec<String>,
    pub list_fails: bool,
    pub fail_user: HashSet<String>,
    pub fail_provisioned: HashSet<String>,
    pub removed_user: Vec<String>,
    pub removed_provisioned: Vec<String>,
    pub list_calls: usize,
}

#[derive(Clone, Default)]
pub struct MockAppx(pub Rc<RefCell<AppxState>>);

impl MockAppx {
    pub fn with_installed(names: &[&str]) -> Self {
        let mock = Self::default();
        mock.0.borrow_mut().installed = names.iter().map(|s| s.to_string()).collect();
        mock
    }

    pub fn removed_user(&self) -> Vec<String> {
        self.0.borrow().removed_user.clone()
    }

    pub fn removed_provisioned(&self) -> Vec<String> {
        self.0.borrow().removed_provisioned.clone()
    }
}

impl AppxStore for MockAppx {
    fn list_installed(&mut self) -> anyhow::Result<Vec<InstalledPackage>> {
        let mut state = self.0.borrow_mut();
        state.list_calls += 1;
        if state.list_fails {
            anyhow::bail!("Get-AppxPackage failed");
        }
        Ok(state
            .installed
            .iter()
            .map(|name| InstalledPackage { name: name.clone() })
            .collect())
    }

    fn remove_user_package(&mut self, id: &str) -> anyhow::Result<bool> {
        let mut state = self.0.borrow_mut();
        state.removed_user.push(id.to_string());
        Ok(!state.fail_user.contains(id))
    }

    fn remove_provisioned_package(&mut self, id: &str) -> anyhow::Result<bool> {
        let mut state = self.0.borrow_mut();
        state.removed_provisioned.push(id.to_string());
        Ok(!state.fail_provisioned.contains(id))
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Default)]
pub struct RegistryState {
    /// Value names whose direct write fails
    pub fail_direct: HashSet<String>,
    /// Value names whose `reg add` is refused
    pub fail_reg_add: HashSet<String>,
    pub exports: Vec<(String, PathBuf)>,
    pub direct_writes: Vec<(String, String, RegistryData)>,
    pub reg_adds: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct MockRegistry(pub Rc<RefCell<RegistryState>>);

impl MockRegistry {
    pub fn failing_direct(names: &[&str]) -> Self {
        let mock = Self::default();
        mock.0.borrow_mut().fail_direct = names.iter().map(|s| s.to_string()).collect();
        mock
    }

    pub fn state(&self) -> std::cell::Ref<'_, RegistryState> {
        self.0.borrow()
    }
}

impl Registry for MockRegistry {
    fn export_key(&mut self, path: &RegistryPath, dest: &Path) -> anyhow::Result<PathBuf> {
        self.0
            .borrow_mut()
            .exports
            .push((path.to_string(), dest.to_path_buf()));
        Ok(dest.to_path_buf())
    }

    fn write_value(&mut self, path: &RegistryPath, name: &str, data: &RegistryData) -> anyhow::Result<()> {
        let mut state = self.0.borrow_mut();
        if state.fail_direct.contains(name) {
            anyhow::bail!("access denied");
        }
        state
            .direct_writes
            .push((path.to_string(), name.to_string(), data.clone()));
        Ok(())
    }

    fn reg_add(
        &mut self,
        path: &RegistryPath,
        name: &str,
        _value_type: RegistryValueType,
        _data: &RegistryData,
    ) -> anyhow::Result<bool> {
        let mut state = self.0.borrow_mut();
        state.reg_adds.push((path.to_string(), name.to_string()));
        Ok(!state.fail_reg_add.contains(name))
    }
}

// =============================================================================
// Shell
// =============================================================================

#[derive(Debug)]
pub struct ShellState {
    pub running: HashSet<String>,
    pub existing_paths: HashSet<PathBuf>,
    pub failing_commands: HashSet<String>,
    pub open_url_ok: bool,
    pub executable_ok: bool,
    pub restore_point_ok: bool,
    pub commands: Vec<String>,
    pub opened_urls: Vec<String>,
    pub stopped: Vec<String>,
    pub executed: Vec<(PathBuf, Vec<String>)>,
    pub restore_points: Vec<String>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            running: HashSet::new(),
            existing_paths: HashSet::new(),
            failing_commands: HashSet::new(),
            open_url_ok: true,
            executable_ok: true,
            restore_point_ok: true,
            commands: Vec::new(),
            opened_urls: Vec::new(),
            stopped: Vec::new(),
            executed: Vec::new(),
            restore_points: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockShell(pub Rc<RefCell<ShellState>>);

impl MockShell {
    pub fn state(&self) -> std::cell::Ref<'_, ShellState> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> std::cell::RefMut<'_, ShellState> {
        self.0.borrow_mut()
    }
}

impl SystemShell for MockShell {
    fn run_system_command(&mut self, command: &str) -> anyhow::Result<bool> {
        let mut state = self.0.borrow_mut();
        state.commands.push(command.to_string());
        Ok(!state.failing_commands.contains(command))
    }

    fn open_url(&mut self, url: &str) -> anyhow::Result<bool> {
        let mut state = self.0.borrow_mut();
        state.opened_urls.push(url.to_string());
        Ok(state.open_url_ok)
    }

    fn is_process_running(&mut self, image: &str) -> anyhow::Result<bool> {
        Ok(self.0.borrow().running.contains(image))
    }

    fn stop_process(&mut self, image: &str) -> anyhow::Result<bool> {
        let mut state = self.0.borrow_mut();
        state.stopped.push(image.to_string());
        Ok(state.running.remove(image))
    }

    fn run_executable(&mut self, path: &Path, args: &[&str]) -> anyhow::Result<bool> {
        let mut state = self.0.borrow_mut();
        state.executed.push((
            path.to_path_buf(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        Ok(state.executable_ok)
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.0.borrow().existing_paths.contains(path)
    }

    fn create_restore_point(&mut self, description: &str) -> anyhow::Result<bool> {
        let mut state = self.0.borrow_mut();
        state.restore_points.push(description.to_string());
        Ok(state.restore_point_ok)
    }
}

// =============================================================================
// Sleeper and reporter
// =============================================================================

#[derive(Clone, Default)]
pub struct CountingSleeper(pub Rc<Cell<u32>>);

impl CountingSleeper {
    pub fn count(&self) -> u32 {
        self.0.get()
    }
}

impl Sleeper for CountingSleeper {
    fn sleep(&self, _duration: Duration) {
        self.0.set(self.0.get() + 1);
    }
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub progress: Vec<(CatalogKind, usize, usize, String)>,
    pub completed: Vec<(CatalogKind, OperationResult)>,
}

impl Reporter for RecordingReporter {
    fn on_progress(&mut self, kind: CatalogKind, current: usize, total: usize, label: &str) {
        self.progress.push((kind, current, total, label.to_string()));
    }

    fn on_batch_complete(&mut self, kind: CatalogKind, result: &OperationResult) {
        self.completed.push((kind, result.clone()));
    }
}

// =============================================================================
// Wiring helpers
// =============================================================================

/// Handles to every mock inside a `Services`
#[derive(Clone, Default)]
pub struct Mocks {
    pub packages: MockPackages,
    pub appx: MockAppx,
    pub registry: MockRegistry,
    pub shell: MockShell,
    pub sleeper: CountingSleeper,
}

impl Mocks {
    /// Services backed by these mocks; the environment has only `SystemRoot`
    pub fn services(&self) -> Services {
        Services {
            packages: Box::new(self.packages.clone()),
            appx: Box::new(self.appx.clone()),
            registry: Box::new(self.registry.clone()),
            shell: Box::new(self.shell.clone()),
            sleeper: Box::new(self.sleeper.clone()),
            env: Box::new(|key: &str| (key == "SystemRoot").then(|| "C:\\Windows".to_string())),
        }
    }
}

/// Write a catalog document into `dir` under the kind's file name
pub fn write_catalog(dir: &Path, kind: CatalogKind, json: &str) {
    fs::write(dir.join(kind.file_name()), json).expect("write catalog");
}
