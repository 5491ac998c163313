//! `Registry` implementation: winreg for direct writes, reg.exe otherwise.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::Registry;
use crate::commands::reg::{RegAddArgs, RegExportArgs};
use crate::runner::CommandRunner;
use crate::types::{RegistryData, RegistryPath, RegistryValueType};

#[derive(Debug, Clone)]
pub struct WindowsRegistry {
    runner: CommandRunner,
}

impl WindowsRegistry {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

impl Registry for WindowsRegistry {
    fn export_key(&mut self, path: &RegistryPath, dest: &Path) -> Result<PathBuf> {
        let output = self.runner.run(&RegExportArgs {
            path: path.clone(),
            dest: dest.to_path_buf(),
        })?;
        output.ensure_success(&format!("reg export {}", path))?;
        Ok(dest.to_path_buf())
    }

    fn write_value(&mut self, path: &RegistryPath, name: &str, data: &RegistryData) -> Result<()> {
        if self.runner.is_dry_run() {
            info!("[DRY RUN] Skipped registry write: {}\\{} = {:?}", path, name, data);
            return Ok(());
        }
        direct::write(path, name, data)
            .with_context(|| format!("Direct registry write failed for {}\\{}", path, name))?;
        debug!("Wrote {}\\{}", path, name);
        Ok(())
    }

    fn reg_add(
        &mut self,
        path: &RegistryPath,
        name: &str,
        value_type: RegistryValueType,
        data: &RegistryData,
    ) -> Result<bool> {
        let output = self.runner.run(&RegAddArgs {
            path: path.clone(),
            name: name.to_string(),
            value_type,
            data: data.clone(),
        })?;
        if !output.success {
            debug!("reg add {}\\{} failed: {}", path, name, output.stderr.trim());
        }
        Ok(output.success)
    }
}

#[cfg(windows)]
mod direct {
    use anyhow::Result;
    use winreg::enums::{
        HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, HKEY_USERS,
        RegType,
    };
    use winreg::{RegKey, RegValue};

    use crate::types::{Hive, RegistryData, RegistryPath};

    fn root(hive: Hive) -> RegKey {
        RegKey::predef(match hive {
            Hive::CurrentUser => HKEY_CURRENT_USER,
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
            Hive::ClassesRoot => HKEY_CLASSES_ROOT,
            Hive::Users => HKEY_USERS,
            Hive::CurrentConfig => HKEY_CURRENT_CONFIG,
        })
    }

    fn utf16_bytes(s: &str) -> Vec<u8> {
        s.encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(u16::to_le_bytes)
            .collect()
    }

    pub(super) fn write(path: &RegistryPath, name: &str, data: &RegistryData) -> Result<()> {
        let (key, _) = root(path.hive).create_subkey(&path.subkey)?;
        match data {
            RegistryData::DWord(v) => key.set_value(name, v)?,
            RegistryData::QWord(v) => key.set_value(name, v)?,
            RegistryData::String(s) => key.set_value(name, s)?,
            RegistryData::ExpandString(s) => key.set_raw_value(
                name,
                &RegValue {
                    bytes: utf16_bytes(s),
                    vtype: RegType::REG_EXPAND_SZ,
                },
            )?,
            RegistryData::MultiString(items) => key.set_value(name, items)?,
            RegistryData::Binary(bytes) => key.set_raw_value(
                name,
                &RegValue {
                    bytes: bytes.clone(),
                    vtype: RegType::REG_BINARY,
                },
            )?,
        }
        Ok(())
    }
}

#[cfg(not(windows))]
mod direct {
    use anyhow::Result;

    use crate::types::{RegistryData, RegistryPath};

    pub(super) fn write(_path: &RegistryPath, _name: &str, _data: &RegistryData) -> Result<()> {
        anyhow::bail!("direct registry access is only available on Windows")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hive;

    fn path() -> RegistryPath {
        RegistryPath {
            hive: Hive::CurrentUser,
            subkey: "Software\\WinSetupTest".to_string(),
        }
    }

    #[test]
    fn test_dry_run_write_is_noop() {
        let mut registry = WindowsRegistry::new(CommandRunner::new(true));
        assert!(registry.write_value(&path(), "Enabled", &RegistryData::DWord(1)).is_ok());
    }

    #[test]
    fn test_dry_run_reg_add_succeeds() {
        let mut registry = WindowsRegistry::new(CommandRunner::new(true));
        assert!(
            registry
                .reg_add(&path(), "Enabled", RegistryValueType::DWord, &RegistryData::DWord(1))
                .unwrap()
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_direct_write_unavailable_off_windows() {
        let mut registry = WindowsRegistry::new(CommandRunner::new(false));
        assert!(registry.write_value(&path(), "Enabled", &RegistryData::DWord(1)).is_err());
    }
}
