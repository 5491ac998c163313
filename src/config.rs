//! Session configuration
//!
//! Loaded from an optional JSON file; every field has a default so partial
//! files are accepted. Command-line flags override file values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SetupError};
use crate::retry::RetryPolicy;

/// Upper bound for `retry_delay_secs`
pub const MAX_RETRY_DELAY_SECS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Directory holding software.json, tweaks.json and bloatware.json
    pub catalog_dir: PathBuf,
    /// Installer locale passed to winget, e.g. `en-US`
    pub locale: Option<String>,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    /// Where registry keys are exported before they are modified
    pub backup_dir: PathBuf,
    /// Where the session log file is written
    pub log_dir: PathBuf,
    pub create_restore_point: bool,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("catalogs"),
            locale: None,
            max_retries: 3,
            retry_delay_secs: 5,
            backup_dir: std::env::var_os("USERPROFILE")
                .map(|home| PathBuf::from(home).join("WinSetupBackups"))
                .unwrap_or_else(|| PathBuf::from("backups")),
            log_dir: std::env::var_os("TEMP")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
            create_restore_point: true,
        }
    }
}

impl SetupConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(|e| {
            SetupError::config(format!(
                "Failed to write configuration to {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            SetupError::config(format!(
                "Failed to read configuration from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(SetupError::config("max_retries must be at least 1"));
        }
        if self.retry_delay_secs > MAX_RETRY_DELAY_SECS {
            return Err(SetupError::config(format!(
                "retry_delay_secs must be at most {}",
                MAX_RETRY_DELAY_SECS
            )));
        }
        if self.catalog_dir.as_os_str().is_empty() {
            return Err(SetupError::config("catalog_dir must not be empty"));
        }
        if let Some(locale) = &self.locale {
            if !is_locale_tag(locale) {
                return Err(SetupError::config(format!(
                    "locale '{}' must look like en-US",
                    locale
                )));
            }
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
        }
    }

    pub fn catalog_path(&self, file_name: &str) -> PathBuf {
        self.catalog_dir.join(file_name)
    }
}

/// `xx-YY`: two lowercase letters, a dash, two uppercase letters
fn is_locale_tag(locale: &str) -> bool {
    let bytes = locale.as_bytes();
    bytes.len() == 5
        && bytes[0].is_ascii_lowercase()
        && bytes[1].is_ascii_lowercase()
        && bytes[2] == b'-'
        && bytes[3].is_ascii_uppercase()
        && bytes[4].is_ascii_uppercase()
}
