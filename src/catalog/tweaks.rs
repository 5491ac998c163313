//! Tweaks catalog: registry writes and system commands.

use serde::{Deserialize, Serialize};

use super::{Catalog, CatalogEntry, Category, Group};
use crate::types::{CatalogKind, RegistryData, RegistryPath, RegistryValueType};

/// One registry value write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryValue {
    /// Key path, e.g. `HKCU:\Software\Microsoft\Windows\CurrentVersion\Search`
    pub path: String,
    /// Value name
    pub name: String,
    pub value: serde_json::Value,
    /// Parsed when the value is written, so one bad spelling fails only
    /// its own tweak
    #[serde(rename = "type")]
    pub value_type: String,
}

impl RegistryValue {
    pub fn key_path(&self) -> Result<RegistryPath, String> {
        self.path.parse()
    }

    pub fn kind(&self) -> Result<RegistryValueType, String> {
        self.value_type.parse()
    }

    pub fn data(&self) -> Result<RegistryData, String> {
        RegistryData::from_json(self.kind()?, &self.value)
    }
}

/// A tweak. Its name doubles as its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweakEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommended: bool,
    /// Informational only: shown in menus, never applied
    #[serde(default)]
    pub info: bool,
    #[serde(default)]
    pub registry: Option<Vec<RegistryValue>>,
    #[serde(default)]
    pub power_config: Option<Vec<String>>,
}

impl TweakEntry {
    /// Registry writes, if the tweak carries a non-empty registry phase
    pub fn registry_phase(&self) -> Option<&[RegistryValue]> {
        self.registry.as_deref().filter(|values| !values.is_empty())
    }

    /// System commands, if the tweak carries a non-empty command phase
    pub fn command_phase(&self) -> Option<&[String]> {
        self.power_config.as_deref().filter(|cmds| !cmds.is_empty())
    }
}

impl CatalogEntry for TweakEntry {
    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recommended(&self) -> bool {
        self.recommended
    }
}

/// `{ categories: [ { name, description, tweaks: [...] } ] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweaksCatalog {
    pub categories: Vec<Category<TweakEntry>>,
}

impl Catalog for TweaksCatalog {
    type Entry = TweakEntry;

    const KIND: CatalogKind = CatalogKind::Tweaks;

    fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn groups(&self) -> Vec<Group<'_, TweakEntry>> {
        self.categories
            .iter()
            .map(|c| Group {
                name: &c.name,
                description: &c.description,
                entries: c.entries.iter().collect(),
            })
            .collect()
    }
}
