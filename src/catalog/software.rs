//! Software catalog: packages installed through winget.

use serde::{Deserialize, Serialize};

use super::{Catalog, CatalogEntry, Category, Group};
use crate::types::CatalogKind;

/// A package to install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareEntry {
    /// winget package id, e.g. `Mozilla.Firefox`
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommended: bool,
    /// Not resolvable through winget; use the manual fallback instead
    #[serde(default)]
    pub winget_unavailable: bool,
    #[serde(default)]
    pub manual_url: Option<String>,
    #[serde(default)]
    pub manual_note: Option<String>,
}

impl SoftwareEntry {
    /// Manual fallback descriptor, present only for winget-unavailable entries
    pub fn manual_fallback(&self) -> Option<ManualFallback<'_>> {
        self.winget_unavailable.then(|| ManualFallback {
            url: self.manual_url.as_deref(),
            note: self.manual_note.as_deref(),
        })
    }
}

/// Where to send the user when winget cannot install an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualFallback<'a> {
    pub url: Option<&'a str>,
    pub note: Option<&'a str>,
}

impl CatalogEntry for SoftwareEntry {
    fn id(&self) -> &str {
        &self.id
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

/// `{ categories: [ { name, description, packages: [...] } ] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareCatalog {
    pub categories: Vec<Category<SoftwareEntry>>,
}

impl Catalog for SoftwareCatalog {
    type Entry = SoftwareEntry;

    const KIND: CatalogKind = CatalogKind::Software;

    fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn groups(&self) -> Vec<Group<'_, SoftwareEntry>> {
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
