//! Bloatware catalog: preinstalled Appx packages and OneDrive.
//!
//! The document is flat (`bloatware`, `protected`, optional `onedrive`), so
//! it is parsed into a raw document first and then turned into a list of
//! `BloatwareItem`s. OneDrive is not an Appx package and becomes its own
//! item variant with a dedicated removal path.

use serde::{Deserialize, Serialize};

use super::{Catalog, CatalogEntry, Group};
use crate::types::CatalogKind;

/// winget id and display name used for the OneDrive item
pub const ONEDRIVE_ID: &str = "Microsoft.OneDrive";
pub const ONEDRIVE_NAME: &str = "Microsoft OneDrive";

/// A preinstalled Appx package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloatwareEntry {
    /// Appx package name, e.g. `Microsoft.BingNews`
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneDriveOption {
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Deserialize)]
struct BloatwareDocument {
    bloatware: Vec<BloatwareEntry>,
    #[serde(default)]
    protected: Vec<String>,
    #[serde(default)]
    onedrive: Option<OneDriveOption>,
}

/// Something that can be removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BloatwareItem {
    App(BloatwareEntry),
    OneDrive { recommended: bool },
}

impl CatalogEntry for BloatwareItem {
    fn id(&self) -> &str {
        match self {
            Self::App(entry) => &entry.id,
            Self::OneDrive { .. } => ONEDRIVE_ID,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::App(entry) => &entry.name,
            Self::OneDrive { .. } => ONEDRIVE_NAME,
        }
    }

    fn description(&self) -> &str {
        match self {
            Self::App(entry) => &entry.description,
            Self::OneDrive { .. } => "Cloud sync client (uninstalled with its own setup program)",
        }
    }

    fn recommended(&self) -> bool {
        match self {
            Self::App(entry) => entry.recommended,
            Self::OneDrive { recommended } => *recommended,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloatwareCatalog {
    pub items: Vec<BloatwareItem>,
    /// Identifier substrings that must never be removed
    pub protected: Vec<String>,
}

impl Catalog for BloatwareCatalog {
    type Entry = BloatwareItem;

    const KIND: CatalogKind = CatalogKind::Bloatware;

    fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let doc: BloatwareDocument = serde_json::from_str(json)?;
        let mut items: Vec<BloatwareItem> =
            doc.bloatware.into_iter().map(BloatwareItem::App).collect();
        if let Some(onedrive) = doc.onedrive {
            items.push(BloatwareItem::OneDrive {
                recommended: onedrive.recommended,
            });
        }
        Ok(Self {
            items,
            protected: doc.protected,
        })
    }

    fn groups(&self) -> Vec<Group<'_, BloatwareItem>> {
        vec![Group {
            name: "Preinstalled apps",
            description: "Applications shipped with Windows",
            entries: self.items.iter().collect(),
        }]
    }
}
