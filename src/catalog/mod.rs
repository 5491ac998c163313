//! Declarative catalogs: software, tweaks and bloatware.
//!
//! Each catalog is a JSON document parsed into typed entries. All three share
//! the `Catalog` / `CatalogEntry` traits so selection and batch execution
//! are written once.
//!
//! # Loading Policy
//!
//! `load_catalog` never fails loudly: a missing or malformed document yields
//! `None` after logging the `CatalogError`. The caller skips that subsystem
//! and the rest of the session carries on. `try_load_catalog` exposes the
//! typed error for strict callers, and `check_catalog` backs the `validate`
//! command.

pub mod bloatware;
pub mod software;
pub mod tweaks;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::types::CatalogKind;

pub use bloatware::{BloatwareCatalog, BloatwareEntry, BloatwareItem};
pub use software::{SoftwareCatalog, SoftwareEntry};
pub use tweaks::{RegistryValue, TweakEntry, TweaksCatalog};

/// Errors raised while loading a catalog document
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid catalog {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// One selectable unit of a catalog
pub trait CatalogEntry {
    /// External identifier (winget id, Appx name, or tweak name)
    fn id(&self) -> &str;
    /// Display name; also the key under which results are reported
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn recommended(&self) -> bool;
}

/// A named grouping of entries, used for interactive navigation only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category<E> {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "packages", alias = "tweaks")]
    pub entries: Vec<E>,
}

/// Borrowed view of one category
#[derive(Debug, Clone)]
pub struct Group<'a, E> {
    pub name: &'a str,
    pub description: &'a str,
    pub entries: Vec<&'a E>,
}

/// A loaded, immutable catalog
pub trait Catalog: Sized {
    type Entry: CatalogEntry;

    const KIND: CatalogKind;

    /// Parse the JSON document. Missing required keys are parse errors.
    fn parse(json: &str) -> Result<Self, serde_json::Error>;

    /// Categories in document order
    fn groups(&self) -> Vec<Group<'_, Self::Entry>>;

    /// Every entry in catalog order (category order, then entry order)
    fn entries(&self) -> Vec<&Self::Entry> {
        self.groups().into_iter().flat_map(|g| g.entries).collect()
    }

    fn category_count(&self) -> usize {
        self.groups().len()
    }

    fn entry_count(&self) -> usize {
        self.groups().iter().map(|g| g.entries.len()).sum()
    }

    /// Structural checks beyond what serde enforces.
    ///
    /// Identifiers must be unique within a catalog.
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for entry in self.entries() {
            if !seen.insert(entry.id()) {
                return Err(format!("duplicate entry id '{}'", entry.id()));
            }
        }
        Ok(())
    }
}

/// Load a catalog, returning the typed error on failure.
pub fn try_load_catalog<C: Catalog>(path: &Path) -> Result<C, CatalogError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::NotFound {
            path: path.to_path_buf(),
        },
        _ => CatalogError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let catalog = C::parse(&content).map_err(|e| CatalogError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    catalog.validate().map_err(|reason| CatalogError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;

    info!(
        "Loaded {} catalog from {}: {} categories, {} entries",
        C::KIND,
        path.display(),
        catalog.category_count(),
        catalog.entry_count()
    );
    Ok(catalog)
}

/// Strictly load the catalog of `kind` at `path`.
///
/// Returns its category and entry counts.
pub fn check_catalog(kind: CatalogKind, path: &Path) -> crate::error::Result<(usize, usize)> {
    fn counts<C: Catalog>(path: &Path) -> crate::error::Result<(usize, usize)> {
        let catalog: C = try_load_catalog(path)?;
        Ok((catalog.category_count(), catalog.entry_count()))
    }

    match kind {
        CatalogKind::Software => counts::<SoftwareCatalog>(path),
        CatalogKind::Tweaks => counts::<TweaksCatalog>(path),
        CatalogKind::Bloatware => counts::<BloatwareCatalog>(path),
    }
}

/// Load a catalog, or `None` if it could not be loaded.
///
/// The error is logged; nothing escapes to the caller.
pub fn load_catalog<C: Catalog>(path: &Path) -> Option<C> {
    match try_load_catalog(path) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            error!("{} catalog not loaded: {}", C::KIND, e);
            None
        }
    }
}
