//! Eligibility filter
//!
//! Turns a catalog plus a selection mode into the ordered list of entries a
//! batch will process. Pure logic: no I/O, no prompts. Interactive flows
//! own their UI and hand the chosen entries back through
//! `Selection::Explicit`.

use crate::catalog::{Catalog, CatalogEntry};

/// How entries are chosen for a batch
#[derive(Debug, Clone)]
pub enum Selection<'a, E> {
    /// Every entry flagged `recommended`, in catalog order
    RecommendedOnly,
    /// Exactly these entries, in this order
    Explicit(Vec<&'a E>),
}

/// Produce the ordered entry list for a batch.
///
/// An empty result is valid and means "nothing to do".
pub fn filter<'a, C: Catalog>(catalog: &'a C, selection: &Selection<'a, C::Entry>) -> Vec<&'a C::Entry> {
    match selection {
        Selection::RecommendedOnly => catalog
            .entries()
            .into_iter()
            .filter(|entry| entry.recommended())
            .collect(),
        Selection::Explicit(chosen) => chosen.clone(),
    }
}

/// Match user-typed names or ids against a catalog.
///
/// Matching is case-insensitive on either the display name or the id.
/// Returns the matched entries in catalog order and the inputs that matched
/// nothing.
pub fn resolve_names<'a, C: Catalog>(catalog: &'a C, names: &[String]) -> (Vec<&'a C::Entry>, Vec<String>) {
    let wanted: Vec<String> = names.iter().map(|n| n.trim().to_lowercase()).collect();
    let matches_entry = |needle: &str, entry: &C::Entry| {
        entry.name().to_lowercase() == needle || entry.id().to_lowercase() == needle
    };

    let matched: Vec<&C::Entry> = catalog
        .entries()
        .into_iter()
        .filter(|entry| wanted.iter().any(|w| matches_entry(w.as_str(), *entry)))
        .collect();

    let unknown = names
        .iter()
        .zip(&wanted)
        .filter(|(_, w)| !matched.iter().any(|entry| matches_entry(w.as_str(), *entry)))
        .map(|(original, _)| original.clone())
        .collect();

    (matched, unknown)
}
