//! Per-entry outcomes and the three-bucket result aggregator.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

/// Classification of one processed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failed,
    /// Already satisfied, protected, or informational only
    Skipped,
}

/// Outcome of a batch: entry names in three ordered buckets.
///
/// Buckets are append-only. Every processed entry appears in exactly one
/// bucket, once per batch. Names are the join key, so two entries with the
/// same display name in different catalogs show up twice after a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
}

impl OperationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome, name: impl Into<String>) {
        let bucket = match outcome {
            Outcome::Success => &mut self.success,
            Outcome::Failed => &mut self.failed,
            Outcome::Skipped => &mut self.skipped,
        };
        bucket.push(name.into());
    }

    /// Append another batch's buckets after this one's (no deduplication)
    pub fn merge(&mut self, other: &OperationResult) {
        self.success.extend(other.success.iter().cloned());
        self.failed.extend(other.failed.iter().cloned());
        self.skipped.extend(other.skipped.iter().cloned());
    }

    pub fn merged(mut self, other: &OperationResult) -> Self {
        self.merge(other);
        self
    }

    /// Number of processed entries
    pub fn total(&self) -> usize {
        self.success.len() + self.failed.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Success: {}  Failed: {}  Skipped: {}",
            self.success.len(),
            self.failed.len(),
            self.skipped.len()
        )?;
        for (label, names) in [
            ("✓", &self.success),
            ("✗", &self.failed),
            ("-", &self.skipped),
        ] {
            for name in names {
                writeln!(f, "  {} {}", label, name)?;
            }
        }
        Ok(())
    }
}
