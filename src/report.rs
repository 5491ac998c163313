//! Console progress output and the session report.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::executor::Reporter;
use crate::outcome::OperationResult;
use crate::types::CatalogKind;

/// Prints `[i/n] Installing Firefox` lines and a summary per batch
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// Console write errors are ignored: progress output must not affect the run
impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_progress(&mut self, kind: CatalogKind, current: usize, total: usize, label: &str) {
        let _ = writeln!(self.out, "[{}/{}] {} {}", current, total, kind.verb(), label);
        let _ = self.out.flush();
    }

    fn on_batch_complete(&mut self, kind: CatalogKind, result: &OperationResult) {
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "--- {} summary ---", kind);
        let _ = write!(self.out, "{}", result);
        let _ = self.out.flush();
    }
}

/// Results of one session, one slot per subsystem.
///
/// A `None` slot means the subsystem did not run (not selected, or its
/// catalog could not be loaded).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unix seconds at session start
    pub started_at: u64,
    pub dry_run: bool,
    pub software: Option<OperationResult>,
    pub tweaks: Option<OperationResult>,
    pub bloatware: Option<OperationResult>,
    /// Merge of all subsystem results, in run order
    pub total: OperationResult,
}

impl SessionReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            dry_run,
            ..Self::default()
        }
    }

    /// Store one subsystem's result and fold it into the total
    pub fn record(&mut self, kind: CatalogKind, result: OperationResult) {
        self.total.merge(&result);
        let slot = match kind {
            CatalogKind::Software => &mut self.software,
            CatalogKind::Tweaks => &mut self.tweaks,
            CatalogKind::Bloatware => &mut self.bloatware,
        };
        *slot = Some(result);
    }

    pub fn get(&self, kind: CatalogKind) -> Option<&OperationResult> {
        match kind {
            CatalogKind::Software => self.software.as_ref(),
            CatalogKind::Tweaks => self.tweaks.as_ref(),
            CatalogKind::Bloatware => self.bloatware.as_ref(),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.total.has_failures()
    }

    /// Write the report as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
