//! Batch executor
//!
//! Runs one action per entry, in order, and classifies each result into the
//! three buckets of an `OperationResult`.
//!
//! # Failure Containment
//!
//! Nothing that happens inside one entry can stop the batch. An `Err`
//! returned by the action and a panic raised by it are both caught at the
//! entry boundary, logged, and recorded as `Failed` for that entry only.
//!
//! # Protection
//!
//! When a protection check is supplied and matches, the entry is recorded
//! as `Skipped` and its action is never invoked.

use std::panic::{self, AssertUnwindSafe};
use tracing::{error, info, warn};

use crate::catalog::CatalogEntry;
use crate::outcome::{OperationResult, Outcome};
use crate::types::CatalogKind;

/// Progress and completion sink.
///
/// Calls are side-channel notifications: they cannot fail and do not
/// influence control flow.
pub trait Reporter {
    /// Called before each entry is handled; `current` is 1-based
    fn on_progress(&mut self, kind: CatalogKind, current: usize, total: usize, label: &str);

    fn on_batch_complete(&mut self, kind: CatalogKind, result: &OperationResult);
}

/// Discards all notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn on_progress(&mut self, _kind: CatalogKind, _current: usize, _total: usize, _label: &str) {}

    fn on_batch_complete(&mut self, _kind: CatalogKind, _result: &OperationResult) {}
}

/// Sequential, single-threaded batch runner
pub struct BatchExecutor<'r> {
    kind: CatalogKind,
    reporter: &'r mut dyn Reporter,
}

impl<'r> BatchExecutor<'r> {
    pub fn new(kind: CatalogKind, reporter: &'r mut dyn Reporter) -> Self {
        Self { kind, reporter }
    }

    /// Process `entries` in order.
    ///
    /// An empty list short-circuits: no notifications, empty result.
    pub fn run<E, A>(
        &mut self,
        entries: &[&E],
        mut action: A,
        protection: Option<&dyn Fn(&E) -> bool>,
    ) -> OperationResult
    where
        E: CatalogEntry,
        A: FnMut(&E) -> anyhow::Result<Outcome>,
    {
        let mut result = OperationResult::new();
        if entries.is_empty() {
            info!("{}: nothing selected", self.kind);
            return result;
        }

        let total = entries.len();
        info!("{}: processing {} entries", self.kind, total);

        for (index, entry) in entries.iter().copied().enumerate() {
            let name = entry.name();
            self.reporter.on_progress(self.kind, index + 1, total, name);

            if protection.is_some_and(|is_protected| is_protected(entry)) {
                info!("{} is protected, skipping", name);
                result.record(Outcome::Skipped, name);
                continue;
            }

            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| action(entry))) {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    error!("{}: {:#}", name, e);
                    Outcome::Failed
                }
                Err(payload) => {
                    error!("{}: unexpected panic: {}", name, panic_message(payload.as_ref()));
                    Outcome::Failed
                }
            };

            if outcome == Outcome::Failed {
                warn!("{} failed", name);
            } else {
                info!("{}: {}", name, outcome);
            }
            result.record(outcome, name);
        }

        self.reporter.on_batch_complete(self.kind, &result);
        result
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
