//! Per-entry actions for the three subsystems.
//!
//! Each action borrows the collaborators it needs for the duration of one
//! batch and returns an `Outcome` per entry. Collaborator errors that the
//! action can classify are turned into `Failed`/`Skipped` here; anything
//! else is propagated with `?` and contained by the batch executor.

pub mod bloatware;
pub mod software;
pub mod tweaks;

pub use bloatware::{BloatwareRemover, is_protected};
pub use software::SoftwareInstaller;
pub use tweaks::{RegistryBackup, TweakApplier, combine};
