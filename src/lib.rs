//! winsetup library
//!
//! Catalog-driven setup of a Windows workstation: install software through
//! winget, apply registry and system tweaks, remove preinstalled apps.

pub mod actions;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod menu;
pub mod outcome;
pub mod report;
pub mod retry;
pub mod runner;
pub mod sanity;
pub mod selection;
pub mod session;
pub mod system;
pub mod types;

// Re-export main types for convenience
pub use catalog::{
    BloatwareCatalog, BloatwareItem, Catalog, CatalogEntry, CatalogError, SoftwareCatalog,
    SoftwareEntry, TweakEntry, TweaksCatalog, check_catalog, load_catalog, try_load_catalog,
};
pub use commands::CommandArgs;
pub use config::SetupConfig;
pub use error::SetupError;
pub use executor::{BatchExecutor, Reporter, SilentReporter};
pub use outcome::{OperationResult, Outcome};
pub use report::{ConsoleReporter, SessionReport};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper, install_with_retry};
pub use runner::{CommandOutput, CommandRunner};
pub use selection::{Selection, filter, resolve_names};
pub use session::{Mode, Services, Session};
pub use types::CatalogKind;
