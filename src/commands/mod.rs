//! Type-safe external command contracts.
//!
//! Every external program winsetup runs (winget, reg.exe, PowerShell, cmd,
//! tasklist/taskkill, uninstallers) is described by a struct implementing
//! `CommandArgs`. The struct IS the contract: it decides the program and the
//! exact argv, so flag spelling is checked by the compiler instead of being
//! assembled ad hoc at call sites.
//!
//! Execution goes through `runner::CommandRunner::run`, never through
//! `std::process::Command` directly.

pub mod powershell;
pub mod reg;
pub mod shell;
pub mod winget;

use crate::error::{Result, SetupError};

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: executable name or path.
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `mutates_system()`: whether the command changes machine state. Dry-run
///   mode skips mutating commands and still runs read-only queries.
/// - `raw_args()`: pass arguments verbatim (no re-quoting). Needed for
///   `cmd /C`, whose parser does not follow the MSVC quoting rules.
pub trait CommandArgs {
    fn program(&self) -> &str;

    fn to_cli_args(&self) -> Vec<String>;

    fn mutates_system(&self) -> bool {
        true
    }

    fn raw_args(&self) -> bool {
        false
    }
}

/// Reject identifiers that could break out of a quoted shell context.
///
/// Package ids and Appx names only ever contain letters, digits and
/// `.`, `-`, `_`, `+`, `*`.
pub fn validate_identifier(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(SetupError::validation("identifier is empty"));
    }
    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+' | '*')))
    {
        return Err(SetupError::validation(format!(
            "invalid character {:?} in identifier {:?}",
            bad, id
        )));
    }
    Ok(())
}
