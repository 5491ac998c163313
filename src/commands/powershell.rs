//! Typed arguments for PowerShell one-liners.

use super::CommandArgs;

/// `powershell -NoProfile -NonInteractive -ExecutionPolicy Bypass -Command <script>`
#[derive(Debug, Clone)]
pub struct PowerShellArgs {
    pub script: String,
    pub mutates: bool,
}

impl PowerShellArgs {
    /// A script that only reads state (still runs in dry-run mode)
    pub fn query(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            mutates: false,
        }
    }

    /// A script that changes machine state
    pub fn action(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            mutates: true,
        }
    }
}

impl CommandArgs for PowerShellArgs {
    fn program(&self) -> &str {
        "powershell"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-ExecutionPolicy".to_string(),
            "Bypass".to_string(),
            "-Command".to_string(),
            self.script.clone(),
        ]
    }

    fn mutates_system(&self) -> bool {
        self.mutates
    }
}

/// Single-quote a string for PowerShell (embedded quotes are doubled)
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
