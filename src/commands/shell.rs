//! Typed arguments for cmd.exe, process control and plain executables.

use std::path::PathBuf;

use super::CommandArgs;

/// `cmd /C <command>`: a system configuration command from the catalog
#[derive(Debug, Clone)]
pub struct CmdArgs {
    pub command: String,
}

impl CommandArgs for CmdArgs {
    fn program(&self) -> &str {
        "cmd"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["/C".to_string(), self.command.clone()]
    }

    fn raw_args(&self) -> bool {
        true
    }
}

/// `cmd /C start "" "<url>"`: hand a URL to the default browser
#[derive(Debug, Clone)]
pub struct OpenUrlArgs {
    pub url: String,
}

impl CommandArgs for OpenUrlArgs {
    fn program(&self) -> &str {
        "cmd"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "/C".to_string(),
            "start".to_string(),
            "\"\"".to_string(),
            format!("\"{}\"", self.url.replace('"', "")),
        ]
    }

    fn raw_args(&self) -> bool {
        true
    }
}

/// `tasklist /FI "IMAGENAME eq <image>" /NH` (read-only)
#[derive(Debug, Clone)]
pub struct TasklistArgs {
    pub image: String,
}

impl CommandArgs for TasklistArgs {
    fn program(&self) -> &str {
        "tasklist"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "/FI".to_string(),
            format!("IMAGENAME eq {}", self.image),
            "/NH".to_string(),
        ]
    }

    fn mutates_system(&self) -> bool {
        false
    }
}

/// `taskkill /F /IM <image>`
#[derive(Debug, Clone)]
pub struct TaskkillArgs {
    pub image: String,
}

impl CommandArgs for TaskkillArgs {
    fn program(&self) -> &str {
        "taskkill"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["/F".to_string(), "/IM".to_string(), self.image.clone()]
    }
}

/// Run an executable by path, e.g. an uninstaller
#[derive(Debug, Clone)]
pub struct ExecutableArgs {
    pub path: PathBuf,
    pub args: Vec<String>,
    program: String,
}

impl ExecutableArgs {
    pub fn new(path: PathBuf, args: Vec<String>) -> Self {
        let program = path.display().to_string();
        Self {
            path,
            args,
            program,
        }
    }
}

impl CommandArgs for ExecutableArgs {
    fn program(&self) -> &str {
        &self.program
    }

    fn to_cli_args(&self) -> Vec<String> {
        self.args.clone()
    }
}

/// `net session`: succeeds only in an elevated shell (read-only)
#[derive(Debug, Clone, Default)]
pub struct NetSessionArgs;

impl CommandArgs for NetSessionArgs {
    fn program(&self) -> &str {
        "net"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["session".to_string()]
    }

    fn mutates_system(&self) -> bool {
        false
    }
}

/// `where <program>`: locate a binary on PATH (read-only)
#[derive(Debug, Clone)]
pub struct WhereArgs {
    pub program: String,
}

impl CommandArgs for WhereArgs {
    fn program(&self) -> &str {
        "where"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![self.program.clone()]
    }

    fn mutates_system(&self) -> bool {
        false
    }
}
