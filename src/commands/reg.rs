//! Typed arguments for `reg.exe`.

use std::path::PathBuf;

use super::CommandArgs;
use crate::types::{RegistryData, RegistryPath, RegistryValueType};

/// `reg add <key> /v <name> /t <type> /d <data> /f`
#[derive(Debug, Clone)]
pub struct RegAddArgs {
    pub path: RegistryPath,
    pub name: String,
    pub value_type: RegistryValueType,
    pub data: RegistryData,
}

impl CommandArgs for RegAddArgs {
    fn program(&self) -> &str {
        "reg"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "add".to_string(),
            self.path.to_string(),
            "/v".to_string(),
            self.name.clone(),
            "/t".to_string(),
            self.value_type.reg_tool_name().to_string(),
            "/d".to_string(),
            self.data.to_reg_tool_data(),
            "/f".to_string(),
        ]
    }
}

/// `reg export <key> <file> /y`
#[derive(Debug, Clone)]
pub struct RegExportArgs {
    pub path: RegistryPath,
    pub dest: PathBuf,
}

impl CommandArgs for RegExportArgs {
    fn program(&self) -> &str {
        "reg"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "export".to_string(),
            self.path.to_string(),
            self.dest.display().to_string(),
            "/y".to_string(),
        ]
    }
}
