//! Shared value types for winsetup
//!
//! Catalog kinds and registry vocabulary as proper Rust enums. Registry
//! value types parse case-insensitively when a value is written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

/// The three catalogs (and subsystems) a session can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, clap::ValueEnum)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Software,
    Tweaks,
    Bloatware,
}

impl CatalogKind {
    /// Default file name inside the catalog directory
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Software => "software.json",
            Self::Tweaks => "tweaks.json",
            Self::Bloatware => "bloatware.json",
        }
    }

    /// Verb shown in progress lines
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Software => "Installing",
            Self::Tweaks => "Applying",
            Self::Bloatware => "Removing",
        }
    }
}

/// Registry value type as written in the tweaks catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RegistryValueType {
    #[strum(serialize = "DWord")]
    DWord,
    #[strum(serialize = "QWord")]
    QWord,
    #[strum(serialize = "String")]
    String,
    #[strum(serialize = "ExpandString")]
    ExpandString,
    #[strum(serialize = "MultiString")]
    MultiString,
    #[strum(serialize = "Binary")]
    Binary,
}

impl FromStr for RegistryValueType {
    type Err = String;

    /// Case-insensitive; accepts PowerShell names (`DWord`, `ExpandString`)
    /// and `reg.exe` names (`REG_DWORD`, `REG_EXPAND_SZ`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("REG_").unwrap_or(&upper);
        match name {
            "DWORD" => Ok(Self::DWord),
            "QWORD" => Ok(Self::QWord),
            "STRING" | "SZ" => Ok(Self::String),
            "EXPANDSTRING" | "EXPAND_SZ" => Ok(Self::ExpandString),
            "MULTISTRING" | "MULTI_SZ" => Ok(Self::MultiString),
            "BINARY" => Ok(Self::Binary),
            _ => Err(format!("Unknown registry value type: {}", s)),
        }
    }
}

impl RegistryValueType {
    /// Type name understood by `reg.exe /t`
    pub const fn reg_tool_name(self) -> &'static str {
        match self {
            Self::DWord => "REG_DWORD",
            Self::QWord => "REG_QWORD",
            Self::String => "REG_SZ",
            Self::ExpandString => "REG_EXPAND_SZ",
            Self::MultiString => "REG_MULTI_SZ",
            Self::Binary => "REG_BINARY",
        }
    }
}

/// Registry root key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Hive {
    #[strum(serialize = "HKCU")]
    CurrentUser,
    #[strum(serialize = "HKLM")]
    LocalMachine,
    #[strum(serialize = "HKCR")]
    ClassesRoot,
    #[strum(serialize = "HKU")]
    Users,
    #[strum(serialize = "HKCC")]
    CurrentConfig,
}

impl FromStr for Hive {
    type Err = String;

    /// Accepts short (`HKCU`), long (`HKEY_CURRENT_USER`) and PowerShell
    /// drive (`HKCU:`) spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_end_matches(':').to_ascii_uppercase();
        match trimmed.as_str() {
            "HKCU" | "HKEY_CURRENT_USER" => Ok(Self::CurrentUser),
            "HKLM" | "HKEY_LOCAL_MACHINE" => Ok(Self::LocalMachine),
            "HKCR" | "HKEY_CLASSES_ROOT" => Ok(Self::ClassesRoot),
            "HKU" | "HKEY_USERS" => Ok(Self::Users),
            "HKCC" | "HKEY_CURRENT_CONFIG" => Ok(Self::CurrentConfig),
            _ => Err(format!("Unknown registry hive: {}", s)),
        }
    }
}

/// A registry key path split into hive and subkey
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryPath {
    pub hive: Hive,
    pub subkey: String,
}

impl FromStr for RegistryPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('/', "\\");
        let (root, rest) = match normalized.split_once('\\') {
            Some((root, rest)) => (root, rest),
            None => (normalized.as_str(), ""),
        };
        let hive: Hive = root.parse()?;
        let subkey = rest.trim_matches('\\').to_string();
        if subkey.is_empty() {
            return Err(format!("Registry path has no subkey: {}", s));
        }
        Ok(Self { hive, subkey })
    }
}

impl fmt::Display for RegistryPath {
    /// Formats as `reg.exe` expects: `HKCU\Software\...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.hive, self.subkey)
    }
}

/// Typed registry payload, converted from the catalog's JSON value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryData {
    DWord(u32),
    QWord(u64),
    String(String),
    ExpandString(String),
    MultiString(Vec<String>),
    Binary(Vec<u8>),
}

impl RegistryData {
    /// Convert a catalog JSON value according to its declared type.
    ///
    /// Numbers may be given as JSON numbers, decimal strings or `0x` hex
    /// strings. Binary data accepts an array of bytes or a hex string
    /// (separators `,` and spaces are ignored).
    pub fn from_json(kind: RegistryValueType, value: &serde_json::Value) -> Result<Self, String> {
        use serde_json::Value;

        match kind {
            RegistryValueType::DWord => {
                let n = json_to_u64(value)?;
                u32::try_from(n)
                    .map(Self::DWord)
                    .map_err(|_| format!("DWord value out of range: {}", n))
            }
            RegistryValueType::QWord => json_to_u64(value).map(Self::QWord),
            RegistryValueType::String => Ok(Self::String(json_to_string(value))),
            RegistryValueType::ExpandString => Ok(Self::ExpandString(json_to_string(value))),
            RegistryValueType::MultiString => match value {
                Value::Array(items) => Ok(Self::MultiString(items.iter().map(json_to_string).collect())),
                other => Ok(Self::MultiString(vec![json_to_string(other)])),
            },
            RegistryValueType::Binary => match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_u64()
                            .and_then(|b| u8::try_from(b).ok())
                            .ok_or_else(|| format!("Invalid byte in binary value: {}", item))
                    })
                    .collect::<Result<Vec<u8>, String>>()
                    .map(Self::Binary),
                Value::String(s) => parse_hex_bytes(s).map(Self::Binary),
                other => Err(format!("Invalid binary value: {}", other)),
            },
        }
    }

    /// Data argument for `reg add /d`
    pub fn to_reg_tool_data(&self) -> String {
        match self {
            Self::DWord(v) => v.to_string(),
            Self::QWord(v) => v.to_string(),
            Self::String(s) | Self::ExpandString(s) => s.clone(),
            Self::MultiString(items) => items.join("\\0"),
            Self::Binary(bytes) => bytes.iter().map(|b| format!("{:02X}", b)).collect(),
        }
    }
}

fn json_to_u64(value: &serde_json::Value) -> Result<u64, String> {
    use serde_json::Value;

    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| format!("Expected a non-negative integer, got {}", n)),
        Value::String(s) => {
            let s = s.trim();
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse::<u64>(),
            };
            parsed.map_err(|_| format!("Expected an integer, got {:?}", s))
        }
        Value::Bool(b) => Ok(u64::from(*b)),
        other => Err(format!("Expected an integer, got {}", other)),
    }
}

fn json_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let digits: String = s.chars().filter(|c| !matches!(c, ',' | ' ')).collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Invalid hex in binary value: {}", s));
    }
    if digits.len() % 2 != 0 {
        return Err(format!("Odd number of hex digits in binary value: {}", s));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| format!("Invalid hex in binary value: {}", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_kind_parse_and_display() {
        assert_eq!("software".parse::<CatalogKind>().unwrap(), CatalogKind::Software);
        assert_eq!("Tweaks".parse::<CatalogKind>().unwrap(), CatalogKind::Tweaks);
        assert_eq!(CatalogKind::Bloatware.to_string(), "bloatware");
        assert_eq!(CatalogKind::Bloatware.file_name(), "bloatware.json");
    }

    #[test]
    fn test_hive_spellings() {
        assert_eq!("HKCU:".parse::<Hive>().unwrap(), Hive::CurrentUser);
        assert_eq!("HKEY_LOCAL_MACHINE".parse::<Hive>().unwrap(), Hive::LocalMachine);
        assert_eq!("hklm".parse::<Hive>().unwrap(), Hive::LocalMachine);
        assert!("HKXX".parse::<Hive>().is_err());
    }

    #[test]
    fn test_registry_path_parse() {
        let path: RegistryPath = "HKCU:\\Software\\Microsoft\\Windows".parse().unwrap();
        assert_eq!(path.hive, Hive::CurrentUser);
        assert_eq!(path.subkey, "Software\\Microsoft\\Windows");
        assert_eq!(path.to_string(), "HKCU\\Software\\Microsoft\\Windows");

        let long: RegistryPath = "HKEY_LOCAL_MACHINE\\SOFTWARE\\Policies\\".parse().unwrap();
        assert_eq!(long.hive, Hive::LocalMachine);
        assert_eq!(long.subkey, "SOFTWARE\\Policies");
    }

    #[test]
    fn test_registry_path_requires_subkey() {
        assert!("HKCU:\\".parse::<RegistryPath>().is_err());
        assert!("HKCU".parse::<RegistryPath>().is_err());
    }

    #[test]
    fn test_value_type_spellings() {
        for spelling in ["DWord", "Dword", "DWORD", "REG_DWORD", "REG_dword"] {
            assert_eq!(
                spelling.parse::<RegistryValueType>().unwrap(),
                RegistryValueType::DWord,
                "{}",
                spelling
            );
        }
        assert_eq!("REG_SZ".parse::<RegistryValueType>().unwrap(), RegistryValueType::String);
        assert_eq!(
            "reg_expand_sz".parse::<RegistryValueType>().unwrap(),
            RegistryValueType::ExpandString
        );
        assert_eq!("Qword".parse::<RegistryValueType>().unwrap(), RegistryValueType::QWord);
        assert!("Float".parse::<RegistryValueType>().is_err());
        assert_eq!(RegistryValueType::QWord.reg_tool_name(), "REG_QWORD");
    }

    #[test]
    fn test_dword_conversion() {
        assert_eq!(
            RegistryData::from_json(RegistryValueType::DWord, &json!(1)).unwrap(),
            RegistryData::DWord(1)
        );
        assert_eq!(
            RegistryData::from_json(RegistryValueType::DWord, &json!("0xFF")).unwrap(),
            RegistryData::DWord(255)
        );
        assert!(RegistryData::from_json(RegistryValueType::DWord, &json!(-1)).is_err());
        assert!(RegistryData::from_json(RegistryValueType::DWord, &json!(4294967296u64)).is_err());
    }

    #[test]
    fn test_binary_conversion() {
        assert_eq!(
            RegistryData::from_json(RegistryValueType::Binary, &json!("01,0a ff")).unwrap(),
            RegistryData::Binary(vec![0x01, 0x0a, 0xff])
        );
        assert_eq!(
            RegistryData::from_json(RegistryValueType::Binary, &json!([1, 2])).unwrap(),
            RegistryData::Binary(vec![1, 2])
        );
        assert!(RegistryData::from_json(RegistryValueType::Binary, &json!("abc")).is_err());
    }

    #[test]
    fn test_reg_tool_data() {
        assert_eq!(RegistryData::DWord(0).to_reg_tool_data(), "0");
        assert_eq!(
            RegistryData::MultiString(vec!["a".into(), "b".into()]).to_reg_tool_data(),
            "a\\0b"
        );
        assert_eq!(RegistryData::Binary(vec![0xde, 0xad]).to_reg_tool_data(), "DEAD");
    }
}
