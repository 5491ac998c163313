//! Typed arguments for `winget`.

use super::CommandArgs;

/// `winget install --id <id> --exact --silent ...`
#[derive(Debug, Clone)]
pub struct WingetInstallArgs {
    pub id: String,
    /// Installer locale, e.g. `de-DE`
    pub locale: Option<String>,
    /// Pass `--force`; used once after a hash mismatch
    pub force: bool,
}

impl CommandArgs for WingetInstallArgs {
    fn program(&self) -> &str {
        "winget"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            "install".to_string(),
            "--id".to_string(),
            self.id.clone(),
            "--exact".to_string(),
            "--silent".to_string(),
            "--accept-package-agreements".to_string(),
            "--accept-source-agreements".to_string(),
            "--disable-interactivity".to_string(),
        ];
        if let Some(ref locale) = self.locale {
            args.push("--locale".to_string());
            args.push(locale.clone());
        }
        if self.force {
            args.push("--force".to_string());
        }
        args
    }
}

/// `winget list --id <id> --exact` (read-only)
#[derive(Debug, Clone)]
pub struct WingetListArgs {
    pub id: String,
}

impl CommandArgs for WingetListArgs {
    fn program(&self) -> &str {
        "winget"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "list".to_string(),
            "--id".to_string(),
            self.id.clone(),
            "--exact".to_string(),
            "--accept-source-agreements".to_string(),
            "--disable-interactivity".to_string(),
        ]
    }

    fn mutates_system(&self) -> bool {
        false
    }
}

/// `winget uninstall --id <id> --exact --silent`
#[derive(Debug, Clone)]
pub struct WingetUninstallArgs {
    pub id: String,
}

impl CommandArgs for WingetUninstallArgs {
    fn program(&self) -> &str {
        "winget"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "uninstall".to_string(),
            "--id".to_string(),
            self.id.clone(),
            "--exact".to_string(),
            "--silent".to_string(),
            "--accept-source-agreements".to_string(),
            "--disable-interactivity".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_args_minimal() {
        let args = WingetInstallArgs {
            id: "Mozilla.Firefox".to_string(),
            locale: None,
            force: false,
        };
        let cli = args.to_cli_args();
        assert_eq!(&cli[..4], ["install", "--id", "Mozilla.Firefox", "--exact"]);
        assert!(!cli.contains(&"--force".to_string()));
        assert!(!cli.contains(&"--locale".to_string()));
        assert!(args.mutates_system());
    }

    #[test]
    fn test_install_args_locale_and_force() {
        let args = WingetInstallArgs {
            id: "Mozilla.Firefox".to_string(),
            locale: Some("de-DE".to_string()),
            force: true,
        };
        let cli = args.to_cli_args();
        let pos = cli.iter().position(|a| a == "--locale").expect("locale flag");
        assert_eq!(cli[pos + 1], "de-DE");
        assert_eq!(cli.last().map(String::as_str), Some("--force"));
    }

    #[test]
    fn test_list_is_read_only() {
        let args = WingetListArgs { id: "X".to_string() };
        assert!(!args.mutates_system());
        assert_eq!(args.to_cli_args()[0], "list");
    }
}
