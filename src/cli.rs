use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::types::CatalogKind;

/// winsetup - catalog-driven Windows workstation setup
#[derive(Parser, Debug)]
#[command(name = "winsetup")]
#[command(about = "Install software, apply tweaks and remove bloatware from JSON catalogs")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: show what would be executed without making changes.
    ///
    /// Installs, removals, registry writes and system commands are skipped
    /// and logged. Read-only queries (installed packages, process list)
    /// still execute so the preview is realistic.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory containing software.json, tweaks.json and bloatware.json
    #[arg(long, global = true)]
    pub catalog_dir: Option<PathBuf>,

    /// Skip the Windows/administrator/winget checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recommended entries of all three catalogs, no prompts
    Auto {
        /// Do not create a system restore point first
        #[arg(long)]
        no_restore_point: bool,

        /// Write the session report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Install software from the software catalog
    Software(RunArgs),
    /// Apply tweaks from the tweaks catalog
    Tweaks(RunArgs),
    /// Remove preinstalled apps listed in the bloatware catalog
    Bloatware(RunArgs),
    /// Print a catalog's categories and entries
    List {
        #[arg(value_enum)]
        kind: CatalogKind,
    },
    /// Strictly load a catalog file and report problems
    Validate {
        #[arg(value_enum)]
        kind: CatalogKind,

        /// Path to the catalog file
        path: PathBuf,
    },
    /// Create a system restore point and exit
    RestorePoint {
        #[arg(short, long, default_value = "winsetup: manual checkpoint")]
        description: String,
    },
    /// Write a configuration file with default values
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

/// Selection options shared by the per-catalog commands
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Entry names or ids to process (repeatable); default is recommended
    #[arg(short, long = "select", value_name = "NAME")]
    pub select: Vec<String>,

    /// Choose entries from a menu
    #[arg(short, long, conflicts_with = "select")]
    pub interactive: bool,

    /// Do not create a system restore point first
    #[arg(long)]
    pub no_restore_point: bool,

    /// Write the session report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// True for commands that run a session or touch the system.
    /// Only these get a session log file.
    pub fn changes_system(&self) -> bool {
        !matches!(
            self.command,
            Some(Commands::List { .. } | Commands::Validate { .. } | Commands::InitConfig { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_no_args() {
        // Running with no args should succeed (defaults to interactive mode)
        let cli = Cli::try_parse_from(["winsetup"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_auto_with_report() {
        let cli = Cli::try_parse_from(["winsetup", "auto", "--report", "out.json", "--dry-run"]).unwrap();
        assert!(cli.dry_run);
        match cli.command {
            Some(Commands::Auto {
                no_restore_point,
                report,
            }) => {
                assert!(!no_restore_point);
                assert_eq!(report, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Auto command"),
        }
    }

    #[test]
    fn test_cli_software_select_repeatable() {
        let cli = Cli::try_parse_from([
            "winsetup",
            "software",
            "--select",
            "Firefox",
            "-s",
            "7-Zip",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Software(args)) => {
                assert_eq!(args.select, vec!["Firefox", "7-Zip"]);
                assert!(!args.interactive);
            }
            _ => panic!("Expected Software command"),
        }
    }

    #[test]
    fn test_cli_select_conflicts_with_interactive() {
        let result = Cli::try_parse_from(["winsetup", "tweaks", "--select", "X", "--interactive"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_validate_command() {
        let cli = Cli::try_parse_from(["winsetup", "validate", "bloatware", "catalogs/bloatware.json"]).unwrap();
        match cli.command {
            Some(Commands::Validate { kind, path }) => {
                assert_eq!(kind, CatalogKind::Bloatware);
                assert_eq!(path, PathBuf::from("catalogs/bloatware.json"));
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "winsetup",
            "list",
            "tweaks",
            "--catalog-dir",
            "C:\\catalogs",
            "--skip-preflight",
        ])
        .unwrap();
        assert_eq!(cli.catalog_dir, Some(PathBuf::from("C:\\catalogs")));
        assert!(cli.skip_preflight);
    }

    #[test]
    fn test_cli_utility_commands_leave_system_alone() {
        for args in [
            vec!["winsetup", "list", "software"],
            vec!["winsetup", "validate", "tweaks", "tweaks.json"],
            vec!["winsetup", "init-config", "winsetup.json"],
        ] {
            let cli = Cli::try_parse_from(&args).unwrap();
            assert!(!cli.changes_system(), "{:?}", args);
        }

        for args in [
            vec!["winsetup"],
            vec!["winsetup", "auto"],
            vec!["winsetup", "bloatware", "--dry-run"],
            vec!["winsetup", "restore-point"],
        ] {
            let cli = Cli::try_parse_from(&args).unwrap();
            assert!(cli.changes_system(), "{:?}", args);
        }
    }

    #[test]
    fn test_cli_unknown_kind_rejected() {
        assert!(Cli::try_parse_from(["winsetup", "list", "drivers"]).is_err());
    }
}
