//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// tasklog - log work from the terminal
#[derive(Parser, Debug)]
#[command(name = "tasklog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Upgrade the CLI
    Upgrade(UpgradeArgs),
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Upgrade command
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Check for updates only
    #[arg(long, conflicts_with_all = ["rollback", "status"])]
    pub check: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Release channel to follow instead of the configured one
    #[arg(long, value_parser = ["stable", "alpha", "beta", "rc"])]
    pub channel: Option<String>,

    /// Restore the binary from a backup left by a previous upgrade
    #[arg(long, value_name = "BACKUP", conflicts_with = "status")]
    pub rollback: Option<PathBuf>,

    /// Show update check settings and the last check time
    #[arg(long)]
    pub status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upgrade_flags() {
        let cli = Cli::try_parse_from(["tasklog", "-vv", "upgrade", "--channel", "beta", "-y"])
            .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Upgrade(args) => {
                assert_eq!(args.channel.as_deref(), Some("beta"));
                assert!(args.yes);
                assert!(!args.check);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_channel_rejected() {
        assert!(Cli::try_parse_from(["tasklog", "upgrade", "--channel", "nightly"]).is_err());
    }

    #[test]
    fn test_check_conflicts_with_rollback() {
        assert!(Cli::try_parse_from([
            "tasklog",
            "upgrade",
            "--check",
            "--rollback",
            "/tmp/tasklog.backup"
        ])
        .is_err());
    }
}
