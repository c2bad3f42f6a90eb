//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface of the question-bank sync tool.
#[derive(Parser)]
#[command(name = "qsync")]
#[command(about = "Fetch, convert and upload question banks with resumable checkpoints")]
#[command(version)]
pub struct Cli {
    /// Vendor to talk to
    #[arg(
        short = 'v',
        long = "vendor",
        global = true,
        env = "QSYNC_VENDOR",
        default_value = "json-file"
    )]
    pub vendor: String,

    /// Account used for login and cached sessions
    #[arg(
        short = 'u',
        long = "username",
        global = true,
        env = "QSYNC_USERNAME",
        default_value = "default"
    )]
    pub username: String,

    /// Document read by the json-file vendor
    #[arg(long = "source-file", global = true, env = "QSYNC_SOURCE_FILE")]
    pub source_file: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{BankCommand, StageArgs};
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "qsync",
            "bank",
            "list",
            "-v",
            "json-file",
            "-u",
            "alice",
            "--verbose",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.vendor, "json-file");
        assert_eq!(cli.username, "alice");
        assert!(matches!(
            cli.command,
            Some(Commands::Bank {
                command: BankCommand::List { refresh: false }
            })
        ));
    }

    #[test]
    fn test_stage_args() {
        let cli = Cli::parse_from([
            "qsync", "sync", "-b", "Law", "-c", "Torts", "-s", "*", "--refetch",
        ]);
        let Some(Commands::Sync {
            target, refetch, ..
        }) = cli.command
        else {
            panic!("expected sync");
        };
        assert_eq!(
            target,
            StageArgs {
                bank: "Law".into(),
                category: "Torts".into(),
                sheet: "*".into(),
            }
        );
        assert!(refetch);
    }
}
