//! Control CLI: daemon lifecycle, DB inspection, log tailing, dashboard
//! launch. Built with `clap::Parser`/`clap::Subcommand` the way the
//! teacher's `ChDigOptions`/`ChDigViews` are built, with `clap_complete`
//! wired the same way for shell completions.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

#[derive(Parser, Clone)]
#[command(name = "galactic-cic")]
#[command(author, version, about = "Single-host operations dashboard for the OpenClaw agent fleet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit shell completions for COMPLETION and exit
    #[arg(long, value_enum, global = true)]
    pub completion: Option<Shell>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the collector daemon
    Start,
    /// Stop the collector daemon
    Stop,
    /// Restart the collector daemon
    Restart,
    /// Report daemon and store health
    Status,
    /// Launch the read-only TUI dashboard
    Dashboard,
    /// Run one cycle of all tiers synchronously, then exit
    Collect,
    /// Inspect or maintain the metrics store
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    /// Tail the collector log
    Logs {
        /// Follow the log as it grows
        #[arg(short = 'f', long)]
        follow: bool,
        /// Number of trailing lines to show
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,
    },
    /// Emit a systemd --user unit for the daemon to stdout
    Install,
    /// Print the version and exit
    Version,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum DbAction {
    /// Row counts and file size
    Stats,
    /// Delete rows older than the 30-day retention window
    Prune,
    /// Print the database file path
    Path,
}

/// Exit codes per the Control CLI contract: 0 success, 1 operational
/// failure, 2 misuse, 3 precondition failure (database unreadable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Operational = 1,
    #[allow(dead_code)]
    Misuse = 2,
    Precondition = 3,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Parses `argv`, handling `--completion` the same way the teacher's
/// `options::parse` handles `--completion`: generate and exit before any
/// subcommand logic runs.
pub fn parse() -> Cli {
    let cli = Cli::parse();
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        std::process::exit(ExitCode::Success.code());
    }
    cli
}

pub fn value_variants_for_test() -> Vec<Shell> {
    Shell::value_variants().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_well_formed() {
        // `debug_assert()` panics on malformed arg definitions (duplicate
        // ids, conflicting short flags, etc.) -- the same sanity check
        // `ChDigOptions::command()` gets exercised against in the teacher.
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_codes_match_contract() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::Operational.code(), 1);
        assert_eq!(ExitCode::Misuse.code(), 2);
        assert_eq!(ExitCode::Precondition.code(), 3);
    }

    #[test]
    fn test_completion_shells_available() {
        assert!(!value_variants_for_test().is_empty());
    }
}
