// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::{ExecMode, ScannerKind};

/// Command-line arguments for `pgsh`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pgsh",
    version,
    about = "Run bash scripts and record their output as log entries.",
    long_about = None
)]
pub struct CliArgs {
    /// Script files to execute (must end in `.sh`), in batch order.
    #[arg(value_name = "SCRIPT", required = true)]
    pub scripts: Vec<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// If omitted, `Pgsh.toml` in the current directory is used when it
    /// exists; otherwise built-in defaults apply.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run all scripts at once and collect every failure, instead of
    /// stopping at the first one.
    #[arg(long)]
    pub concurrent: bool,

    /// Per-script timeout in seconds (0 = no deadline).
    ///
    /// Overrides `[exec].default_timeout_seconds`.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Where script output goes. Overrides `[scanner].kind`.
    #[arg(long, value_enum, value_name = "KIND")]
    pub scanner: Option<ScannerKind>,

    /// Print recorded log entries as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PGSH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate scripts and config, print the plan, but don't execute.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Mode requested on the command line, if any.
    ///
    /// `--concurrent` can only switch concurrency on; without it the config
    /// file decides.
    pub fn mode_override(&self) -> Option<ExecMode> {
        self.concurrent.then_some(ExecMode::Concurrent)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_and_scripts() {
        let args = CliArgs::try_parse_from([
            "pgsh",
            "--concurrent",
            "--timeout",
            "3",
            "--scanner",
            "persist",
            "a.sh",
            "b.sh",
        ])
        .unwrap();

        assert_eq!(args.scripts, vec![PathBuf::from("a.sh"), PathBuf::from("b.sh")]);
        assert_eq!(args.timeout, Some(3));
        assert_eq!(args.scanner, Some(ScannerKind::Persist));
        assert_eq!(args.mode_override(), Some(ExecMode::Concurrent));
    }

    #[test]
    fn requires_at_least_one_script() {
        assert!(CliArgs::try_parse_from(["pgsh"]).is_err());
    }

    #[test]
    fn no_concurrent_flag_defers_to_config() {
        let args = CliArgs::try_parse_from(["pgsh", "a.sh"]).unwrap();
        assert_eq!(args.mode_override(), None);
    }
}
