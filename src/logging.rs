// src/logging.rs

//! Logging setup for `pgsh` using `tracing` + `tracing-subscriber`.
//!
//! The level applies to pgsh's own events (`pgsh=<level>`); other crates
//! only log warnings. It is taken from, in order:
//! 1. `--log-level`
//! 2. `PGSH_LOG` (e.g. "info", "debug")
//! 3. `info`
//!
//! Everything goes to STDERR; stdout carries recorded script output and the
//! batch status line.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

const LOG_ENV: &str = "PGSH_LOG";

/// Initialise the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let level = resolve_level(cli_level, env.as_deref());

    fmt()
        .with_env_filter(EnvFilter::new(filter_directives(level)))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("initialising tracing subscriber: {e}"))?;

    Ok(())
}

fn resolve_level(cli_level: Option<LogLevel>, env: Option<&str>) -> Level {
    match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => env.and_then(parse_level_str).unwrap_or(Level::INFO),
    }
}

/// `pgsh` at `level`, everything else at warn (never louder than `level`).
fn filter_directives(level: Level) -> String {
    let others = if level < Level::WARN { level } else { Level::WARN };
    format!(
        "{},pgsh={}",
        others.as_str().to_lowercase(),
        level.as_str().to_lowercase()
    )
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
