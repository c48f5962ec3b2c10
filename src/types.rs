use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

/// Boxed future returned by the object-safe async traits (scanner, sink,
/// script source).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How a batch of commands is executed.
///
/// - `Sequential`: one command at a time in input order; the first failure
///   stops the batch (default behaviour).
/// - `Concurrent`: every command runs at once; all failures are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    #[default]
    Sequential,
    Concurrent,
}

impl ExecMode {
    /// Map the `isSync` request flag onto a mode. `true` means concurrent.
    pub fn from_is_sync(is_sync: bool) -> Self {
        if is_sync {
            ExecMode::Concurrent
        } else {
            ExecMode::Sequential
        }
    }
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecMode::Sequential => f.write_str("sequential"),
            ExecMode::Concurrent => f.write_str("concurrent"),
        }
    }
}

/// Which scanner variant consumes command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScannerKind {
    /// Emit tokens as tracing events only.
    #[default]
    Log,
    /// Write every token through the log sink.
    Persist,
}
