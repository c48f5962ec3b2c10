// src/exec/error.rs

//! Classified execution errors.
//!
//! Every failure a [`Command`](super::Command) can hit is wrapped into one
//! [`ExecError`] tagged with the lifecycle stage it came from. Raw OS errors
//! never leave a command unwrapped.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use super::command::CommandSpec;
use crate::sink::SinkError;

/// Stage of the subprocess lifecycle at which a command failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorGroup {
    /// No handle to the subprocess stdout could be obtained.
    StdoutPipe,
    /// The subprocess failed to launch.
    Start,
    /// The output scanner failed (including sink failures).
    Scan,
    /// Abnormal exit, or the process was killed at its deadline.
    Wait,
}

impl fmt::Display for ErrorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorGroup::StdoutPipe => "stdout",
            ErrorGroup::Start => "start execute",
            ErrorGroup::Scan => "scan",
            ErrorGroup::Wait => "wait execute",
        };
        f.write_str(label)
    }
}

/// A command failure, correlated to the command that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("execution failed - {detail}")]
pub struct ExecError {
    pub group: ErrorGroup,
    /// Identity of the originating command (the script id).
    pub identity: String,
    /// Script file the command ran.
    pub path: PathBuf,
    /// `"[<group>] error: <cause>"`.
    pub detail: String,
}

impl ExecError {
    pub fn new(group: ErrorGroup, spec: &CommandSpec, cause: impl fmt::Display) -> Self {
        Self {
            group,
            identity: spec.identity.clone(),
            path: spec.path.clone(),
            detail: format!("[{group}] error: {cause}"),
        }
    }
}

/// Failure while consuming a command's stdout.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("reading output: {0}")]
    Read(#[from] io::Error),

    #[error("token too long (limit {limit} bytes)")]
    TokenTooLong { limit: usize },

    #[error("recording token: {0}")]
    Sink(#[from] SinkError),
}

/// Why waiting on a subprocess failed. Always reported under
/// [`ErrorGroup::Wait`].
#[derive(Error, Debug)]
pub enum WaitFailure {
    #[error("{0}")]
    Exited(ExitStatus),

    #[error("deadline of {0:?} exceeded; process killed")]
    DeadlineExceeded(Duration),

    #[error("{0}")]
    Io(#[from] io::Error),
}
