// src/exec/mod.rs

//! Script execution engine.
//!
//! - [`tmpfile`] writes script bodies to transient files and removes them.
//! - [`scanner`] tokenizes a process's stdout and forwards each token.
//! - [`command`] runs one script as `<interpreter> <path>` with an optional
//!   deadline and classifies failures.
//! - [`engine`] runs a batch of commands sequentially or concurrently.
//! - [`error`] holds the classified error types.

pub mod command;
pub mod engine;
pub mod error;
pub mod scanner;
pub mod tmpfile;

pub use command::{Command, CommandSpec, CommandState};
pub use engine::ExecEngine;
pub use error::{ErrorGroup, ExecError, ScanError, WaitFailure};
pub use scanner::{LogScanner, OutputStream, PersistingScanner, Scanner, WordStream};
pub use tmpfile::{TempScript, TempScriptStore};
