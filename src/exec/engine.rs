// src/exec/engine.rs

//! Batch execution: sequential fail-fast or concurrent collect-all.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::command::Command;
use super::error::ExecError;
use super::scanner::Scanner;
use crate::types::ExecMode;

/// Owns one batch of commands and the scanner they share.
pub struct ExecEngine {
    scanner: Arc<dyn Scanner>,
    commands: Vec<Command>,
}

impl ExecEngine {
    pub fn new(scanner: Arc<dyn Scanner>, commands: Vec<Command>) -> Self {
        Self { scanner, commands }
    }

    /// Run the batch in the given mode and return every classified error.
    ///
    /// Sequential mode yields at most one error.
    pub async fn execute(&self, mode: ExecMode) -> Vec<ExecError> {
        info!(commands = self.commands.len(), %mode, "executing batch");
        match mode {
            ExecMode::Sequential => self.run().await.err().into_iter().collect(),
            ExecMode::Concurrent => self.sync_run().await,
        }
    }

    /// Sequential mode: one command at a time, in order.
    ///
    /// Returns the first failure; commands after it are never started.
    pub async fn run(&self) -> Result<(), ExecError> {
        for (index, command) in self.commands.iter().enumerate() {
            if let Err(err) = command.run(self.scanner.as_ref()).await {
                let skipped = self.commands.len() - index - 1;
                if skipped > 0 {
                    warn!(index, skipped, "stopping batch after failed command");
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Concurrent mode: every command runs in its own task.
    ///
    /// Each task posts exactly one result; all of them are received and every
    /// task is joined before returning. Errors come back in completion
    /// order, not input order.
    pub async fn sync_run(&self) -> Vec<ExecError> {
        let total = self.commands.len();
        if total == 0 {
            return Vec::new();
        }

        let (tx, mut rx) = mpsc::channel::<Result<(), ExecError>>(total);
        let mut handles = Vec::with_capacity(total);

        for command in self.commands.iter().cloned() {
            let scanner = Arc::clone(&self.scanner);
            let tx = tx.clone();
            handles.push(tokio::spawn(command.run_into(scanner, tx)));
        }
        // Only task-held senders remain, so `recv` ends once every task is done.
        drop(tx);

        let mut errors = Vec::new();
        let mut received = 0usize;
        while let Some(result) = rx.recv().await {
            received += 1;
            if let Err(err) = result {
                errors.push(err);
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "command task did not complete");
            }
        }

        if received != total {
            warn!(received, total, "some commands reported no result");
        }
        debug!(total, failed = errors.len(), "concurrent batch finished");

        errors
    }
}
