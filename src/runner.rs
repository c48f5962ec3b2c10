// src/runner.rs

//! Runs batches of stored scripts.
//!
//! [`ScriptRunner`] is the glue between storage and the engine: it resolves
//! script bodies, materializes them, runs the batch, records failures as
//! error log entries, and always cleans up the transient files.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::{Command, CommandSpec, ExecEngine, ExecError, Scanner, TempScriptStore};
use crate::model::{ExecRequest, Script};
use crate::sink::{LogSink, ScriptSource};
use crate::types::ExecMode;

/// Status message for a batch without failures.
pub const OK_MESSAGE: &str = "ok";

/// Outcome of one batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub errors: Vec<ExecError>,
    /// `"ok"` or `"Execute Error: <details>"`.
    pub message: String,
}

impl BatchReport {
    pub fn from_errors(errors: Vec<ExecError>) -> Self {
        let message = if errors.is_empty() {
            OK_MESSAGE.to_string()
        } else {
            let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
            format!("Execute Error: {}", details.join("; "))
        };
        Self { errors, message }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct ScriptRunner {
    source: Arc<dyn ScriptSource>,
    sink: Arc<dyn LogSink>,
    scanner: Arc<dyn Scanner>,
    store: TempScriptStore,
    interpreter: String,
}

impl ScriptRunner {
    pub fn new(
        source: Arc<dyn ScriptSource>,
        sink: Arc<dyn LogSink>,
        scanner: Arc<dyn Scanner>,
        store: TempScriptStore,
    ) -> Self {
        Self {
            source,
            sink,
            scanner,
            store,
            interpreter: crate::config::model::DEFAULT_INTERPRETER.to_string(),
        }
    }

    /// Build a runner using `[exec]` settings from `cfg`.
    pub fn from_config(
        cfg: &ConfigFile,
        source: Arc<dyn ScriptSource>,
        sink: Arc<dyn LogSink>,
        scanner: Arc<dyn Scanner>,
    ) -> Self {
        Self::new(source, sink, scanner, TempScriptStore::new(&cfg.exec.tmp_dir))
            .with_interpreter(&cfg.exec.interpreter)
    }

    pub fn with_store(mut self, store: TempScriptStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub async fn execute_one(&self, request: ExecRequest, mode: ExecMode) -> Result<BatchReport> {
        self.execute_batch(&[request], mode).await
    }

    /// Execute `requests` as one batch.
    ///
    /// Fails (before anything runs) only if a script can't be found or a
    /// transient file can't be written. Script failures are reported in the
    /// returned [`BatchReport`] and recorded in the sink.
    pub async fn execute_batch(
        &self,
        requests: &[ExecRequest],
        mode: ExecMode,
    ) -> Result<BatchReport> {
        let mut scripts: Vec<Script> = Vec::with_capacity(requests.len());
        for request in requests {
            scripts.push(self.source.get_script(request.id).await?);
        }

        // On a failed write, `materialize` removes its own partial file and
        // the ones already written are removed when `files` drops.
        let mut files = Vec::with_capacity(scripts.len());
        for script in &scripts {
            files.push(self.store.materialize(&script.body)?);
        }

        let commands = requests
            .iter()
            .zip(&scripts)
            .zip(&files)
            .map(|((request, script), file)| {
                let spec = CommandSpec::new(script.id.to_string(), file.path())
                    .with_timeout(request_timeout(request));
                Command::new(spec).with_interpreter(&self.interpreter)
            })
            .collect();

        let engine = ExecEngine::new(Arc::clone(&self.scanner), commands);
        let errors = engine.execute(mode).await;

        for err in &errors {
            self.record_error(err).await;
        }

        for file in files {
            let path = file.path().to_path_buf();
            if let Err(e) = self.store.release(file) {
                warn!(path = %path.display(), error = %e, "failed to remove transient script");
            }
        }

        let report = BatchReport::from_errors(errors);
        info!(
            scripts = requests.len(),
            %mode,
            failed = report.errors.len(),
            "batch finished"
        );
        Ok(report)
    }

    /// Record one `is_error` entry carrying the error detail.
    async fn record_error(&self, err: &ExecError) {
        if Uuid::parse_str(&err.identity).is_err() {
            warn!(
                identity = %err.identity,
                detail = %err.detail,
                "execute error with non-script identity; not recorded"
            );
            return;
        }
        if let Err(e) = self.sink.record_token(&err.identity, &err.detail, true).await {
            warn!(identity = %err.identity, error = %e, "failed to record execute error");
        }
    }
}

/// `timeout_seconds == 0` means no deadline.
fn request_timeout(request: &ExecRequest) -> Option<Duration> {
    (request.timeout_seconds > 0).then(|| Duration::from_secs(request.timeout_seconds))
}
