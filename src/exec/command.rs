// src/exec/command.rs

//! A single script invocation.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command as Process};
use tokio::sync::mpsc;
use tokio::time::{Instant, error::Elapsed};
use tracing::{debug, info, trace, warn};

use super::error::{ErrorGroup, ExecError, WaitFailure};
use super::scanner::Scanner;
use crate::config::model::DEFAULT_INTERPRETER;

/// What to run: identity, script path, optional deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Opaque correlation key (the script id) attached to every token and
    /// error this command produces.
    pub identity: String,
    pub path: PathBuf,
    /// `None` means no deadline.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(identity: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            identity: identity.into(),
            path: path.into(),
            timeout: None,
        }
    }

    /// Set the deadline. A zero duration means no deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }
}

/// Where a command is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Created,
    PipeOpened,
    Started,
    Scanning,
    Waited,
    Done,
    Failed(ErrorGroup),
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandState::Created => f.write_str("created"),
            CommandState::PipeOpened => f.write_str("pipe-opened"),
            CommandState::Started => f.write_str("started"),
            CommandState::Scanning => f.write_str("scanning"),
            CommandState::Waited => f.write_str("waited"),
            CommandState::Done => f.write_str("done"),
            CommandState::Failed(group) => write!(f, "failed({group})"),
        }
    }
}

/// One runnable script invocation: `<interpreter> <path>`.
///
/// Consumed by a single run; there is no retry.
#[derive(Debug, Clone)]
pub struct Command {
    spec: CommandSpec,
    interpreter: Arc<str>,
}

impl Command {
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            spec,
            interpreter: Arc::from(DEFAULT_INTERPRETER),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl AsRef<str>) -> Self {
        self.interpreter = Arc::from(interpreter.as_ref());
        self
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Run the script to completion, streaming its stdout through `scanner`.
    ///
    /// Each lifecycle step maps to one [`ErrorGroup`]:
    /// start → `Start`, stdout handle → `StdoutPipe`, scanning → `Scan`,
    /// exit status → `Wait`. When the deadline elapses (while scanning or
    /// waiting) the process is killed and the failure is reported as `Wait`.
    pub async fn run(&self, scanner: &dyn Scanner) -> Result<(), ExecError> {
        let spec = &self.spec;
        let deadline = spec.timeout.map(|t| Instant::now() + t);
        let mut state = CommandState::Created;

        info!(
            identity = %spec.identity,
            path = %spec.path.display(),
            timeout = ?spec.timeout,
            "starting script process"
        );

        let mut process = Process::new(&*self.interpreter);
        process
            .arg(&spec.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match process.spawn() {
            Ok(child) => child,
            Err(e) => return Err(self.fail(&mut state, ErrorGroup::Start, e)),
        };

        let Some(stdout) = child.stdout.take() else {
            kill_and_reap(&mut child, spec).await;
            return Err(self.fail(
                &mut state,
                ErrorGroup::StdoutPipe,
                "stdout pipe not available",
            ));
        };
        self.advance(&mut state, CommandState::PipeOpened);
        self.advance(&mut state, CommandState::Started);

        drain_stderr(&mut child, spec);

        self.advance(&mut state, CommandState::Scanning);
        match bounded(deadline, scanner.scan(Box::new(stdout), spec)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                kill_and_reap(&mut child, spec).await;
                return Err(self.fail(&mut state, ErrorGroup::Scan, e));
            }
            Err(_elapsed) => {
                kill_and_reap(&mut child, spec).await;
                return Err(self.deadline_exceeded(&mut state));
            }
        }

        let status = match bounded(deadline, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                return Err(self.fail(&mut state, ErrorGroup::Wait, WaitFailure::Io(e)));
            }
            Err(_elapsed) => {
                kill_and_reap(&mut child, spec).await;
                return Err(self.deadline_exceeded(&mut state));
            }
        };
        self.advance(&mut state, CommandState::Waited);

        if !status.success() {
            return Err(self.fail(&mut state, ErrorGroup::Wait, WaitFailure::Exited(status)));
        }

        self.advance(&mut state, CommandState::Done);
        info!(identity = %spec.identity, "script process exited");
        Ok(())
    }

    /// Same as [`run`](Self::run), but delivers the single result on `tx`.
    ///
    /// This is the unit of concurrent fan-out in
    /// [`ExecEngine::sync_run`](super::ExecEngine::sync_run).
    pub async fn run_into(
        self,
        scanner: Arc<dyn Scanner>,
        tx: mpsc::Sender<Result<(), ExecError>>,
    ) {
        let result = self.run(scanner.as_ref()).await;
        if tx.send(result).await.is_err() {
            warn!(
                identity = %self.spec.identity,
                "result receiver dropped before command reported"
            );
        }
    }

    fn advance(&self, state: &mut CommandState, next: CommandState) {
        trace!(identity = %self.spec.identity, from = %state, to = %next, "command state");
        *state = next;
    }

    fn fail(
        &self,
        state: &mut CommandState,
        group: ErrorGroup,
        cause: impl fmt::Display,
    ) -> ExecError {
        self.advance(state, CommandState::Failed(group));
        let err = ExecError::new(group, &self.spec, cause);
        warn!(
            identity = %err.identity,
            path = %err.path.display(),
            group = %group,
            detail = %err.detail,
            "script execution failed"
        );
        err
    }

    fn deadline_exceeded(&self, state: &mut CommandState) -> ExecError {
        let limit = self.spec.timeout.unwrap_or_default();
        self.fail(state, ErrorGroup::Wait, WaitFailure::DeadlineExceeded(limit))
    }
}

/// Await `fut`, giving up at `deadline` if there is one.
async fn bounded<F: Future>(deadline: Option<Instant>, fut: F) -> Result<F::Output, Elapsed> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut).await,
        None => Ok(fut.await),
    }
}

async fn kill_and_reap(child: &mut Child, spec: &CommandSpec) {
    if let Err(e) = child.kill().await {
        debug!(
            identity = %spec.identity,
            error = %e,
            "kill after failure did not succeed (process may have exited)"
        );
    }
}

/// Consume stderr so the pipe never fills; lines are logged at debug.
fn drain_stderr(child: &mut Child, spec: &CommandSpec) {
    if let Some(stderr) = child.stderr.take() {
        let identity = spec.identity.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(identity = %identity, "stderr: {}", line);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_no_deadline() {
        let spec = CommandSpec::new("a", "a.sh").with_timeout(Some(Duration::ZERO));
        assert_eq!(spec.timeout, None);

        let spec = CommandSpec::new("a", "a.sh").with_timeout(Some(Duration::from_secs(2)));
        assert_eq!(spec.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn default_interpreter_is_bash() {
        let cmd = Command::new(CommandSpec::new("a", "a.sh"));
        assert_eq!(cmd.interpreter(), "/bin/bash");
        assert_eq!(cmd.with_interpreter("/bin/sh").interpreter(), "/bin/sh");
    }

    #[test]
    fn state_display() {
        assert_eq!(CommandState::PipeOpened.to_string(), "pipe-opened");
        assert_eq!(
            CommandState::Failed(ErrorGroup::Wait).to_string(),
            "failed(wait execute)"
        );
    }
}
