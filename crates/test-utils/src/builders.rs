#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use pgsh::exec::{Command, CommandSpec};

/// Writes script files into a directory and builds commands for them.
pub struct ScriptDir {
    root: PathBuf,
    next: usize,
}

impl ScriptDir {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            next: 0,
        }
    }

    /// Write `body` to a new `.sh` file and return its path.
    pub fn write(&mut self, body: &str) -> PathBuf {
        self.next += 1;
        let path = self.root.join(format!("script_{}.sh", self.next));
        std::fs::write(&path, body).expect("write script");
        path
    }

    /// Write `body` and wrap it in a command with the given identity.
    pub fn command(&mut self, identity: &str, body: &str) -> CommandBuilder {
        let path = self.write(body);
        CommandBuilder::new(identity, path)
    }
}

/// Builder for [`Command`].
pub struct CommandBuilder {
    spec: CommandSpec,
    interpreter: Option<String>,
}

impl CommandBuilder {
    pub fn new(identity: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            spec: CommandSpec::new(identity, path),
            interpreter: None,
        }
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.spec = self.spec.with_timeout(Some(Duration::from_secs(secs)));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.spec = self.spec.with_timeout(Some(timeout));
        self
    }

    pub fn interpreter(mut self, interpreter: &str) -> Self {
        self.interpreter = Some(interpreter.to_string());
        self
    }

    pub fn build(self) -> Command {
        let cmd = Command::new(self.spec);
        match self.interpreter {
            Some(i) => cmd.with_interpreter(i),
            None => cmd,
        }
    }
}
