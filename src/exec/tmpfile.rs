// src/exec/tmpfile.rs

//! Transient on-disk copies of script bodies.
//!
//! A script body is written to `<dir>/<uuid-v4>-<unix-seconds>.sh` for the
//! duration of one execution. The returned [`TempScript`] removes the file
//! when released explicitly, or when dropped on any other exit path.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::fs::{FileSystem, RealFileSystem};

pub const SCRIPT_EXTENSION: &str = ".sh";

/// Writes script bodies into a dedicated transient directory.
#[derive(Debug, Clone)]
pub struct TempScriptStore {
    dir: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl TempScriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_fs(dir, Arc::new(RealFileSystem))
    }

    pub fn with_fs(dir: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            dir: dir.into(),
            fs,
        }
    }

    /// Write `body` to a fresh file, creating the directory if needed.
    pub fn materialize(&self, body: &str) -> io::Result<TempScript> {
        if !self.fs.is_dir(&self.dir) {
            self.fs.create_dir_all(&self.dir)?;
        }

        let script = TempScript {
            path: self.dir.join(unique_file_name()),
            fs: Arc::clone(&self.fs),
            released: false,
        };
        // A failed write may still have created the file.
        if let Err(e) = self.fs.write(&script.path, body.as_bytes()) {
            script.discard();
            return Err(e);
        }
        debug!(path = %script.path.display(), bytes = body.len(), "materialized script");

        Ok(script)
    }

    /// Delete the file behind `script`.
    ///
    /// Errors are returned, not logged; callers decide whether they matter.
    pub fn release(&self, script: TempScript) -> io::Result<()> {
        script.release()
    }
}

/// `<uuid-v4>-<unix-seconds>.sh`
pub fn unique_file_name() -> String {
    format!(
        "{}-{}{}",
        Uuid::new_v4(),
        Utc::now().timestamp(),
        SCRIPT_EXTENSION
    )
}

/// Handle to one materialized script file.
pub struct TempScript {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    released: bool,
}

impl TempScript {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) -> io::Result<()> {
        self.released = true;
        self.fs.remove_file(&self.path)?;
        debug!(path = %self.path.display(), "released script");
        Ok(())
    }

    /// Remove whatever a failed write left behind. A missing file is fine.
    fn discard(mut self) {
        self.released = true;
        match self.fs.remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed partial script"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove partial script"
            ),
        }
    }
}

impl fmt::Debug for TempScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempScript")
            .field("path", &self.path)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Drop for TempScript {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.fs.remove_file(&self.path) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove transient script on drop"
            );
        }
    }
}
