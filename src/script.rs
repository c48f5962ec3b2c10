// src/script.rs

//! Loading scripts from `.sh` files.

use std::path::Path;

use crate::errors::{PgshError, Result};
use crate::exec::tmpfile::SCRIPT_EXTENSION;
use crate::fs::FileSystem;

/// Title and body read from a script file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub title: String,
    pub body: String,
}

/// Read a script file, rejecting anything that isn't `*.sh`.
pub fn load_script_file(fs: &dyn FileSystem, path: &Path) -> Result<ScriptFile> {
    validate_extension(path)?;
    let title = script_title(path)?;
    let body = fs.read_to_string(path)?;
    if body.trim().is_empty() {
        return Err(PgshError::ConfigError(format!(
            "script {} is empty",
            path.display()
        )));
    }
    Ok(ScriptFile { title, body })
}

pub fn validate_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    if ext != SCRIPT_EXTENSION {
        return Err(PgshError::InvalidExtension(ext));
    }
    Ok(())
}

/// File name without its extension.
pub fn script_title(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            PgshError::ConfigError(format!("cannot derive a title from {}", path.display()))
        })
}
