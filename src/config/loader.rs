// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PgshError, Result};
use crate::fs::{FileSystem, RealFileSystem};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// the checked form.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    read_raw(&RealFileSystem, path.as_ref())
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(path)?;
    ConfigFile::try_from(raw_config)
}

/// Resolve the config for a run.
///
/// - An explicit path must exist.
/// - Without one, [`default_config_path`] is used if present, otherwise the
///   built-in defaults.
pub fn load_or_default(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<ConfigFile> {
    let path = match explicit {
        Some(path) if fs.is_file(path) => path.to_path_buf(),
        Some(path) => {
            return Err(PgshError::ConfigError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        None => {
            let path = default_config_path();
            if !fs.is_file(&path) {
                debug!(path = %path.display(), "no config file found; using defaults");
                return Ok(ConfigFile::default());
            }
            path
        }
    };

    debug!(path = %path.display(), "loading config");
    ConfigFile::try_from(read_raw(fs, &path)?)
}

/// Default config location: `Pgsh.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Pgsh.toml")
}

fn read_raw(fs: &dyn FileSystem, path: &Path) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path)?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}
