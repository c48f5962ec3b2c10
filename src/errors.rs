// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Errors raised while a script is actually running live in
//! [`crate::exec::error`]; this enum covers everything around the engine
//! (config, script lookup, file loading).

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PgshError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Script not found: {0}")]
    ScriptNotFound(Uuid),

    #[error("invalid bash file extension: {0:?}")]
    InvalidExtension(String),
}

pub type Result<T> = std::result::Result<T, PgshError>;
