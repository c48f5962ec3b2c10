// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{ExecMode, ScannerKind};

/// Interpreter every script is handed to.
pub const DEFAULT_INTERPRETER: &str = "/bin/bash";

/// Directory (relative to the working directory) holding transient scripts.
pub const DEFAULT_TMP_DIR: &str = "tmp";

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [exec]
/// interpreter = "/bin/bash"
/// tmp_dir = "tmp"
/// mode = "sequential"
/// default_timeout_seconds = 0
///
/// [scanner]
/// kind = "log"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub exec: ExecSection,

    #[serde(default)]
    pub scanner: ScannerSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub exec: ExecSection,
    pub scanner: ScannerSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(exec: ExecSection, scanner: ScannerSection) -> Self {
        Self { exec, scanner }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ExecSection::default(), ScannerSection::default())
    }
}

/// `[exec]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecSection {
    /// Program used to run each script file.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Where transient script files are written.
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: PathBuf,

    /// `"sequential"` (default) or `"concurrent"`.
    #[serde(default)]
    pub mode: ExecMode,

    /// Per-script timeout used by the CLI when `--timeout` is not given.
    ///
    /// `0` means no deadline.
    #[serde(default)]
    pub default_timeout_seconds: u64,
}

fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}

fn default_tmp_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TMP_DIR)
}

impl Default for ExecSection {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            tmp_dir: default_tmp_dir(),
            mode: ExecMode::default(),
            default_timeout_seconds: 0,
        }
    }
}

/// `[scanner]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScannerSection {
    /// `"log"` (default) or `"persist"`.
    #[serde(default)]
    pub kind: ScannerKind,
}
