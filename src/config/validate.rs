// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PgshError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PgshError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.exec, raw.scanner))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_interpreter(cfg)?;
    validate_tmp_dir(cfg)?;
    Ok(())
}

fn validate_interpreter(cfg: &RawConfigFile) -> Result<()> {
    if cfg.exec.interpreter.trim().is_empty() {
        return Err(PgshError::ConfigError(
            "[exec].interpreter must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_tmp_dir(cfg: &RawConfigFile) -> Result<()> {
    if cfg.exec.tmp_dir.as_os_str().is_empty() {
        return Err(PgshError::ConfigError(
            "[exec].tmp_dir must not be empty".to_string(),
        ));
    }
    Ok(())
}
