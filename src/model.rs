// src/model.rs

//! Records exchanged with the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored bash script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Script {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}

/// One recorded output token or execution failure of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: Uuid,
    #[serde(rename = "bashId")]
    pub script_id: Uuid,
    pub body: String,
    pub is_error: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to execute one stored script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecRequest {
    pub id: Uuid,
    /// `0` falls back to the configured default timeout.
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl ExecRequest {
    pub fn new(id: Uuid, timeout_seconds: u64) -> Self {
        Self { id, timeout_seconds }
    }
}
