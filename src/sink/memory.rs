// src/sink/memory.rs

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::{LogSink, ScriptSource, SinkError};
use crate::errors::{PgshError, Result};
use crate::model::{LogRecord, Script};
use crate::types::BoxFuture;

/// In-process script and log storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    scripts: Mutex<BTreeMap<Uuid, Script>>,
    logs: Mutex<Vec<LogRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new script and return it (with its generated id).
    pub fn add_script(&self, title: impl Into<String>, body: impl Into<String>) -> Script {
        let script = Script::new(title, body);
        lock(&self.scripts).insert(script.id, script.clone());
        script
    }

    /// All log records, in insertion order.
    pub fn logs(&self) -> Vec<LogRecord> {
        lock(&self.logs).clone()
    }

    pub fn logs_for(&self, script_id: Uuid) -> Vec<LogRecord> {
        lock(&self.logs)
            .iter()
            .filter(|r| r.script_id == script_id)
            .cloned()
            .collect()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl LogSink for MemoryStore {
    fn record_token<'a>(
        &'a self,
        identity: &'a str,
        body: &'a str,
        is_error: bool,
    ) -> BoxFuture<'a, std::result::Result<(), SinkError>> {
        Box::pin(async move {
            let script_id = Uuid::parse_str(identity)
                .map_err(|_| SinkError::InvalidIdentity(identity.to_string()))?;
            lock(&self.logs).push(LogRecord {
                id: Uuid::new_v4(),
                script_id,
                body: body.to_string(),
                is_error,
                created_at: Utc::now(),
            });
            Ok(())
        })
    }
}

impl ScriptSource for MemoryStore {
    fn get_script(&self, id: Uuid) -> BoxFuture<'_, Result<Script>> {
        Box::pin(async move {
            lock(&self.scripts)
                .get(&id)
                .cloned()
                .ok_or(PgshError::ScriptNotFound(id))
        })
    }
}
