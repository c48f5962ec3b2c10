// src/sink/mod.rs

//! Boundary to the persistence layer.
//!
//! The engine only needs two capabilities from storage:
//! - [`LogSink`]: append one log entry (an output token or an error detail).
//! - [`ScriptSource`]: look up a script body by id.
//!
//! [`MemoryStore`] implements both for the CLI and tests; [`TracingSink`]
//! records nothing and only emits tracing events.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::errors::Result;
use crate::model::Script;
use crate::types::BoxFuture;

pub mod memory;

pub use memory::MemoryStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("invalid identity {0:?}: expected a script UUID")]
    InvalidIdentity(String),

    #[error("log storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable destination for log entries.
///
/// Ordering across identities and idempotency are the implementation's
/// concern; callers await each call before issuing the next one for the same
/// command.
pub trait LogSink: Send + Sync {
    fn record_token<'a>(
        &'a self,
        identity: &'a str,
        body: &'a str,
        is_error: bool,
    ) -> BoxFuture<'a, std::result::Result<(), SinkError>>;
}

/// Provider of script bodies.
pub trait ScriptSource: Send + Sync {
    /// Fails with `PgshError::ScriptNotFound` if no script has this id.
    fn get_script(&self, id: Uuid) -> BoxFuture<'_, Result<Script>>;
}

/// Sink that only logs entries through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record_token<'a>(
        &'a self,
        identity: &'a str,
        body: &'a str,
        is_error: bool,
    ) -> BoxFuture<'a, std::result::Result<(), SinkError>> {
        Box::pin(async move {
            info!(identity, is_error, body, "log entry");
            Ok(())
        })
    }
}
