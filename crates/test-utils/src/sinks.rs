use std::sync::{Arc, Mutex};

use pgsh::sink::{LogSink, SinkError};
use pgsh::types::BoxFuture;

/// One call to [`LogSink::record_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub identity: String,
    pub body: String,
    pub is_error: bool,
}

/// A sink that:
/// - records every entry it accepts
/// - optionally fails on the N-th call (1-based), and on every call after it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    entries: Arc<Mutex<Vec<Entry>>>,
    calls: Arc<Mutex<usize>>,
    fail_from_call: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_from(call: usize) -> Self {
        Self {
            fail_from_call: Some(call),
            ..Self::default()
        }
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap().clone()
    }

    /// Bodies of non-error entries for `identity`, in order.
    pub fn tokens_for(&self, identity: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.identity == identity && !e.is_error)
            .map(|e| e.body)
            .collect()
    }

    pub fn errors(&self) -> Vec<Entry> {
        self.entries().into_iter().filter(|e| e.is_error).collect()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl LogSink for RecordingSink {
    fn record_token<'a>(
        &'a self,
        identity: &'a str,
        body: &'a str,
        is_error: bool,
    ) -> BoxFuture<'a, Result<(), SinkError>> {
        Box::pin(async move {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if self.fail_from_call.is_some_and(|n| call >= n) {
                return Err(SinkError::Unavailable(format!("refusing call {call}")));
            }
            self.entries.lock().unwrap().push(Entry {
                identity: identity.to_string(),
                body: body.to_string(),
                is_error,
            });
            Ok(())
        })
    }
}
