// src/exec/scanner.rs

//! Output scanners.
//!
//! A [`Scanner`] consumes a running command's stdout word by word and hands
//! every word to its destination as soon as it is complete, so output shows
//! up while the process is still running.
//!
//! - [`LogScanner`] emits each word as a tracing event (default).
//! - [`PersistingScanner`] records each word through a [`LogSink`].

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info};

use super::command::CommandSpec;
use super::error::ScanError;
use crate::sink::LogSink;
use crate::types::BoxFuture;

/// Longest single token accepted before the scan fails.
pub const MAX_TOKEN_BYTES: usize = 64 * 1024;

/// Stdout of a running command, as handed to a scanner.
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Consumes one command's stdout.
///
/// Production code picks one of [`LogScanner`] or [`PersistingScanner`] at
/// startup; tests can provide their own.
pub trait Scanner: Send + Sync {
    /// Read `stdout` to the end, forwarding each whitespace-delimited token.
    ///
    /// Stops at the first destination failure; remaining output is not read.
    fn scan<'a>(
        &'a self,
        stdout: OutputStream,
        cmd: &'a CommandSpec,
    ) -> BoxFuture<'a, Result<(), ScanError>>;
}

/// Default scanner: output tokens go to the process log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogScanner;

impl Scanner for LogScanner {
    fn scan<'a>(
        &'a self,
        stdout: OutputStream,
        cmd: &'a CommandSpec,
    ) -> BoxFuture<'a, Result<(), ScanError>> {
        Box::pin(async move {
            let mut words = WordStream::new(stdout);
            while let Some(word) = words.next_word().await? {
                info!(
                    identity = %cmd.identity,
                    path = %cmd.path.display(),
                    token = %word,
                    "script output"
                );
            }
            Ok(())
        })
    }
}

/// Scanner that writes every token through a [`LogSink`].
#[derive(Clone)]
pub struct PersistingScanner {
    sink: Arc<dyn LogSink>,
}

impl PersistingScanner {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl Scanner for PersistingScanner {
    fn scan<'a>(
        &'a self,
        stdout: OutputStream,
        cmd: &'a CommandSpec,
    ) -> BoxFuture<'a, Result<(), ScanError>> {
        Box::pin(async move {
            let mut words = WordStream::new(stdout);
            let mut recorded = 0usize;
            while let Some(word) = words.next_word().await? {
                self.sink.record_token(&cmd.identity, &word, false).await?;
                recorded += 1;
            }
            debug!(identity = %cmd.identity, recorded, "output scan finished");
            Ok(())
        })
    }
}

/// Incremental whitespace tokenizer over an async byte stream.
///
/// Bytes are split on ASCII whitespace as they arrive; each completed word is
/// then split again on Unicode whitespace, so tokens are exactly the maximal
/// non-whitespace runs of the decoded text. Invalid UTF-8 is replaced
/// lossily.
pub struct WordStream<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
    ready: VecDeque<String>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> WordStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            pending: Vec::new(),
            ready: VecDeque::new(),
            eof: false,
        }
    }

    /// Next complete token, or `None` once the stream is exhausted.
    pub async fn next_word(&mut self) -> Result<Option<String>, ScanError> {
        loop {
            if let Some(word) = self.ready.pop_front() {
                return Ok(Some(word));
            }
            if self.eof {
                return Ok(None);
            }

            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                self.eof = true;
                flush_word(&mut self.pending, &mut self.ready);
                continue;
            }

            let consumed = buf.len();
            for &byte in buf {
                if is_ascii_space(byte) {
                    flush_word(&mut self.pending, &mut self.ready);
                } else {
                    self.pending.push(byte);
                    if self.pending.len() > MAX_TOKEN_BYTES {
                        return Err(ScanError::TokenTooLong {
                            limit: MAX_TOKEN_BYTES,
                        });
                    }
                }
            }
            self.reader.consume(consumed);
        }
    }
}

fn is_ascii_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\x0B' | b'\x0C' | b'\r')
}

fn flush_word(pending: &mut Vec<u8>, ready: &mut VecDeque<String>) {
    if pending.is_empty() {
        return;
    }
    let text = String::from_utf8_lossy(pending);
    ready.extend(text.split_whitespace().map(str::to_string));
    pending.clear();
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::sink::SinkError;

    async fn collect(input: &'static [u8]) -> Vec<String> {
        let mut words = WordStream::new(input);
        let mut out = Vec::new();
        while let Some(w) = words.next_word().await.unwrap() {
            out.push(w);
        }
        out
    }

    #[tokio::test]
    async fn splits_on_any_whitespace() {
        assert_eq!(
            collect(b"  hello\tworld\r\n\nfoo\x0Bbar  ").await,
            vec!["hello", "world", "foo", "bar"]
        );
        assert!(collect(b"").await.is_empty());
        assert!(collect(b" \n\t ").await.is_empty());
    }

    #[tokio::test]
    async fn unicode_whitespace_separates_tokens() {
        // U+00A0 NO-BREAK SPACE and U+3000 IDEOGRAPHIC SPACE
        assert_eq!(
            collect("a\u{a0}b\u{3000}c d".as_bytes()).await,
            vec!["a", "b", "c", "d"]
        );
    }

    #[tokio::test]
    async fn oversized_token_fails() {
        let long = vec![b'x'; MAX_TOKEN_BYTES + 1];
        let mut words = WordStream::new(&long[..]);
        assert!(matches!(
            words.next_word().await,
            Err(ScanError::TokenTooLong { .. })
        ));
    }

    #[tokio::test]
    async fn word_is_available_before_stream_ends() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let mut words = WordStream::new(rx);

        tokio::io::AsyncWriteExt::write_all(&mut tx, b"first sec")
            .await
            .unwrap();
        // "first" is complete; "sec" may still grow.
        assert_eq!(words.next_word().await.unwrap().as_deref(), Some("first"));

        tokio::io::AsyncWriteExt::write_all(&mut tx, b"ond").await.unwrap();
        drop(tx);
        assert_eq!(words.next_word().await.unwrap().as_deref(), Some("second"));
        assert_eq!(words.next_word().await.unwrap(), None);
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, String, bool)>>,
        fail_on: Option<usize>,
    }

    impl LogSink for Recorder {
        fn record_token<'a>(
            &'a self,
            identity: &'a str,
            body: &'a str,
            is_error: bool,
        ) -> BoxFuture<'a, Result<(), SinkError>> {
            Box::pin(async move {
                let mut seen = self.seen.lock().unwrap();
                if self.fail_on == Some(seen.len() + 1) {
                    return Err(SinkError::Unavailable("down".to_string()));
                }
                seen.push((identity.to_string(), body.to_string(), is_error));
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn persisting_scanner_tags_tokens_with_identity() {
        let sink = Arc::new(Recorder::default());
        let scanner = PersistingScanner::new(sink.clone());
        let cmd = CommandSpec::new("id-1", "tmp/a.sh");

        scanner
            .scan(Box::new(&b"a b\n"[..]), &cmd)
            .await
            .unwrap();

        let seen = sink.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ("id-1".to_string(), "a".to_string(), false),
                ("id-1".to_string(), "b".to_string(), false),
            ]
        );
    }

    #[tokio::test]
    async fn persisting_scanner_stops_at_first_sink_failure() {
        let sink = Arc::new(Recorder {
            fail_on: Some(2),
            ..Default::default()
        });
        let scanner = PersistingScanner::new(sink.clone());
        let cmd = CommandSpec::new("id-1", "tmp/a.sh");

        let err = scanner
            .scan(Box::new(&b"one two three"[..]), &cmd)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Sink(SinkError::Unavailable(_))));
        let bodies: Vec<String> = sink
            .seen
            .lock()
            .unwrap()
            .iter()
            .map(|(_, b, _)| b.clone())
            .collect();
        assert_eq!(bodies, vec!["one"]);
    }

    /// Collects the field names of every event.
    #[derive(Clone, Default)]
    struct FieldNames(Arc<Mutex<Vec<Vec<String>>>>);

    struct NameVisitor<'a>(&'a mut Vec<String>);

    impl tracing::field::Visit for NameVisitor<'_> {
        fn record_debug(&mut self, field: &tracing::field::Field, _: &dyn std::fmt::Debug) {
            self.0.push(field.name().to_string());
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FieldNames {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut names = Vec::new();
            event.record(&mut NameVisitor(&mut names));
            self.0.lock().unwrap().push(names);
        }
    }

    #[tokio::test]
    async fn log_scanner_emits_one_event_per_token() {
        use tracing_subscriber::layer::SubscriberExt;

        let fields = FieldNames::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(fields.clone()),
        );
        let cmd = CommandSpec::new("id-1", "tmp/a.sh");

        LogScanner
            .scan(Box::new(&b"just logged"[..]), &cmd)
            .await
            .unwrap();

        let events = fields.0.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        for mut names in events {
            names.sort();
            assert_eq!(names, vec!["identity", "message", "path", "token"]);
        }
    }
}
