//! Shared helpers for pgsh integration tests.

pub mod builders;
pub mod fs;
pub mod sinks;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single test future. Scripts in tests sleep for at
/// most a few seconds, so hitting this means a hang.
pub const TEST_DEADLINE: Duration = Duration::from_secs(10);

static INIT: Once = Once::new();

/// Initialise tracing for tests, captured per test.
///
/// Without `RUST_LOG`, pgsh's own events are shown at debug (command state
/// changes, stderr lines) and everything else at warn.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,pgsh=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test after [`TEST_DEADLINE`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_DEADLINE, f).await {
        Ok(out) => out,
        Err(_) => panic!("test did not finish within {TEST_DEADLINE:?}"),
    }
}
