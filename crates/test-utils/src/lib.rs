pub mod builders;

use std::sync::Once;
use std::time::Duration;

use tickqueue::errors::Result;
use tickqueue::Promise;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Drain interval short enough to keep timer-driven tests fast.
pub const FAST_INTERVAL: Duration = Duration::from_millis(5);

/// Upper bound for any single await in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Filter used when `RUST_LOG` is unset: queue internals at `debug`,
/// everything else at `warn`. Captured output only shows for failing tests.
const DEFAULT_TEST_FILTER: &str = "tickqueue=debug,warn";

/// Install a test-captured subscriber once per test binary.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("test future did not complete in time")
}

/// Wait for `promise` to settle, failing the test on timeout.
pub async fn settled<T>(promise: &Promise<T>) -> Result<T>
where
    T: Clone + Send + 'static,
{
    with_timeout(promise.wait()).await
}
