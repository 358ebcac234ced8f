//! Shared helpers for `deployagent` integration tests: config builders, a
//! recording command runner and a simulated host that acts on a
//! `MockFileSystem`.

pub mod builders;
pub mod fake_runner;
pub mod simulated;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for any single async test step.
pub const TEST_DEADLINE: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured by the harness and only shown for failing tests.
/// `DEPLOYAGENT_LOG` takes the same directives as the binary, e.g.
/// `DEPLOYAGENT_LOG=deployagent::engine=debug cargo test`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("DEPLOYAGENT_LOG")
            .unwrap_or_else(|_| EnvFilter::new("deployagent=info,warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_DEADLINE`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_DEADLINE, f)
        .await
        .unwrap_or_else(|_| panic!("test step exceeded {TEST_DEADLINE:?}"))
}
