//! Scoped tracing subscriber for integration tests.
//!
//! Installs a thread-local `fmt` subscriber writing through the test
//! harness capture, dropped with the returned guard. Set `RUST_LOG` to see
//! router logs while a test runs.

#![allow(dead_code)]

use tracing::subscriber::DefaultGuard;

pub struct TestTracing {
    _guard: DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        Self {
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }
}
