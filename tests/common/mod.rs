//! Common test utilities for integration tests
//!
//! Provides the shared mock fetcher and logging setup used across the
//! integration test files.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;

use rookery::{EntityFetcher, FetchError, FetchResult, Snowflake};

/// Setup test logging
///
/// Initializes a tracing subscriber for test output. Safe to call from
/// every test; only the first call installs the subscriber.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A cached entity as the tests see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEntity {
    pub id: Snowflake,
    pub name: String,
}

/// Scripted transport fetcher counting every invocation.
///
/// Each call optionally sleeps (simulated network latency) and then
/// returns the scripted outcome for the requested id, defaulting to a
/// synthesized entity when nothing is scripted.
pub struct MockFetcher {
    calls: AtomicUsize,
    latency: Duration,
    failures: StdMutex<Vec<(Snowflake, FetchError)>>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl MockFetcher {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            latency,
            failures: StdMutex::new(Vec::new()),
        }
    }

    /// Script a failure for every fetch of `id`.
    pub fn fail_with(&self, id: Snowflake, error: FetchError) {
        self.failures.lock().unwrap().push((id, error));
    }

    /// Stop failing fetches for `id`.
    pub fn clear_failure(&self, id: Snowflake) {
        self.failures.lock().unwrap().retain(|(fid, _)| *fid != id);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityFetcher<TestEntity> for MockFetcher {
    async fn fetch(&self, id: Snowflake) -> FetchResult<TestEntity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let scripted = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(fid, _)| *fid == id)
            .map(|(_, err)| err.clone());
        if let Some(err) = scripted {
            return Err(err);
        }
        Ok(TestEntity {
            id,
            name: format!("entity-{id}"),
        })
    }
}
