//! In-memory object store for exercising the uploader without a network.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::error::StoreError;
use super::store::{ObjectStore, ProbeOutcome};

/// A `put` call recorded by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<String, Vec<u8>>,
    puts: Vec<RecordedPut>,
    failing_probes: HashSet<String>,
    failing_puts: HashSet<String>,
}

/// Thread-safe in-memory [`ObjectStore`].
///
/// Clones share the same contents, so a test can keep a handle while the
/// uploader owns another. Failures can be injected per key and an artificial
/// latency makes concurrent requests overlap, which lets tests observe the
/// peak number of probes and puts in flight together.
///
/// # Example
///
/// ```
/// use thousands_data::upload::test_support::MemoryObjectStore;
///
/// let store = MemoryObjectStore::default().fail_probe("users/1_M.jpg");
/// store.insert("users/2_M.jpg", vec![0xFF]);
/// assert!(store.contains("users/2_M.jpg"));
/// assert_eq!(store.put_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    state: Arc<Mutex<State>>,
    latency: Duration,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MemoryObjectStore {
    /// Delay every probe and put by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every probe of `key` fail.
    #[must_use]
    pub fn fail_probe(self, key: impl Into<String>) -> Self {
        self.lock().failing_probes.insert(key.into());
        self
    }

    /// Make every upload of `key` fail.
    #[must_use]
    pub fn fail_put(self, key: impl Into<String>) -> Self {
        self.lock().failing_puts.insert(key.into());
        self
    }

    /// Seed an existing object.
    pub fn insert(&self, key: impl Into<String>, body: Vec<u8>) {
        self.lock().objects.insert(key.into(), body);
    }

    /// Whether an object is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().objects.contains_key(key)
    }

    /// Stored bytes for `key`.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(key).cloned()
    }

    /// Every successful `put`, in call order.
    #[must_use]
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.lock().puts.clone()
    }

    /// Number of successful `put` calls.
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.lock().puts.len()
    }

    /// Highest number of probes and puts observed running at the same time.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self) -> InFlight<'_> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        guard
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn probe(&self, key: &str) -> ProbeOutcome {
        let _guard = self.enter().await;
        let state = self.lock();
        if state.failing_probes.contains(key) {
            return ProbeOutcome::Failed(StoreError::Rejected {
                operation: "head",
                key: key.to_owned(),
                message: "access denied".to_owned(),
            });
        }
        if state.objects.contains_key(key) {
            ProbeOutcome::Exists
        } else {
            ProbeOutcome::NotFound
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        let _guard = self.enter().await;
        let mut state = self.lock();
        if state.failing_puts.contains(key) {
            return Err(StoreError::Rejected {
                operation: "put",
                key: key.to_owned(),
                message: "connection reset".to_owned(),
            });
        }
        state.puts.push(RecordedPut {
            key: key.to_owned(),
            content_type: content_type.to_owned(),
            size: body.len(),
        });
        state.objects.insert(key.to_owned(), body);
        Ok(())
    }
}
