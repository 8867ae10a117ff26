//! In-memory `CatalogSource` for tests in this and downstream crates.
//!
//! Enabled with the `test-utils` feature. Records every path it serves, tracks
//! how many fetches are in flight at once, and can hold all fetches behind a
//! gate until the test releases them.

use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::traits::CatalogSource;
use crate::types::{Category, SearchHit};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct MemoryCatalog {
    responses: Mutex<HashMap<String, Value>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Mutex<Duration>,
    gate: watch::Sender<bool>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            responses: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            latency: Mutex::new(Duration::ZERO),
            gate,
        }
    }

    pub fn insert(&self, path: &str, body: Value) {
        lock(&self.responses).insert(path.to_string(), body);
    }

    /// Register a listing for `category` and return its hits.
    pub fn insert_listing(&self, category: &Category, names: &[&str]) -> Vec<SearchHit> {
        let hits: Vec<SearchHit> = names
            .iter()
            .map(|name| {
                let id = name.to_lowercase().replace(' ', "-");
                SearchHit {
                    reference_path: format!("{}/{}", category.listing_path(), id),
                    id,
                    display_name: name.to_string(),
                }
            })
            .collect();
        let results: Vec<Value> = hits
            .iter()
            .map(|h| json!({"index": h.id, "name": h.display_name, "url": h.reference_path}))
            .collect();
        self.insert(&category.listing_path(), json!({"count": results.len(), "results": results}));
        hits
    }

    /// Every fetch of `path` fails as if retries were exhausted.
    pub fn fail(&self, path: &str) {
        lock(&self.failing).insert(path.to_string());
    }

    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = latency;
    }

    /// Park every fetch until [`MemoryCatalog::release`].
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl CatalogSource for MemoryCatalog {
    async fn fetch_json(&self, path: &str) -> Result<Value> {
        lock(&self.calls).push(path.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = *lock(&self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if lock(&self.failing).contains(path) {
            return Err(Error::Transient { path: path.to_string(), reason: "simulated outage".into() });
        }
        lock(&self.responses)
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Permanent { path: path.to_string(), status: 404 })
    }
}
