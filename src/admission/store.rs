//! Counter stores for the admission controller.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::error::AdmissionError;

/// Shared event counter keyed by caller identity.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically count an attempt for `identity` if fewer than `limit`
    /// attempts were recorded in the trailing `window`. Returns whether the
    /// attempt was admitted. Denied attempts are not recorded.
    async fn check_and_increment(
        &self,
        identity: &str,
        limit: u32,
        window: Duration,
    ) -> Result<bool, AdmissionError>;
}

/// Sliding-log counter held in process memory.
///
/// One lock covers each check-and-increment, so concurrent attempts from the
/// same identity can never over-admit.
#[derive(Default)]
pub struct InMemoryCounterStore {
    events: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drop identities with no events inside `window`. Returns how many were removed.
    pub async fn sweep(&self, window: Duration) -> usize {
        let now = Instant::now();
        let mut events = self.events.lock().await;
        let before = events.len();
        events.retain(|_, log| {
            prune(log, now, window);
            !log.is_empty()
        });
        before - events.len()
    }

    /// Number of identities currently tracked.
    pub async fn tracked(&self) -> usize {
        self.events.lock().await.len()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn check_and_increment(
        &self,
        identity: &str,
        limit: u32,
        window: Duration,
    ) -> Result<bool, AdmissionError> {
        let now = Instant::now();
        let mut events = self.events.lock().await;
        let log = events.entry(identity.to_string()).or_default();
        prune(log, now, window);

        if log.len() >= limit as usize {
            return Ok(false);
        }
        log.push_back(now);
        Ok(true)
    }
}

/// Remove events that fell out of the trailing window.
fn prune(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = log.front() {
        if now.duration_since(oldest) >= window {
            log.pop_front();
        } else {
            break;
        }
    }
}

/// Spawn a background task that sweeps idle identities every `window`.
pub fn spawn_sweep_task(store: Arc<InMemoryCounterStore>, window: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(window);
        loop {
            interval.tick().await;
            let removed = store.sweep(window).await;
            if removed > 0 {
                debug!(removed, "Swept idle admission counters");
            }
        }
    })
}
