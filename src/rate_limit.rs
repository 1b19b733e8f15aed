use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::store::KeyValueStore;

#[derive(Debug, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Rejected,
}

/// Fixed-window admission control: at most `max_requests` admitted per client
/// within any window. Counters live in the shared store under `rate:{client}`
/// so the budget holds across service instances.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, max_requests: u64, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    /// Counts the request against the client's current window and decides
    /// whether it may proceed.
    ///
    /// If the counting store is unavailable the request is rejected
    /// (fail-closed): an uncounted request must not reach the upstream
    /// provider.
    pub async fn admit(&self, client: &str) -> Admission {
        let key = format!("rate:{client}");
        match self.store.incr_ex(&key, self.window).await {
            Ok(count) if count <= self.max_requests => Admission::Allowed,
            Ok(count) => {
                debug!(client = %client, count, "rate limit exceeded");
                Admission::Rejected
            }
            Err(error) => {
                warn!(client = %client, %error, "rate-limit store unavailable, failing closed");
                Admission::Rejected
            }
        }
    }
}
