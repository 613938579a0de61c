//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::http::response::ProxyError;
use crate::load_balancer::endpoint::Endpoint;
use crate::load_balancer::registry::ServerRegistry;

/// Round-robin selector.
/// Stores a cursor into the registry's current list.
#[derive(Debug)]
pub struct RoundRobinSelector {
    registry: Arc<ServerRegistry>,
    cursor: AtomicUsize,
}

impl RoundRobinSelector {
    pub fn new(registry: Arc<ServerRegistry>) -> Self {
        Self {
            registry,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.registry
    }

    /// Current cursor value.
    pub fn position(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    /// Pick the next endpoint and advance the cursor.
    ///
    /// The cursor is clamped against the length seen by this call, so a list
    /// that shrank since the last call needs no reset. After every call the
    /// cursor is in `[0, len)`.
    pub fn next(&self) -> Result<Endpoint, ProxyError> {
        let servers = self.registry.current();
        let len = servers.len();
        if len == 0 {
            return Err(ProxyError::EmptyPool);
        }

        // CAS loop: two callers can never both win the same cursor value.
        let prev = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c % len + 1) % len))
            .unwrap_or_else(|c| c);

        Ok(servers[prev % len].clone())
    }
}
