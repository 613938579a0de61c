//! Server registry.
//!
//! # Responsibilities
//! - Own the active, ordered server list
//! - Parse a server source into a new list
//! - Swap lists atomically on reload
//!
//! Readers take an `Arc` snapshot; a reload never mutates a list someone is
//! iterating, it stores a new one.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::loader::parse_descriptors;
use crate::config::{ConfigError, ServerSource};
use crate::load_balancer::endpoint::Endpoint;
use crate::observability::metrics;

/// Ordered list of endpoints. Order defines round-robin order.
pub type ServerList = Vec<Endpoint>;

/// Result of a successful reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The source matched the active list; nothing was swapped.
    Unchanged,
    /// A new list is active.
    Replaced { servers: usize },
}

/// Holds the current server list.
#[derive(Debug)]
pub struct ServerRegistry {
    servers: ArcSwap<ServerList>,
}

impl ServerRegistry {
    pub fn new(initial: ServerList) -> Self {
        metrics::record_pool_size(initial.len());
        Self {
            servers: ArcSwap::from_pointee(initial),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Read and parse a source. Does not touch the active list.
    pub fn load(source: &dyn ServerSource) -> Result<ServerList, ConfigError> {
        let raw = source.read()?;
        parse_descriptors(&raw)?
            .iter()
            .map(|d| Endpoint::parse(&d.host))
            .collect()
    }

    /// Snapshot of the active list.
    pub fn current(&self) -> Arc<ServerList> {
        self.servers.load_full()
    }

    /// Atomically make `list` the active list.
    pub fn replace(&self, list: ServerList) {
        metrics::record_pool_size(list.len());
        self.servers.store(Arc::new(list));
    }

    /// Load from `source` and replace on success.
    ///
    /// On error the active list is left as it was.
    pub fn reload(&self, source: &dyn ServerSource) -> Result<ReloadOutcome, ConfigError> {
        let list = match Self::load(source) {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(
                    source = %source.describe(),
                    error = %e,
                    "Failed to load server list, keeping current servers"
                );
                metrics::record_reload(false);
                return Err(e);
            }
        };

        metrics::record_reload(true);

        let unchanged = *self.current() == list;
        tracing::info!(
            source = %source.describe(),
            servers = ?list.iter().map(Endpoint::as_str).collect::<Vec<_>>(),
            unchanged,
            "Server list loaded"
        );
        if unchanged {
            return Ok(ReloadOutcome::Unchanged);
        }

        let servers = list.len();
        self.replace(list);
        Ok(ReloadOutcome::Replaced { servers })
    }
}

impl Default for ServerRegistry {
    fn default() -> Self {
        Self::empty()
    }
}
