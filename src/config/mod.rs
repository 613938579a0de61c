//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gateway.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!
//! servers.json:
//!     watcher.rs detects change
//!     → ReloadEvent over mpsc
//!     → registry loads through a ServerSource
//!     → atomic swap of the server list
//! ```
//!
//! # Design Decisions
//! - Gateway settings are read once at startup; only the server list reloads
//! - All fields have defaults to allow minimal configs
//! - A bad server list never replaces a good one

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, FileSource, InlineSource, ServerSource};
pub use schema::{
    AdminConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, ServerDescriptor,
    ServersConfig, TimeoutConfig,
};
pub use watcher::{ConfigWatcher, ReloadEvent};
