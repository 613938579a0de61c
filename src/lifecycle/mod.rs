//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load settings → Initial server list load → Start watcher → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → stop accepting, drain, stop reload loop
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → ReloadEvent::Signal
//! ```
//!
//! # Design Decisions
//! - A failed initial server load is not fatal; the gateway starts empty
//! - Bad gateway settings are fatal at startup

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
