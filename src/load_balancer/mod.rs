//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! ReloadEvent
//!     → registry.rs (load source, swap list)
//!
//! Request
//!     → round_robin.rs (snapshot list, pick cursor % len, advance)
//!     → endpoint.rs (base URL joined with path and query)
//! ```
//!
//! # Design Decisions
//! - The list is never edited in place, only replaced
//! - The cursor is the only contended state; it is a single atomic
//! - No health filtering: every endpoint gets its turn

pub mod endpoint;
pub mod registry;
pub mod round_robin;

pub use endpoint::Endpoint;
pub use registry::{ReloadOutcome, ServerList, ServerRegistry};
pub use round_robin::RoundRobinSelector;
