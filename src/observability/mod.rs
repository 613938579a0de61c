//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registry, selector, proxy produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields, not interpolated strings
//! - Request ID is recorded on the request span and echoed to the caller

pub mod logging;
pub mod metrics;
