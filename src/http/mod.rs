//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request.rs (request ID, outbound rebuild)
//!     → proxy.rs (select endpoint, send once, buffer response)
//!     → response.rs (relay, or map failure to 503/502)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use proxy::{Forwarded, ForwardingProxy};
pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::HttpServer;
