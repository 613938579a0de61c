//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Relay a buffered backend response to the caller
//! - Strip hop-by-hop headers from the relayed response
//! - Map gateway failures to 503 / 502
//!
//! Backend 4xx and 5xx are not gateway errors; they are relayed as-is.

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, response::Parts, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::load_balancer::Endpoint;

/// Per-request gateway failures. All are terminal; nothing is retried.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no servers available")]
    EmptyPool,

    #[error("invalid target {target}: {reason}")]
    InvalidTarget {
        endpoint: Endpoint,
        target: String,
        reason: String,
    },

    #[error("request to {target} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        target: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("request to {target} timed out after {after:?}")]
    Timeout {
        endpoint: Endpoint,
        target: String,
        after: Duration,
    },

    #[error("reading response from {target} failed: {source}")]
    Body {
        endpoint: Endpoint,
        target: String,
        #[source]
        source: axum::Error,
    },
}

impl ProxyError {
    /// Status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::EmptyPool => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// The endpoint the failed request was headed to, if one was selected.
    pub fn endpoint(&self) -> Option<&Endpoint> {
        match self {
            ProxyError::EmptyPool => None,
            ProxyError::InvalidTarget { endpoint, .. }
            | ProxyError::Transport { endpoint, .. }
            | ProxyError::Timeout { endpoint, .. }
            | ProxyError::Body { endpoint, .. } => Some(endpoint),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match self {
            ProxyError::EmptyPool => "No servers available",
            _ => "Bad Gateway",
        };
        (self.status(), body).into_response()
    }
}

/// Connection-scoped headers that must not cross the proxy.
const HOP_BY_HOP: [header::HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

/// Whether the backend's `content-length` describes a body that was never
/// sent: HEAD responses and 204/304.
fn length_without_body(method: &Method, status: StatusCode) -> bool {
    method == Method::HEAD
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

/// Build the caller's response from a fully read backend response.
///
/// `method` is the method the request was forwarded with.
pub fn relay(mut parts: Parts, body: Bytes, method: &Method) -> Response {
    strip_hop_by_hop(&mut parts.headers);
    if !length_without_body(method, parts.status) {
        // Recomputed from the buffered body.
        parts.headers.remove(header::CONTENT_LENGTH);
    }
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = parts.status;
    *response.headers_mut() = parts.headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_pool_maps_to_503() {
        let response = ProxyError::EmptyPool.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_text(response).await, "No servers available");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_502() {
        let err = ProxyError::Timeout {
            endpoint: Endpoint::parse("http://a:1").unwrap(),
            target: "http://a:1/x".into(),
            after: Duration::from_secs(1),
        };
        assert_eq!(err.endpoint().map(Endpoint::as_str), Some("http://a:1"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_text(response).await, "Bad Gateway");
    }

    #[tokio::test]
    async fn test_relay_keeps_status_and_body() {
        let (mut parts, ()) = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("content-type", "text/plain")
            .header("connection", "close")
            .header("content-length", "9")
            .body(())
            .unwrap()
            .into_parts();
        parts.headers.append("set-cookie", "a=1".parse().unwrap());
        parts.headers.append("set-cookie", "b=2".parse().unwrap());

        let response = relay(parts, Bytes::from_static(b"not found"), &Method::GET);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert!(response.headers().get("connection").is_none());
        assert!(response.headers().get("content-length").is_none());
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
        assert_eq!(body_text(response).await, "not found");
    }

    fn head_parts(status: StatusCode, length: &str) -> Parts {
        Response::builder()
            .status(status)
            .header("content-length", length)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_relay_head_keeps_backend_length() {
        let response = relay(head_parts(StatusCode::OK, "9"), Bytes::new(), &Method::HEAD);
        assert_eq!(response.headers()["content-length"], "9");
    }

    #[test]
    fn test_relay_not_modified_keeps_backend_length() {
        let response = relay(head_parts(StatusCode::NOT_MODIFIED, "42"), Bytes::new(), &Method::GET);
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()["content-length"], "42");
    }

    #[test]
    fn test_relay_get_drops_backend_length() {
        let response = relay(head_parts(StatusCode::OK, "100"), Bytes::from_static(b"short"), &Method::GET);
        assert!(response.headers().get("content-length").is_none());
    }

    #[tokio::test]
    async fn test_invalid_target_maps_to_502() {
        let err = ProxyError::InvalidTarget {
            endpoint: Endpoint::parse("http://a:1").unwrap(),
            target: "http://a:1/bad path".into(),
            reason: "invalid uri character".into(),
        };
        assert_eq!(err.endpoint().map(Endpoint::as_str), Some("http://a:1"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_text(response).await, "Bad Gateway");
    }
}
