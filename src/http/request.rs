//! Request handling and transformation.
//!
//! # Responsibilities
//! - Assign a request ID for log correlation
//! - Rebuild the inbound request as an outbound request to an endpoint
//!
//! # Design Decisions
//! - The request ID lives in extensions and on the response only; the
//!   forwarded header set is exactly what the caller sent
//! - Method, headers and body pass through; only the target changes

use std::fmt;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, Uri},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::http::response::ProxyError;
use crate::load_balancer::Endpoint;

/// Correlation header echoed on every response.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Per-request correlation ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(Arc<str>);

impl RequestId {
    pub fn new() -> Self {
        Self(Arc::from(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access to the request ID stored by [`request_id_middleware`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Reuse the caller's `x-request-id` or mint one, and echo it back.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| RequestId(Arc::from(v)))
        .unwrap_or_default();

    request.extensions_mut().insert(id.clone());
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        response.headers_mut().entry(X_REQUEST_ID).or_insert(value);
    }
    response
}

/// Whether a request body is forwarded for this method.
///
/// Retrieval and existence checks go out bodiless.
pub fn method_carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Rebuild `request` against `endpoint`.
///
/// The target is the endpoint's base URL followed by the inbound path and
/// query exactly as received. All headers are kept, duplicates included.
/// When the body is dropped its framing headers go with it, otherwise the
/// transport would wait for bytes that never come.
pub fn into_outbound(request: Request<Body>, endpoint: &Endpoint) -> Result<Request<Body>, ProxyError> {
    let (parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = endpoint.join(path_and_query);
    let uri: Uri = target.parse().map_err(|e: axum::http::uri::InvalidUri| {
        ProxyError::InvalidTarget {
            endpoint: endpoint.clone(),
            target: target.clone(),
            reason: e.to_string(),
        }
    })?;

    let mut headers = parts.headers;
    let body = if method_carries_body(&parts.method) {
        body
    } else {
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::TRANSFER_ENCODING);
        Body::empty()
    };

    let mut outbound = Request::new(body);
    *outbound.method_mut() = parts.method;
    *outbound.uri_mut() = uri;
    *outbound.headers_mut() = headers;
    Ok(outbound)
}
