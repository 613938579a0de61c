//! Request forwarding.
//!
//! One inbound request, one selection, one outbound attempt. A failing
//! backend keeps receiving its round-robin share.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    response::Response,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;
use crate::http::request::into_outbound;
use crate::http::response::{relay, ProxyError};
use crate::load_balancer::{Endpoint, RoundRobinSelector};

/// A successfully relayed response and the endpoint that produced it.
pub struct Forwarded {
    pub endpoint: Endpoint,
    pub response: Response,
}

/// Forwards requests to the endpoint picked by the selector.
#[derive(Debug)]
pub struct ForwardingProxy {
    selector: Arc<RoundRobinSelector>,
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
}

impl ForwardingProxy {
    pub fn new(selector: Arc<RoundRobinSelector>, timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            selector,
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
        }
    }

    /// Forward `request` to the next endpoint and buffer the full response.
    ///
    /// The timeout covers sending, the response head and the body.
    pub async fn forward(&self, request: Request<Body>) -> Result<Forwarded, ProxyError> {
        let endpoint = self.selector.next()?;
        let outbound = into_outbound(request, &endpoint)?;
        let target = outbound.uri().to_string();
        let method = outbound.method().clone();

        tracing::debug!(
            method = %method,
            target = %target,
            "Forwarding request"
        );

        let exchange = async {
            let response: hyper::Response<hyper::body::Incoming> = self
                .client
                .request(outbound)
                .await
                .map_err(|source| ProxyError::Transport {
                    endpoint: endpoint.clone(),
                    target: target.clone(),
                    source,
                })?;

            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), usize::MAX)
                .await
                .map_err(|source| ProxyError::Body {
                    endpoint: endpoint.clone(),
                    target: target.clone(),
                    source,
                })?;

            Ok::<_, ProxyError>(relay(parts, bytes, &method))
        };

        let result = tokio::time::timeout(self.request_timeout, exchange).await;
        match result {
            Ok(Ok(response)) => Ok(Forwarded { endpoint, response }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProxyError::Timeout {
                endpoint,
                target,
                after: self.request_timeout,
            }),
        }
    }
}
