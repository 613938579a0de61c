//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request ID)
//! - Serve on a listener until shutdown
//! - Drive server list reloads from the reload channel

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::{GatewayConfig, ReloadEvent, ServerSource};
use crate::http::proxy::ForwardingProxy;
use crate::http::request::{request_id_middleware, RequestIdExt};
use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::load_balancer::{ReloadOutcome, RoundRobinSelector, ServerRegistry};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<ForwardingProxy>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    registry: Arc<ServerRegistry>,
    selector: Arc<RoundRobinSelector>,
    source: Arc<dyn ServerSource>,
}

impl HttpServer {
    /// Create a new HTTP server around `registry`, reloading from `source`.
    pub fn new(
        config: GatewayConfig,
        registry: Arc<ServerRegistry>,
        source: Arc<dyn ServerSource>,
    ) -> Self {
        let selector = Arc::new(RoundRobinSelector::new(registry.clone()));
        let proxy = Arc::new(ForwardingProxy::new(selector.clone(), &config.timeouts));

        let router = Self::build_router(AppState { proxy });
        Self {
            router,
            registry,
            selector,
            source,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(middleware::from_fn(request_id_middleware)),
            )
    }

    pub fn selector(&self) -> &Arc<RoundRobinSelector> {
        &self.selector
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Reload events are consumed on a separate task so a slow reload never
    /// holds up request handling.
    pub async fn run(
        self,
        listener: TcpListener,
        reload_events: mpsc::UnboundedReceiver<ReloadEvent>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            servers = self.registry.current().len(),
            "HTTP server starting"
        );

        tokio::spawn(reload_loop(
            self.registry.clone(),
            self.source.clone(),
            reload_events,
            shutdown.resubscribe(),
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Selects an endpoint and forwards the request.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .request_id()
        .map(ToString::to_string)
        .unwrap_or_default();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match state.proxy.forward(request).await {
        Ok(forwarded) => {
            let status = forwarded.response.status();
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                path = %path,
                backend = %forwarded.endpoint,
                status = status.as_u16(),
                "Request forwarded"
            );
            metrics::record_request(method.as_str(), status.as_u16(), forwarded.endpoint.as_str(), start_time);
            forwarded.response
        }
        Err(e) => {
            let backend = e.endpoint().map(|ep| ep.as_str().to_string());
            match &backend {
                Some(backend) => tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    backend = %backend,
                    error = %e,
                    "Forwarding failed"
                ),
                None => tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    "No servers available"
                ),
            }
            metrics::record_request(
                method.as_str(),
                e.status().as_u16(),
                backend.as_deref().unwrap_or("none"),
                start_time,
            );
            e.into_response()
        }
    }
}

/// Apply reload events to the registry until shutdown.
///
/// Events that pile up while a reload runs are folded into the next one.
pub async fn reload_loop(
    registry: Arc<ServerRegistry>,
    source: Arc<dyn ServerSource>,
    mut events: mpsc::UnboundedReceiver<ReloadEvent>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        let event = tokio::select! {
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = shutdown.recv() => break,
        };

        let mut coalesced = 0usize;
        while events.try_recv().is_ok() {
            coalesced += 1;
        }

        tracing::info!(trigger = event.as_str(), coalesced, "Reloading server list");

        let registry = registry.clone();
        let source = source.clone();
        // File reads stay off the async workers.
        let outcome = tokio::task::spawn_blocking(move || registry.reload(source.as_ref())).await;

        match outcome {
            Ok(Ok(ReloadOutcome::Replaced { servers })) => {
                tracing::info!(servers, "Server list replaced")
            }
            Ok(Ok(ReloadOutcome::Unchanged)) => {}
            // Already logged by the registry.
            Ok(Err(_)) => {}
            Err(e) => tracing::error!(error = %e, "Reload task failed"),
        }
    }

    tracing::debug!("Reload loop stopped");
}
