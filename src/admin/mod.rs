//! Local admin API.
//!
//! Unauthenticated; bind it to a loopback address.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use crate::config::ReloadEvent;
use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::load_balancer::RoundRobinSelector;
use self::handlers::*;

#[derive(Clone)]
pub struct AdminState {
    pub selector: Arc<RoundRobinSelector>,
    pub reload_tx: mpsc::UnboundedSender<ReloadEvent>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/servers", get(get_servers))
        .route("/admin/reload", post(post_reload))
        .with_state(state)
}

/// Serve the admin API until shutdown.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    tracing::info!(address = %listener.local_addr()?, "Admin API listening");
    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
        .await
}
