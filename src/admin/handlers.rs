use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::config::ReloadEvent;
use crate::load_balancer::Endpoint;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub servers: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerListView {
    pub servers: Vec<String>,
    pub cursor: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        servers: state.selector.registry().current().len(),
    })
}

pub async fn get_servers(State(state): State<AdminState>) -> Json<ServerListView> {
    let servers = state.selector.registry().current();
    Json(ServerListView {
        servers: servers.iter().map(Endpoint::to_string).collect(),
        cursor: state.selector.position(),
    })
}

pub async fn post_reload(State(state): State<AdminState>) -> impl IntoResponse {
    match state.reload_tx.send(ReloadEvent::Admin) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "reload": "requested" })),
        ),
        Err(_) => {
            tracing::warn!("Reload requested but the reload loop is gone");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "reload": "unavailable" })),
            )
        }
    }
}
