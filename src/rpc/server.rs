//! RPC HTTP Server
//!
//! Axum-based HTTP server that accepts JSON-RPC requests on `/`.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::rpc::methods::{handle_request, JsonRpcRequest, JsonRpcResponse, RpcState, INTERNAL_ERROR};

/// Build the router without binding, so it can be served or tested
pub fn rpc_router(state: Arc<RpcState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health).post(handle_rpc))
        .layer(cors)
        .with_state(state)
}

/// Start the RPC server on the specified port
pub async fn start_rpc_server(state: Arc<RpcState>, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, dev_rpc = state.dev_rpc, "RPC server listening");
    axum::serve(listener, rpc_router(state)).await
}

async fn health() -> &'static str {
    "ok"
}

/// Handle incoming JSON-RPC requests
///
/// Submissions take the node's lock and flush sled, so they run on the
/// blocking pool.
async fn handle_rpc(
    State(state): State<Arc<RpcState>>,
    Json(request): Json<JsonRpcRequest>,
) -> (StatusCode, Json<JsonRpcResponse>) {
    let id = request.id.clone();
    match tokio::task::spawn_blocking(move || handle_request(&state, request)).await {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            error!(error = %e, "RPC handler task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcResponse::error(id, INTERNAL_ERROR, "Internal error".to_string())),
            )
        }
    }
}
