//! HTTP transport
//!
//! Request/response JSON-RPC over `POST /mcp` and any path under it. The
//! invocation metadata is read from the `access-token` and `x-connection`
//! request headers. The streaming variant under `/sse` is not served and
//! answers `501 Not Implemented`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::{Json, Router};

use crate::config::metadata;
use crate::error::Result;
use crate::mcp::server::McpServer;
use crate::mcp::tools::InvocationMetadata;

/// Build the HTTP router
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/mcp/*rest", post(handle_mcp))
        .route("/sse", any(streaming_unsupported))
        .route("/sse/*rest", any(streaming_unsupported))
        .fallback(not_found)
        .with_state(server)
}

/// Bind and serve until the process is stopped
pub async fn serve(server: Arc<McpServer>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP endpoint listening on http://{}/mcp", listener.local_addr()?);

    axum::serve(listener, router(server)).await?;
    Ok(())
}

/// Read invocation credentials from request headers
pub fn metadata_from_headers(headers: &HeaderMap) -> InvocationMetadata {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    InvocationMetadata {
        identity_token: read(metadata::ACCESS_TOKEN),
        connection_id: read(metadata::CONNECTION),
    }
}

async fn handle_mcp(
    State(server): State<Arc<McpServer>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let metadata = metadata_from_headers(&headers);

    match server.handle_message(&body, &metadata).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn streaming_unsupported() -> (StatusCode, &'static str) {
    (StatusCode::NOT_IMPLEMENTED, "Streaming transport not supported")
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
