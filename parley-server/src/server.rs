//! Axum server setup and router construction.

use std::io;
use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::{self, AppState};

/// Largest accepted request body. Histories travel in the body, so this caps
/// how long one browser session can grow.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Build the full axum router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/api/models", get(api::get_models))
        .route("/api/chat", post(api::post_chat))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::map_response(json_body_limit))
        .with_state(state)
}

/// The body limit layer answers 413 in plain text; the chat page expects JSON.
async fn json_body_limit(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE || is_json {
        return response;
    }
    let error = format!("request body exceeds {MAX_BODY_BYTES} bytes");
    (StatusCode::PAYLOAD_TOO_LARGE, Json(json!({ "error": error }))).into_response()
}

/// Bind, spawn the server in the background and return the bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            tracing::error!(error = %err, "web server stopped");
        }
    });

    Ok(addr)
}

/// Serve in the foreground until Ctrl-C.
pub async fn run(router: Router, bind_addr: SocketAddr) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "chat page listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
}
