//! REST endpoint handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use parley::{
    ErrorKind, GenerationConfig, Generator, History, ModelCatalog, ModelInfo, ParleyError,
    PromptBridge, Template,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<PromptBridge<Arc<dyn Generator>>>,
    pub catalog: Arc<dyn ModelCatalog>,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn Generator>,
        catalog: Arc<dyn ModelCatalog>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            bridge: Arc::new(PromptBridge::new(generator, config)),
            catalog,
        }
    }
}

/// JSON error body with a non-2xx status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ParleyError> for ApiError {
    fn from(err: ParleyError) -> Self {
        let status = match err.kind() {
            ErrorKind::Config => StatusCode::BAD_REQUEST,
            ErrorKind::Network | ErrorKind::Upstream | ErrorKind::Malformed => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// GET /: the chat page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// GET /api/models: proxies the backend's model listing.
pub async fn get_models(State(app): State<AppState>) -> Result<Json<ModelsResponse>, ApiError> {
    let models = app.catalog.list_models().await.map_err(|err| {
        tracing::warn!(error = %err, "model listing failed");
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    })?;
    Ok(Json(ModelsResponse { models }))
}

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    /// Empty or absent falls back to the server's configured model.
    #[serde(default)]
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub history: History,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /api/chat: one generation call.
///
/// The prompt is built from the posted history with the chat template.
/// Returns 400 for an empty prompt and 502 when the backend fails. Bodies
/// that do not decode as a [`ChatRequest`] get axum's rejection status with
/// the reason in the `error` field.
pub async fn post_chat(
    State(app): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "rejected chat body");
        ApiError::from(rejection)
    })?;
    if body.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("prompt must not be empty"));
    }

    let mut config = app.bridge.config().clone();
    if !body.model.trim().is_empty() {
        config.model = body.model.trim().to_string();
    }
    if config.model.is_empty() {
        return Err(ApiError::bad_request("no model selected"));
    }

    tracing::info!(model = %config.model, history = body.history.len(), "chat request");
    let exchange = app
        .bridge
        .respond_as(&config, &body.history, &body.prompt, &Template::Chat)
        .await;
    let response = exchange.reply?;
    Ok(Json(ChatResponse { response }))
}
