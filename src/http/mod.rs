//! HTTP surface
//!
//! Four stateless routes over the shared lifecycle controller. Validation
//! runs before anything touches the client: field checks, then handle
//! presence, then recipient normalization, then delivery.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::client::{Messenger, OutboundMedia};
use crate::error::ApiError;
use crate::lifecycle::Lifecycle;
use crate::normalize::{Recipient, normalize_recipient};


#[derive(Clone)]
struct AppState {
    lifecycle: Arc<Lifecycle>,
}

pub fn build_router(lifecycle: Arc<Lifecycle>) -> Router {
    Router::new()
        .route("/send", post(send))
        .route("/send-media", post(send_media))
        .route("/health", get(health))
        .route("/reset-session", post(reset_session))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { lifecycle })
}

#[derive(Debug, Deserialize)]
struct SendRequest {
    #[serde(default)]
    to: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SendMediaRequest {
    #[serde(default)]
    to: String,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    caption: String,
}

/// Resolve the current handle and recipient, in that order: an uninitialized
/// client outranks a malformed number, matching the response contract.
async fn checked_target(
    state: &AppState,
    to: &str,
) -> Result<(Arc<dyn Messenger>, Recipient), ApiError> {
    let client = state
        .lifecycle
        .current()
        .await
        .ok_or(ApiError::ClientUnavailable)?;
    let recipient = normalize_recipient(to)
        .ok_or_else(|| ApiError::BadRequest("Invalid phone number format.".into()))?;
    Ok((client, recipient))
}

async fn send(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.to.is_empty() || req.message.is_empty() {
        return Err(ApiError::BadRequest(
            r#"Both "to" and "message" are required."#.into(),
        ));
    }

    let (client, recipient) = checked_target(&state, &req.to).await?;

    client.send_text(&recipient, &req.message).await.map_err(|e| {
        error!("error sending WhatsApp message: {e:#}");
        ApiError::Delivery("Failed to send message.")
    })?;

    Ok(Json(json!({ "status": "sent" })))
}

async fn send_media(
    State(state): State<AppState>,
    Json(req): Json<SendMediaRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.to.is_empty() || req.files.is_empty() {
        return Err(ApiError::BadRequest(
            r#""to" and non-empty "files" array are required."#.into(),
        ));
    }

    let (client, recipient) = checked_target(&state, &req.to).await?;

    // Caption first, then each file strictly in order, each awaited before
    // the next. A missing file aborts the request; anything already
    // delivered stays delivered.
    if !req.caption.is_empty() {
        client.send_text(&recipient, &req.caption).await.map_err(|e| {
            error!("error sending WhatsApp media caption: {e:#}");
            ApiError::Delivery("Failed to send media.")
        })?;
    }

    for file in &req.files {
        let abs = std::path::absolute(file)
            .map_err(|e| ApiError::BadRequest(format!("Invalid file path {file:?}: {e}")))?;

        if !tokio::fs::try_exists(&abs).await.unwrap_or(false) {
            return Err(ApiError::BadRequest(format!(
                "File not found: {}",
                abs.display()
            )));
        }

        let bytes = tokio::fs::read(&abs).await.map_err(|e| {
            error!("error reading media file {}: {e}", abs.display());
            ApiError::Delivery("Failed to send media.")
        })?;

        let media = OutboundMedia {
            mime: crate::normalize::mime_from_extension(
                abs.extension().and_then(|e| e.to_str()).unwrap_or(""),
            )
            .to_string(),
            filename: abs
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            data: BASE64.encode(&bytes),
        };

        client.send_document(&recipient, &media).await.map_err(|e| {
            error!("error sending WhatsApp media: {e:#}");
            ApiError::Delivery("Failed to send media.")
        })?;
    }

    Ok(Json(json!({ "status": "sent" })))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn reset_session(State(state): State<AppState>) -> Json<Value> {
    state.lifecycle.reset().await;
    Json(json!({
        "status": "reset",
        "message": "Session cleared. Watch the service logs for a new QR code.",
    }))
}
