//! API error taxonomy
//!
//! Three buckets, mapped straight to status codes: caller mistakes (400),
//! no client handle yet (503), and delivery failures (500). Delivery errors
//! keep their detail in the logs; the caller only sees a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("WhatsApp client not initialized.")]
    ClientUnavailable,

    #[error("{0}")]
    Delivery(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ClientUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
