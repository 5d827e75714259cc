//! Error responses produced by the adapters.
//!
//! # Responsibilities
//! - Map validation failures to `400 Bad Request` with a JSON array of messages
//! - Map body transport problems to 400 / 413
//! - Map adapter faults to `500 Internal Server Error`
//!
//! # Design Decisions
//! - Validation failures always carry the complete, ordered message list
//! - Faults expose a fixed public message; details go to the log only

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// `400 Bad Request` with the ordered list of validation messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure(pub Vec<String>);

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self.0)).into_response()
    }
}

/// JSON payload of adapter faults.
#[derive(Debug, Clone, Serialize)]
pub struct FaultBody {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub status: u16,
}

impl IntoResponse for FaultBody {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Why a JSON request body was not passed on.
#[derive(Debug, Error)]
pub enum BodyRejection {
    #[error("request body exceeds the limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("request body could not be read: {0}")]
    Unreadable(String),

    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("request body failed validation with {} message(s)", .0.len())]
    Invalid(Vec<String>),
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        match self {
            BodyRejection::TooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, Json(vec![self.to_string()])).into_response()
            }
            BodyRejection::Unreadable(_) | BodyRejection::MalformedJson(_) => {
                ValidationFailure(vec![self.to_string()]).into_response()
            }
            BodyRejection::Invalid(messages) => ValidationFailure(messages).into_response(),
        }
    }
}
