//! JSON request body validation.
//!
//! Reads the body under a size limit, validates it, and hands the processed
//! data to the route: the body is replaced with the processed JSON and a
//! [`ProcessedBody`] extension is attached for [`ValidatedBody`].
//!
//! [`ValidatedBody`]: crate::http::extract::ValidatedBody

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::http::extract::ProcessedBody;
use crate::http::request::{read_json_body, request_title, DEFAULT_BODY_SIZE_LIMIT};
use crate::http::response::BodyRejection;
use crate::validation::{process, ObjectDataSpecification, ProcessingResult};

/// Default label of request body specifications.
pub const REQUEST_BODY_LABEL: &str = "RequestBody";

/// Per-route body validation settings.
#[derive(Debug, Clone)]
pub struct BodyValidation {
    specification: Arc<ObjectDataSpecification>,
    body_size_limit: usize,
    log_parsed_body: bool,
}

impl BodyValidation {
    pub fn new(specification: ObjectDataSpecification) -> Self {
        Self::from_shared(Arc::new(specification))
    }

    pub fn from_shared(specification: Arc<ObjectDataSpecification>) -> Self {
        Self {
            specification,
            body_size_limit: DEFAULT_BODY_SIZE_LIMIT,
            log_parsed_body: false,
        }
    }

    pub fn with_body_size_limit(mut self, limit: usize) -> Self {
        self.body_size_limit = limit;
        self
    }

    /// Log every parsed body at `info` instead of `debug`.
    pub fn with_parsed_body_logging(mut self, enabled: bool) -> Self {
        self.log_parsed_body = enabled;
        self
    }

    pub fn specification(&self) -> &ObjectDataSpecification {
        &self.specification
    }

    /// Validate an already parsed body.
    pub fn validate(&self, raw: &Value) -> Result<Value, BodyRejection> {
        process(raw, &self.specification)
            .into_result()
            .map_err(BodyRejection::Invalid)
    }
}

/// Middleware for `from_fn_with_state(Arc<BodyValidation>, validate_json_body)`.
pub async fn validate_json_body(
    State(validation): State<Arc<BodyValidation>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let title = request_title(&parts.method, &parts.uri);

    let raw = match read_json_body(&parts.headers, body, validation.body_size_limit).await {
        Ok(raw) => raw,
        Err(rejection) => {
            tracing::warn!(request = %title, error = %rejection, "Request body rejected");
            return rejection.into_response();
        }
    };

    if validation.log_parsed_body {
        tracing::info!(request = %title, body = %raw, "Parsed request body");
    } else {
        tracing::debug!(request = %title, body = %raw, "Parsed request body");
    }

    match process(&raw, &validation.specification) {
        ProcessingResult::Valid { processed_data } => {
            let serialized = processed_data.to_string();
            parts.headers.remove(header::CONTENT_LENGTH);
            parts
                .headers
                .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
            parts.extensions.insert(ProcessedBody(processed_data));

            next.run(Request::from_parts(parts, Body::from(serialized))).await
        }
        ProcessingResult::Invalid {
            validation_errors_messages,
        } => {
            tracing::debug!(
                request = %title,
                errors = validation_errors_messages.len(),
                "Request body failed validation"
            );
            BodyRejection::Invalid(validation_errors_messages).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::PropertySpecification;
    use axum::{body::to_bytes, http::StatusCode, middleware, routing::post, Router};
    use serde_json::json;
    use tower::ServiceExt;

    fn app(limit: usize) -> Router {
        let specification = ObjectDataSpecification::builder("RequestBody")
            .property(PropertySpecification::string("name").required())
            .property(PropertySpecification::number("age").default_value(0))
            .build()
            .unwrap();
        let validation = Arc::new(BodyValidation::new(specification).with_body_size_limit(limit));

        Router::new()
            .route("/users", post(|body: String| async move { body }))
            .route_layer(middleware::from_fn_with_state(validation, validate_json_body))
    }

    async fn send(app: Router, body: &'static str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .header("content-length", body.len())
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_valid_body_is_replaced_with_processed_data() {
        let (status, body) = send(app(1024), r#"{"name":"Aya"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "name": "Aya", "age": 0 }));
    }

    #[tokio::test]
    async fn test_invalid_body_is_rejected_with_messages() {
        let (status, body) = send(app(1024), r#"{"age":"5","x":1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!([
                "RequestBody.name is required but missing",
                "RequestBody.age is expected to be a number, but actually is a string",
                "RequestBody.x is an unexpected property",
            ])
        );
    }

    #[tokio::test]
    async fn test_non_object_body_is_a_validation_failure() {
        let (status, body) = send(app(1024), "[1]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!(["RequestBody is expected to be an object, but actually is an array"])
        );
    }

    #[tokio::test]
    async fn test_plain_text_body_reads_as_empty_object() {
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "text/plain")
            .body(Body::from(r#"{"name":"Aya"}"#))
            .unwrap();
        let response = app(1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!(["RequestBody.name is required but missing"]));
    }

    #[tokio::test]
    async fn test_oversized_body() {
        let (status, _) = send(app(4), r#"{"name":"Aya"}"#).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_validate_parsed_body() {
        let validation = BodyValidation::new(
            ObjectDataSpecification::builder("RequestBody")
                .property(PropertySpecification::boolean("flag").required())
                .build()
                .unwrap(),
        );
        assert_eq!(
            validation.validate(&json!({ "flag": true })).unwrap(),
            json!({ "flag": true })
        );
        assert!(matches!(
            validation.validate(&json!({})),
            Err(BodyRejection::Invalid(messages)) if messages.len() == 1
        ));
    }
}
