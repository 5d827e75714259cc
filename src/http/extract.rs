//! Extractors for data produced by the validation middleware.
//!
//! The middleware store the processed data as request extensions;
//! [`ValidatedBody`] and [`ValidatedQuery`] read it back and deserialize it
//! into the handler's own type.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::http::response::FaultBody;

/// Body data accepted by `validate_json_body`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedBody(pub Value);

/// Query parameters accepted by `validate_query`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedQuery(pub Value);

/// Handler misconfiguration, never a client error.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no processed {0} on the request; is the validation middleware installed?")]
    NotProcessed(&'static str),

    #[error("processed data does not match the handler type: {0}")]
    TypeMismatch(#[from] serde_json::Error),
}

impl IntoResponse for ExtractionError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Validated data extraction failed");
        FaultBody {
            kind: "ValidatedDataExtractionError",
            title: "Validated Data Extraction Failed",
            message: "The error has occurred during extraction of validated request data",
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
        .into_response()
    }
}

/// Processed request body deserialized into `T`.
#[derive(Debug, Clone)]
pub struct ValidatedBody<T>(pub T);

/// Processed query parameters deserialized into `T`.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ExtractionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ProcessedBody(value) = parts
            .extensions
            .get::<ProcessedBody>()
            .cloned()
            .ok_or(ExtractionError::NotProcessed("body"))?;
        Ok(Self(serde_json::from_value(value)?))
    }
}

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ExtractionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ProcessedQuery(value) = parts
            .extensions
            .get::<ProcessedQuery>()
            .cloned()
            .ok_or(ExtractionError::NotProcessed("query parameters"))?;
        Ok(Self(serde_json::from_value(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Paging {
        page: u32,
    }

    fn parts() -> Parts {
        Request::builder().uri("/").body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_extracts_processed_query() {
        let mut parts = parts();
        parts.extensions.insert(ProcessedQuery(json!({ "page": 3 })));
        let ValidatedQuery(paging) = ValidatedQuery::<Paging>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(paging, Paging { page: 3 });
    }

    #[tokio::test]
    async fn test_missing_extension() {
        let mut parts = parts();
        let err = ValidatedBody::<Paging>::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::NotProcessed("body")));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_type_mismatch() {
        let mut parts = parts();
        parts.extensions.insert(ProcessedBody(json!({ "page": "three" })));
        let err = ValidatedBody::<Paging>::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::TypeMismatch(_)));
    }
}
