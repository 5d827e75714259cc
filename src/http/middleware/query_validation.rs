//! Query parameter validation middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::extract::ProcessedQuery;
use crate::http::query::{QueryParametersProcessor, QueryRejection};
use crate::http::request::request_title;

/// Middleware for `from_fn_with_state(Arc<QueryParametersProcessor>, validate_query)`.
///
/// On success the processed parameters are attached as [`ProcessedQuery`];
/// the raw query string is left untouched.
pub async fn validate_query(
    State(processor): State<Arc<QueryParametersProcessor>>,
    mut request: Request,
    next: Next,
) -> Response {
    match processor.process(request.uri()) {
        Ok(processed) => {
            request.extensions_mut().insert(ProcessedQuery(processed));
            next.run(request).await
        }
        Err(rejection) => {
            if let QueryRejection::Invalid(messages) = &rejection {
                tracing::debug!(
                    request = %request_title(request.method(), request.uri()),
                    errors = messages.len(),
                    "Query parameters failed validation"
                );
            }
            rejection.into_response()
        }
    }
}
