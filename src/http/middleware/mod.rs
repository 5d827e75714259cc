//! Middleware building blocks.
//!
//! # Responsibilities
//! - `Middleware` trait for request handlers that may fail
//! - Body and query validation middleware
//!
//! # Design Decisions
//! - Everything plugs in through `axum::middleware::from_fn_with_state`
//! - A failing middleware is logged, then its error becomes the response

pub mod body_validation;
pub mod query_validation;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::request_title;

pub use body_validation::{validate_json_body, BodyValidation, REQUEST_BODY_LABEL};
pub use query_validation::validate_query;

/// A request handler that sits in front of the route handler.
///
/// ```ignore
/// let router = Router::new()
///     .route("/", get(handler))
///     .layer(middleware::from_fn_with_state(
///         Arc::new(RequireTenant),
///         run_middleware::<RequireTenant>,
///     ));
/// ```
pub trait Middleware: Send + Sync + 'static {
    type Error: IntoResponse + fmt::Display + Send;

    /// Handle the request, usually finishing with `next.run(request)`.
    fn handle_request(
        &self,
        request: Request,
        next: Next,
    ) -> impl Future<Output = Result<Response, Self::Error>> + Send;
}

/// Adapts a [`Middleware`] to `from_fn_with_state`.
pub async fn run_middleware<M: Middleware>(
    State(middleware): State<Arc<M>>,
    request: Request,
    next: Next,
) -> Response {
    let title = request_title(request.method(), request.uri());

    match middleware.handle_request(request, next).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(request = %title, error = %error, "Middleware failed");
            error.into_response()
        }
    }
}
