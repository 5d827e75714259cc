//! Fallback handler redirecting unmatched requests.

use std::future::{ready, Ready};

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// Fallback that answers every unmatched request with `302 Found` to `target`.
///
/// ```ignore
/// let router = Router::new().fallback(redirect_on_not_found("/"));
/// ```
pub fn redirect_on_not_found(
    target: impl Into<String>,
) -> impl Fn() -> Ready<Response> + Clone + Send + Sync + 'static {
    let target = target.into();
    move || {
        tracing::debug!(target = %target, "No route matched, redirecting");
        ready((StatusCode::FOUND, [(header::LOCATION, target.clone())]).into_response())
    }
}
