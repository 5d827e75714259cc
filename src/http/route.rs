//! Route registration by method name.
//!
//! Routes in configuration files name their method as a string; this module
//! turns the name into an axum [`MethodFilter`] and registers the handler.

use std::fmt;
use std::str::FromStr;

use axum::{
    handler::Handler,
    http::Method,
    routing::{on, MethodFilter},
    Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unsupported HTTP method \"{0}\"")]
    UnsupportedMethod(String),
}

/// Methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Connect,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Connect,
        HttpMethod::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Trace => "TRACE",
        }
    }

    pub fn filter(self) -> MethodFilter {
        match self {
            HttpMethod::Get => MethodFilter::GET,
            HttpMethod::Post => MethodFilter::POST,
            HttpMethod::Put => MethodFilter::PUT,
            HttpMethod::Delete => MethodFilter::DELETE,
            HttpMethod::Patch => MethodFilter::PATCH,
            HttpMethod::Head => MethodFilter::HEAD,
            HttpMethod::Options => MethodFilter::OPTIONS,
            HttpMethod::Connect => MethodFilter::CONNECT,
            HttpMethod::Trace => MethodFilter::TRACE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive.
impl FromStr for HttpMethod {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RouteError::UnsupportedMethod(s.to_string()))
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = RouteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

impl TryFrom<&Method> for HttpMethod {
    type Error = RouteError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

/// Register `handler` for `method` at `path`.
///
/// Registering several methods on the same path merges them into one route.
pub fn route<H, T, S>(router: Router<S>, method: HttpMethod, path: &str, handler: H) -> Router<S>
where
    H: Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    router.route(path, on(method.filter(), handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_parse_method_names() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!("TRACE".parse::<HttpMethod>().unwrap(), HttpMethod::Trace);
        assert_eq!(
            "fetch".parse::<HttpMethod>().unwrap_err(),
            RouteError::UnsupportedMethod("fetch".into())
        );
    }

    #[test]
    fn test_from_http_method() {
        assert_eq!(HttpMethod::try_from(&Method::OPTIONS).unwrap(), HttpMethod::Options);
        let custom = Method::from_bytes(b"PURGE").unwrap();
        assert!(HttpMethod::try_from(&custom).is_err());
    }

    #[test]
    fn test_serde_uses_method_name() {
        #[derive(Deserialize)]
        struct Entry {
            method: HttpMethod,
        }
        let entry: Entry = toml::from_str(r#"method = "delete""#).unwrap();
        assert_eq!(entry.method, HttpMethod::Delete);
        assert!(toml::from_str::<Entry>(r#"method = "nope""#).is_err());
    }

    #[tokio::test]
    async fn test_routes_on_same_path_merge() {
        let router = route(Router::new(), HttpMethod::Get, "/items", || async { "list" });
        let router = route(router, HttpMethod::Post, "/items", || async { "create" });

        for (method, expected) in [
            ("GET", StatusCode::OK),
            ("POST", StatusCode::OK),
            ("PUT", StatusCode::METHOD_NOT_ALLOWED),
        ] {
            let request = Request::builder()
                .method(method)
                .uri("/items")
                .body(Body::empty())
                .unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), expected, "{method}");
        }
    }
}
