//! Startup orchestration for `route-kit serve`.
//!
//! # Responsibilities
//! - Turn configured routes into validating echo handlers
//! - Hand the routes to the HTTPS bootstrap
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Query validation runs before body validation

use std::sync::Arc;

use axum::{
    middleware,
    routing::{on, MethodRouter},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{AppConfig, ConfigError, RouteConfig};
use crate::http::{
    extract::{ProcessedBody, ProcessedQuery},
    middleware::{validate_json_body, validate_query, BodyValidation, REQUEST_BODY_LABEL},
    query::{QueryParametersProcessor, QUERY_PARAMETERS_LABEL},
    server::{initialize_https_application, ApplicationEvents, BootstrapError},
};
use crate::lifecycle::Shutdown;
use crate::validation::SpecificationError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("route {route}: {source}")]
    Specification {
        route: String,
        #[source]
        source: SpecificationError,
    },

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}

/// Echo whatever the validation middleware accepted.
async fn echo(
    body: Option<Extension<ProcessedBody>>,
    query: Option<Extension<ProcessedQuery>>,
) -> Json<Value> {
    Json(json!({
        "body": body.map(|Extension(ProcessedBody(value))| value),
        "query": query.map(|Extension(ProcessedQuery(value))| value),
    }))
}

fn route_handler(route: &RouteConfig, config: &AppConfig) -> Result<MethodRouter, StartupError> {
    let describe = |source| StartupError::Specification {
        route: format!("{} {}", route.method, route.path),
        source,
    };
    let mut handler = on(route.method.filter(), echo);

    if let Some(document) = &route.body {
        let specification = document.build(REQUEST_BODY_LABEL).map_err(describe)?;
        let validation = BodyValidation::new(specification)
            .with_body_size_limit(config.server.body_limit_bytes)
            .with_parsed_body_logging(config.logging.log_parsed_bodies);
        handler = handler.route_layer(middleware::from_fn_with_state(
            Arc::new(validation),
            validate_json_body,
        ));
    }
    if let Some(document) = &route.query {
        let specification = document.build(QUERY_PARAMETERS_LABEL).map_err(describe)?;
        let processor = QueryParametersProcessor::from_specification(specification);
        handler = handler.route_layer(middleware::from_fn_with_state(
            Arc::new(processor),
            validate_query,
        ));
    }

    Ok(handler)
}

/// Router with one echo handler per configured route.
pub fn build_controllers(config: &AppConfig) -> Result<Router, StartupError> {
    let mut router = Router::new();
    for route in &config.routes {
        router = router.route(&route.path, route_handler(route, config)?);
        tracing::info!(method = %route.method, path = %route.path, "Route registered");
    }
    Ok(router)
}

/// Serve the configured routes until `shutdown` is triggered.
pub async fn serve<E: ApplicationEvents>(
    config: &AppConfig,
    events: Arc<E>,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.server.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    let controllers = build_controllers(config)?;
    initialize_https_application(&config.server, controllers, events, shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    const CONFIG: &str = r#"
        [server.tls]
        certificate_path = "cert.pem"
        key_path = "key.pem"

        [[routes]]
        method = "post"
        path = "/users"

        [[routes.body.properties]]
        name = "name"
        type = "string"
        required = true
        transforms = ["trim"]

        [[routes.query.properties]]
        name = "dry_run"
        type = "boolean"
        default = false

        [[routes]]
        method = "get"
        path = "/users"
    "#;

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_echo_routes_validate() {
        let router = build_controllers(&parse_config(CONFIG).unwrap()).unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/users?dry_run=true")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"  Aya "}"#))
            .unwrap();
        let (status, body) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "body": { "name": "Aya" }, "query": { "dry_run": true } }));

        let request = Request::builder()
            .method("POST")
            .uri("/users?verbose=1")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!(["DeserializedQueryParameters.verbose is an unexpected property"]));

        let request = Request::builder().uri("/users").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "body": null, "query": null }));
    }
}
