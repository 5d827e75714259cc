//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use route_kit::validation::{ObjectDataSpecification, ObjectSubtype, PropertySpecification};
use serde_json::Value;
use tower::ServiceExt;

/// `{ name: string (required), age: number (default 0) }`.
pub fn person(subtype: ObjectSubtype) -> ObjectDataSpecification {
    ObjectDataSpecification::builder("RequestBody")
        .subtype(subtype)
        .property(PropertySpecification::string("name").required())
        .property(PropertySpecification::number("age").default_value(0))
        .build()
        .unwrap()
}

/// Send one request through `router`, returning status and JSON body.
/// Empty bodies read as `Value::Null`.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
