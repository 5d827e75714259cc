//! Request helpers shared by the adapters.
//!
//! # Responsibilities
//! - Build the `METHOD::uri` title used in log events
//! - Read a JSON body under a size limit
//!
//! # Design Decisions
//! - An empty body reads as `{}` so validation reports the missing keys
//! - A body declared as something other than JSON is not parsed and reads as `{}`
//! - Declared `Content-Length` over the limit is rejected before reading

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Uri},
};
use serde_json::{Map, Value};

use crate::http::response::BodyRejection;

/// Default body size limit (100 KiB).
pub const DEFAULT_BODY_SIZE_LIMIT: usize = 100 * 1024;

/// Title used for log events about one request.
pub fn request_title(method: &Method, uri: &Uri) -> String {
    format!("{}::{}", method.as_str().to_uppercase(), uri)
}

/// Whether `Content-Type` is absent or names a JSON media type.
pub fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(content_type) = content_type.to_str() else {
        return false;
    };
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json"
        || (media_type.starts_with("application/") && media_type.ends_with("+json"))
}

/// Read and parse a JSON body of at most `limit` bytes.
pub async fn read_json_body(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<Value, BodyRejection> {
    let declared_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_length.is_some_and(|length| length > limit) {
        return Err(BodyRejection::TooLarge { limit });
    }

    let bytes = to_bytes(body, limit)
        .await
        .map_err(|e| BodyRejection::Unreadable(e.to_string()))?;

    if !is_json_content(headers) || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_request_title() {
        let uri: Uri = "/users?page=2".parse().unwrap();
        assert_eq!(request_title(&Method::POST, &uri), "POST::/users?page=2");
    }

    #[tokio::test]
    async fn test_empty_body_reads_as_empty_object() {
        let value = read_json_body(&HeaderMap::new(), Body::empty(), 16).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_parses_json() {
        let value = read_json_body(&HeaderMap::new(), Body::from(r#"{"a":1}"#), 64)
            .await
            .unwrap();
        assert_eq!(value, json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn test_declared_length_over_limit() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("1000"));
        let err = read_json_body(&headers, Body::from("{}"), 16).await.unwrap_err();
        assert!(matches!(err, BodyRejection::TooLarge { limit: 16 }));
    }

    #[tokio::test]
    async fn test_streamed_body_over_limit_is_unreadable() {
        let err = read_json_body(&HeaderMap::new(), Body::from("x".repeat(64)), 16)
            .await
            .unwrap_err();
        assert!(matches!(err, BodyRejection::Unreadable(_)));
    }

    #[test]
    fn test_json_content_types() {
        let with = |value: &'static str| {
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
            headers
        };
        assert!(is_json_content(&HeaderMap::new()));
        assert!(is_json_content(&with("application/json")));
        assert!(is_json_content(&with("Application/JSON; charset=utf-8")));
        assert!(is_json_content(&with("application/merge-patch+json")));
        assert!(!is_json_content(&with("text/plain")));
        assert!(!is_json_content(&with("application/x-www-form-urlencoded")));
    }

    #[tokio::test]
    async fn test_non_json_body_is_not_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let value = read_json_body(&headers, Body::from("{nope"), 64).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let err = read_json_body(&HeaderMap::new(), Body::from("{nope"), 64)
            .await
            .unwrap_err();
        assert!(matches!(err, BodyRejection::MalformedJson(_)));
    }
}
