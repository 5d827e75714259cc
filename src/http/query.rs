//! Query parameter processing.
//!
//! # Responsibilities
//! - Deserialize the raw query string into a JSON object
//! - Validate it against a fixed-key specification with string coercion
//! - Separate validation failures (400) from deserializing faults (500)
//!
//! # Design Decisions
//! - The deserializer is per processor, not a process-wide mutable default
//! - The default deserializer understands `a=1`, repeated keys, `a[]=1` and `a[b]=1`
//! - Bracket nesting beyond the depth limit is kept as a literal key segment

use std::fmt;
use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use thiserror::Error;
use url::form_urlencoded;

use crate::http::response::{FaultBody, ValidationFailure};
use crate::validation::{
    process_with, ObjectDataSpecification, ObjectSubtype, ProcessingOptions, ProcessingResult,
    PropertySpecification, SpecificationError,
};

/// Label of every query parameter specification.
pub const QUERY_PARAMETERS_LABEL: &str = "DeserializedQueryParameters";

/// The query string could not be turned into an object.
#[derive(Debug, Clone, Error)]
#[error("The error has occurred during deserializing of query parameters: {detail}")]
pub struct QueryDeserializingError {
    detail: String,
}

impl QueryDeserializingError {
    pub const NAME: &'static str = "QueryParametersDeserializingError";
    pub const TITLE: &'static str = "Query Parameters Deserializing Failed";
    pub const DESCRIPTION: &'static str =
        "The error has occurred during deserializing of query parameters";

    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for QueryDeserializingError {
    fn into_response(self) -> Response {
        FaultBody {
            kind: Self::NAME,
            title: Self::TITLE,
            message: Self::DESCRIPTION,
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
        .into_response()
    }
}

/// Turns a serialized query string (without the leading `?`) into a value.
pub trait QueryDeserializer: Send + Sync + 'static {
    fn deserialize(&self, serialized: &str) -> Result<Value, QueryDeserializingError>;
}

impl<F> QueryDeserializer for F
where
    F: Fn(&str) -> Result<Value, QueryDeserializingError> + Send + Sync + 'static,
{
    fn deserialize(&self, serialized: &str) -> Result<Value, QueryDeserializingError> {
        self(serialized)
    }
}

/// Default deserializer with bracket notation.
#[derive(Debug, Clone, Copy)]
pub struct BracketDeserializer {
    depth: usize,
}

impl BracketDeserializer {
    pub const DEFAULT_DEPTH: usize = 5;

    pub fn with_depth(depth: usize) -> Self {
        Self { depth }
    }

    /// Split `a[b][c]` into `["a", "b", "c"]`. Keys that do not follow the
    /// notation are kept whole.
    fn segments(&self, key: &str) -> Vec<String> {
        let Some(open) = key.find('[') else {
            return vec![key.to_string()];
        };
        if open == 0 {
            return vec![key.to_string()];
        }

        let mut segments = vec![key[..open].to_string()];
        let mut rest = &key[open..];
        while segments.len() <= self.depth && rest.starts_with('[') {
            let Some(close) = rest.find(']') else {
                break;
            };
            segments.push(rest[1..close].to_string());
            rest = &rest[close + 1..];
        }

        if !rest.is_empty() {
            if segments.len() == 1 {
                return vec![key.to_string()];
            }
            segments.push(rest.to_string());
        }
        segments
    }
}

impl Default for BracketDeserializer {
    fn default() -> Self {
        Self::with_depth(Self::DEFAULT_DEPTH)
    }
}

impl QueryDeserializer for BracketDeserializer {
    fn deserialize(&self, serialized: &str) -> Result<Value, QueryDeserializingError> {
        let mut root = Map::new();
        for (key, value) in form_urlencoded::parse(serialized.as_bytes()) {
            if key.is_empty() {
                continue;
            }
            let segments = self.segments(&key);
            insert(&mut root, &segments, value.into_owned(), &key)?;
        }
        Ok(Value::Object(root))
    }
}

fn insert(
    target: &mut Map<String, Value>,
    segments: &[String],
    value: String,
    key: &str,
) -> Result<(), QueryDeserializingError> {
    let conflict = || {
        QueryDeserializingError::new(format!(
            "parameter \"{}\" is used both as a value and as a nested object",
            key
        ))
    };

    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };

    match rest {
        [] => set_or_append(target, head, value, false).map_err(|_| conflict()),
        [segment] if segment.is_empty() => {
            set_or_append(target, head, value, true).map_err(|_| conflict())
        }
        [first, ..] if first.is_empty() => Err(QueryDeserializingError::new(format!(
            "parameter \"{}\" nests values inside an array, which is not supported",
            key
        ))),
        _ => {
            let entry = target
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            match entry {
                Value::Object(child) => insert(child, rest, value, key),
                _ => Err(conflict()),
            }
        }
    }
}

/// Store a leaf value. Repeated keys and `[]` keys collect into an array;
/// fails when the key already holds an object.
fn set_or_append(
    target: &mut Map<String, Value>,
    head: &str,
    value: String,
    as_array: bool,
) -> Result<(), ()> {
    match target.get_mut(head) {
        None if as_array => {
            target.insert(head.to_string(), Value::Array(vec![Value::String(value)]));
        }
        None => {
            target.insert(head.to_string(), Value::String(value));
        }
        Some(Value::Array(items)) => items.push(Value::String(value)),
        Some(existing @ Value::String(_)) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, Value::String(value)]);
        }
        Some(_) => return Err(()),
    }
    Ok(())
}

/// Why query parameters were not accepted.
#[derive(Debug, Error)]
pub enum QueryRejection {
    #[error(transparent)]
    Deserializing(#[from] QueryDeserializingError),

    #[error("query parameters failed validation with {} message(s)", .0.len())]
    Invalid(Vec<String>),
}

impl IntoResponse for QueryRejection {
    fn into_response(self) -> Response {
        match self {
            QueryRejection::Deserializing(error) => error.into_response(),
            QueryRejection::Invalid(messages) => ValidationFailure(messages).into_response(),
        }
    }
}

/// Validates the query string of a request against a fixed-key specification.
#[derive(Clone)]
pub struct QueryParametersProcessor {
    specification: Arc<ObjectDataSpecification>,
    deserializer: Arc<dyn QueryDeserializer>,
}

impl QueryParametersProcessor {
    /// Build the specification from its properties.
    pub fn new(
        properties: impl IntoIterator<Item = PropertySpecification>,
    ) -> Result<Self, SpecificationError> {
        let specification = ObjectDataSpecification::builder(QUERY_PARAMETERS_LABEL)
            .subtype(ObjectSubtype::FixedKeys)
            .properties(properties)
            .build()?;
        Ok(Self::from_specification(specification))
    }

    /// Use an already built specification as is.
    pub fn from_specification(specification: ObjectDataSpecification) -> Self {
        Self {
            specification: Arc::new(specification),
            deserializer: Arc::new(BracketDeserializer::default()),
        }
    }

    pub fn with_deserializer(mut self, deserializer: impl QueryDeserializer) -> Self {
        self.deserializer = Arc::new(deserializer);
        self
    }

    pub fn specification(&self) -> &ObjectDataSpecification {
        &self.specification
    }

    /// Process the query string of `uri`. A missing query is an empty object.
    pub fn process(&self, uri: &Uri) -> Result<Value, QueryRejection> {
        self.process_str(uri.query().unwrap_or(""))
    }

    pub fn process_str(&self, serialized: &str) -> Result<Value, QueryRejection> {
        let deserialized = self.deserializer.deserialize(serialized).map_err(|e| {
            tracing::error!(
                error = %e,
                location = "QueryParametersProcessor::process",
                "{}",
                QueryDeserializingError::TITLE
            );
            e
        })?;

        match process_with(
            &deserialized,
            &self.specification,
            &ProcessingOptions::query_parameters(),
        ) {
            ProcessingResult::Valid { processed_data } => Ok(processed_data),
            ProcessingResult::Invalid {
                validation_errors_messages,
            } => Err(QueryRejection::Invalid(validation_errors_messages)),
        }
    }
}

impl fmt::Debug for QueryParametersProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParametersProcessor")
            .field("specification", &self.specification)
            .finish_non_exhaustive()
    }
}
