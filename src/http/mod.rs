//! HTTP adapters.
//!
//! # Data Flow
//! ```text
//! Request
//!     → server.rs (TraceLayer, request id, timeout)
//!     → middleware/query_validation.rs (QueryParametersProcessor → ProcessedQuery)
//!     → middleware/body_validation.rs (read JSON, validate → ProcessedBody)
//!     → handler (ValidatedBody<T> / ValidatedQuery<T> from extract.rs)
//!
//! Unmatched request
//!     → not_found.rs (302 redirect) when configured
//! ```
//!
//! # Design Decisions
//! - Adapters are thin: all decisions about data are made in `crate::validation`
//! - Validation failures are 400 with the message array; adapter faults are 500

pub mod extract;
pub mod middleware;
pub mod not_found;
pub mod query;
pub mod request;
pub mod response;
pub mod route;
pub mod server;

pub use extract::{ExtractionError, ProcessedBody, ProcessedQuery, ValidatedBody, ValidatedQuery};
pub use middleware::{
    run_middleware, validate_json_body, validate_query, BodyValidation, Middleware,
    REQUEST_BODY_LABEL,
};
pub use not_found::redirect_on_not_found;
pub use query::{
    BracketDeserializer, QueryDeserializer, QueryDeserializingError, QueryParametersProcessor,
    QueryRejection, QUERY_PARAMETERS_LABEL,
};
pub use request::{request_title, DEFAULT_BODY_SIZE_LIMIT};
pub use response::{BodyRejection, FaultBody, ValidationFailure};
pub use route::{route, HttpMethod, RouteError};
pub use server::{
    initialize_https_application, ApplicationEvents, BootstrapError, HookError, NoEvents,
};
