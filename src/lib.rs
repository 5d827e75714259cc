//! Declarative validation of structured request data, with axum adapters.
//!
//! `validation` holds the framework-independent core: specifications,
//! the processor and its result type. `http` plugs the core into axum as
//! middleware and extractors, and bootstraps an HTTPS application.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod session;
pub mod validation;

pub use config::AppConfig;
pub use lifecycle::Shutdown;
pub use validation::{
    process, ObjectDataSpecification, ObjectSubtype, ProcessingResult, PropertySpecification,
    ValueType,
};
