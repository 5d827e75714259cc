//! Structured data validation subsystem.
//!
//! # Data Flow
//! ```text
//! route registration
//!     → types.rs (PropertySpecification / ObjectDataSpecification builders)
//!     → build() rejects malformed specifications (SpecificationError)
//!     → Arc<ObjectDataSpecification>, shared read-only by all requests
//!
//! per request
//!     raw serde_json::Value (body, deserialized query)
//!     → processor.rs (type checks, nesting, validators, transformers)
//!     → ProcessingResult::Valid { processed_data }
//!       | ProcessingResult::Invalid { validation_errors_messages }
//! ```
//!
//! # Design Decisions
//! - Validation failures are data, never `Err`: callers always get the full list
//! - Errors are collected in one pass, in property declaration order
//! - Nested specifications are owned and built bottom-up, so cycles cannot be expressed
//! - Processing is pure and reentrant; specifications are `Send + Sync`

pub mod document;
pub mod error;
pub mod processor;
pub mod result;
pub mod types;

pub use document::{DocumentError, PropertyDocument, SpecificationDocument, Transform, TypeName};
pub use error::SpecificationError;
pub use processor::{process, process_with, ProcessingOptions};
pub use result::ProcessingResult;
pub use types::{
    describe, CustomValidator, ObjectDataSpecification, ObjectSubtype, PropertySpecification,
    SpecificationBuilder, Transformer, ValueType,
};
