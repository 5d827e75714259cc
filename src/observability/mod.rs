//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Adapters and validation produce:
//!     → tracing events with `request = "METHOD::uri"` fields
//!     → tower-http TraceLayer spans per request
//!
//! Consumers:
//!     → logging.rs (fmt subscriber filtered by RUST_LOG or config)
//! ```

pub mod logging;
