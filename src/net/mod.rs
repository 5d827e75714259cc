//! Network layer.
//!
//! # Data Flow
//! ```text
//! [server.tls] config
//!     → tls.rs (read PEM material, check it, build RustlsConfig)
//!     → axum_server::bind_rustls in http/server.rs
//! ```

pub mod tls;

pub use tls::{load_tls_config, PemSource, TlsError};
