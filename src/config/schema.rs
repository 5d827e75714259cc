//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::http::request::DEFAULT_BODY_SIZE_LIMIT;
use crate::http::route::HttpMethod;
use crate::net::tls::PemSource;
use crate::validation::SpecificationDocument;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener, TLS and request limits.
    pub server: ServerConfig,

    pub logging: LoggingConfig,

    /// Validated routes served by `route-kit serve`.
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum JSON body size in bytes.
    pub body_limit_bytes: usize,

    /// Redirect target for unmatched requests. Unset means plain 404.
    pub not_found_redirect: Option<String>,

    pub tls: TlsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            request_timeout_secs: 30,
            body_limit_bytes: DEFAULT_BODY_SIZE_LIMIT,
            not_found_redirect: None,
            tls: TlsConfig::default(),
        }
    }
}

/// TLS material. Each of certificate and key is given either inline or as a path.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TlsConfig {
    /// Inline PEM certificate chain.
    pub certificate: Option<String>,
    pub certificate_path: Option<PathBuf>,

    /// Inline PEM private key.
    pub key: Option<String>,
    pub key_path: Option<PathBuf>,
}

impl TlsConfig {
    pub fn certificate_source(&self) -> Option<PemSource> {
        pem_source(&self.certificate, &self.certificate_path)
    }

    pub fn key_source(&self) -> Option<PemSource> {
        pem_source(&self.key, &self.key_path)
    }
}

fn pem_source(inline: &Option<String>, path: &Option<PathBuf>) -> Option<PemSource> {
    match (inline, path) {
        (Some(pem), _) => Some(PemSource::Inline(pem.clone())),
        (None, Some(path)) => Some(PemSource::File(path.clone())),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,

    /// Log parsed request bodies at info instead of debug.
    pub log_parsed_bodies: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_parsed_bodies: false,
        }
    }
}

/// One validated route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    pub method: HttpMethod,

    pub path: String,

    /// Request body specification. Labelled `RequestBody` unless it names itself.
    #[serde(default)]
    pub body: Option<SpecificationDocument>,

    /// Query parameters specification.
    #[serde(default)]
    pub query: Option<SpecificationDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8443");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.server.body_limit_bytes, DEFAULT_BODY_SIZE_LIMIT);
        assert_eq!(config.logging.level, "info");
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_routes_with_documents() {
        let config: AppConfig = toml::from_str(
            r#"
            [server.tls]
            certificate_path = "cert.pem"
            key = "inline"

            [[routes]]
            method = "post"
            path = "/users"

            [[routes.body.properties]]
            name = "email"
            type = "string"
            required = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.server.tls.certificate_source(),
            Some(PemSource::File(PathBuf::from("cert.pem")))
        );
        assert_eq!(config.server.tls.key_source(), Some(PemSource::Inline("inline".into())));

        let route = &config.routes[0];
        assert_eq!(route.method, HttpMethod::Post);
        let body = route.body.as_ref().unwrap().build("RequestBody").unwrap();
        assert!(body.property("email").unwrap().is_required());
        assert!(route.query.is_none());
    }
}
