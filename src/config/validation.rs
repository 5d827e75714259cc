//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect conflicting routes and broken specification documents
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::schema::{AppConfig, TlsConfig};
use crate::http::query::QUERY_PARAMETERS_LABEL;
use crate::http::middleware::REQUEST_BODY_LABEL;

/// One semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let server = &config.server;

    if server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("\"{}\" is not a socket address", server.bind_address),
        ));
    }
    if server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be greater than 0"));
    }
    if server.body_limit_bytes == 0 {
        errors.push(ValidationError::new("server.body_limit_bytes", "must be greater than 0"));
    }
    if server.not_found_redirect.as_deref().is_some_and(str::is_empty) {
        errors.push(ValidationError::new("server.not_found_redirect", "must not be empty"));
    }
    validate_tls(&server.tls, &mut errors);

    if EnvFilter::try_new(&config.logging.level).is_err() {
        errors.push(ValidationError::new(
            "logging.level",
            format!("\"{}\" is not a valid filter directive", config.logging.level),
        ));
    }

    let mut seen = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        let field = format!("routes[{}]", i);
        if !route.path.starts_with('/') {
            errors.push(ValidationError::new(format!("{}.path", field), "must start with '/'"));
        }
        if !seen.insert((route.method, route.path.as_str())) {
            errors.push(ValidationError::new(
                field.clone(),
                format!("duplicate route {} {}", route.method, route.path),
            ));
        }
        if let Some(body) = &route.body {
            if let Err(e) = body.build(REQUEST_BODY_LABEL) {
                errors.push(ValidationError::new(format!("{}.body", field), e.to_string()));
            }
        }
        if let Some(query) = &route.query {
            if let Err(e) = query.build(QUERY_PARAMETERS_LABEL) {
                errors.push(ValidationError::new(format!("{}.query", field), e.to_string()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_tls(tls: &TlsConfig, errors: &mut Vec<ValidationError>) {
    for (name, inline, path) in [
        ("certificate", tls.certificate.is_some(), tls.certificate_path.is_some()),
        ("key", tls.key.is_some(), tls.key_path.is_some()),
    ] {
        match (inline, path) {
            (true, true) => errors.push(ValidationError::new(
                format!("server.tls.{}", name),
                format!("set either {} or {}_path, not both", name, name),
            )),
            (false, false) => errors.push(ValidationError::new(
                format!("server.tls.{}", name),
                format!("one of {} or {}_path is required", name, name),
            )),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;
    use crate::http::route::HttpMethod;
    use crate::validation::SpecificationDocument;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.tls.certificate_path = Some("cert.pem".into());
        config.server.tls.key_path = Some("key.pem".into());
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.server.bind_address = "nowhere".into();
        config.server.request_timeout_secs = 0;
        config.server.tls.key = Some("inline".into());
        config.routes = vec![
            RouteConfig {
                method: HttpMethod::Get,
                path: "items".into(),
                body: None,
                query: None,
            },
            RouteConfig {
                method: HttpMethod::Get,
                path: "items".into(),
                body: None,
                query: None,
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "server.bind_address",
                "server.request_timeout_secs",
                "server.tls.key",
                "routes[0].path",
                "routes[1].path",
                "routes[1]",
            ]
        );
    }

    #[test]
    fn test_missing_tls_material() {
        let errors = validate_config(&AppConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "server.tls.certificate");
        assert_eq!(errors[1].field, "server.tls.key");
    }

    #[test]
    fn test_broken_specification_document() {
        let mut config = valid();
        let body: SpecificationDocument = toml::from_str(
            r#"
            [[properties]]
            name = "role"
            type = "enumeration"
            "#,
        )
        .unwrap();
        config.routes.push(RouteConfig {
            method: HttpMethod::Post,
            path: "/roles".into(),
            body: Some(body),
            query: None,
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "routes[0].body");
    }
}
