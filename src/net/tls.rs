//! TLS configuration and certificate loading.
//!
//! Certificate and key can each be given inline as PEM text or as a path to
//! a PEM file. Both are checked before they reach rustls so a bad
//! configuration fails with a message naming the missing piece.

use std::io;
use std::path::PathBuf;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

/// Where a piece of PEM material comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PemSource {
    Inline(String),
    File(PathBuf),
}

impl PemSource {
    async fn read(&self) -> Result<Vec<u8>, TlsError> {
        match self {
            PemSource::Inline(pem) => Ok(pem.as_bytes().to_vec()),
            PemSource::File(path) => tokio::fs::read(path).await.map_err(|source| TlsError::Read {
                path: path.clone(),
                source,
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("no certificate found in the certificate PEM")]
    NoCertificates,

    #[error("certificate PEM is malformed: {0}")]
    InvalidCertificate(io::Error),

    #[error("no private key found in the key PEM")]
    NoPrivateKey,

    #[error("private key PEM is malformed: {0}")]
    InvalidKey(io::Error),

    #[error("TLS configuration rejected: {0}")]
    Config(io::Error),
}

/// Check that `certificate` holds at least one certificate and `key` a private key.
pub fn check_pem(certificate: &[u8], key: &[u8]) -> Result<(), TlsError> {
    let certificates = rustls_pemfile::certs(&mut &certificate[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(TlsError::InvalidCertificate)?;
    if certificates.is_empty() {
        return Err(TlsError::NoCertificates);
    }

    match rustls_pemfile::private_key(&mut &key[..]) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(TlsError::NoPrivateKey),
        Err(e) => Err(TlsError::InvalidKey(e)),
    }
}

/// Load TLS configuration from certificate and key sources.
pub async fn load_tls_config(
    certificate: &PemSource,
    key: &PemSource,
) -> Result<RustlsConfig, TlsError> {
    let certificate = certificate.read().await?;
    let key = key.read().await?;
    check_pem(&certificate, &key)?;

    RustlsConfig::from_pem(certificate, key)
        .await
        .map_err(TlsError::Config)
}
