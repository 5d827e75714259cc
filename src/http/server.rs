//! HTTPS application bootstrap.
//!
//! # Responsibilities
//! - Create the base router (fallback redirect when configured)
//! - Load TLS material into a `RustlsConfig`
//! - Merge the application's routes and apply the ambient layers
//! - Bind with `axum_server` and shut down gracefully
//! - Notify the application through [`ApplicationEvents`] at each stage
//!
//! # Design Decisions
//! - Hooks that shape the router may fail and abort startup
//! - `on_application_started` failures are logged only; the server is already up
//! - Request ids are generated as UUID v4 and echoed in `x-request-id`

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use thiserror::Error;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::not_found::redirect_on_not_found;
use crate::lifecycle::Shutdown;
use crate::net::tls::{load_tls_config, TlsError};

/// Grace period for in-flight requests once shutdown is triggered.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

pub type HookError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid bind address \"{0}\"")]
    Address(String),

    #[error("TLS certificate is not configured")]
    MissingCertificate,

    #[error("TLS private key is not configured")]
    MissingKey,

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("{hook} failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: HookError,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Application callbacks around startup. Every hook has a no-op default.
pub trait ApplicationEvents: Send + Sync + 'static {
    /// The base router exists; nothing is registered yet.
    fn on_router_created(
        &self,
        router: Router,
    ) -> impl Future<Output = Result<Router, HookError>> + Send {
        async move { Ok(router) }
    }

    fn on_tls_configured(
        &self,
        _tls: &RustlsConfig,
    ) -> impl Future<Output = Result<(), HookError>> + Send {
        async { Ok(()) }
    }

    /// Application routes are merged; ambient layers are applied afterwards.
    fn on_routes_registered(
        &self,
        router: Router,
    ) -> impl Future<Output = Result<Router, HookError>> + Send {
        async move { Ok(router) }
    }

    fn on_application_started(
        &self,
        _address: SocketAddr,
    ) -> impl Future<Output = Result<(), HookError>> + Send {
        async { Ok(()) }
    }
}

/// Events implementation that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl ApplicationEvents for NoEvents {}

/// Base router plus `on_router_created`.
pub async fn create_router<E: ApplicationEvents>(
    config: &ServerConfig,
    events: &E,
) -> Result<Router, BootstrapError> {
    let mut router = Router::new();
    if let Some(target) = &config.not_found_redirect {
        router = router.fallback(redirect_on_not_found(target.clone()));
    }

    events
        .on_router_created(router)
        .await
        .map_err(|source| BootstrapError::Hook {
            hook: "on_router_created",
            source,
        })
}

/// Merge `controllers`, run `on_routes_registered`, then apply the ambient layers.
#[allow(deprecated)]
pub async fn register_routes<E: ApplicationEvents>(
    router: Router,
    controllers: Router,
    config: &ServerConfig,
    events: &E,
) -> Result<Router, BootstrapError> {
    let router = events
        .on_routes_registered(router.merge(controllers))
        .await
        .map_err(|source| BootstrapError::Hook {
            hook: "on_routes_registered",
            source,
        })?;

    Ok(router
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
}

/// Load the TLS material named in `config`.
pub async fn configure_tls(config: &ServerConfig) -> Result<RustlsConfig, BootstrapError> {
    let certificate = config
        .tls
        .certificate_source()
        .ok_or(BootstrapError::MissingCertificate)?;
    let key = config.tls.key_source().ok_or(BootstrapError::MissingKey)?;
    Ok(load_tls_config(&certificate, &key).await?)
}

/// Build and serve the HTTPS application until `shutdown` is triggered.
pub async fn initialize_https_application<E: ApplicationEvents>(
    config: &ServerConfig,
    controllers: Router,
    events: Arc<E>,
    shutdown: &Shutdown,
) -> Result<(), BootstrapError> {
    let address: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|_| BootstrapError::Address(config.bind_address.clone()))?;

    let router = create_router(config, events.as_ref()).await?;

    let tls = configure_tls(config).await?;
    events
        .on_tls_configured(&tls)
        .await
        .map_err(|source| BootstrapError::Hook {
            hook: "on_tls_configured",
            source,
        })?;
    tracing::info!(address = %address, "TLS configured");

    let router = register_routes(router, controllers, config, events.as_ref()).await?;

    let handle = Handle::new();

    let shutdown_handle = handle.clone();
    let stop = shutdown.wait();
    tokio::spawn(async move {
        stop.await;
        tracing::info!("Shutting down HTTPS server");
        shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
    });

    let started_handle = handle.clone();
    tokio::spawn(async move {
        let Some(local_address) = started_handle.listening().await else {
            return;
        };
        tracing::info!(address = %local_address, "HTTPS server listening");
        if let Err(e) = events.on_application_started(local_address).await {
            tracing::error!(error = %e, "on_application_started failed");
        }
    });

    axum_server::bind_rustls(address, tls)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    tracing::info!("HTTPS server stopped");
    Ok(())
}
