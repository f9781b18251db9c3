//! HTTP server (axum)
//!
//! Binds the listener, wires [`AppState`] into the router and runs until
//! SIGINT/SIGTERM.

pub mod handler;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::config::MirrorConfig;
use crate::core::lookup::CacheLookup;
use crate::error::MirrorError;
use crate::infra::locks::KeyedLocks;
use crate::infra::origin::OriginClient;

/// State shared by all request handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<MirrorConfig>,
    pub lookup: CacheLookup,
    pub origin: OriginClient,
    /// Per-entry locks, only used with atomic writes
    pub locks: KeyedLocks,
}

impl AppState {
    /// Build the shared state from a configuration
    pub fn new(config: MirrorConfig) -> Self {
        let lookup = CacheLookup::new(config.cache_directory());
        Self {
            config: Arc::new(config),
            lookup,
            origin: OriginClient::new(),
            locks: KeyedLocks::new(),
        }
    }
}

/// Bind the configured address and serve until a shutdown signal arrives
pub async fn run(config: MirrorConfig) -> Result<(), MirrorError> {
    let addr = config.listen();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| MirrorError::Bind { addr, source })?;

    info!(
        site = %config.site(),
        cache_directory = %config.cache_directory().display(),
        atomic_writes = config.atomic_writes(),
        "mirroring"
    );
    info!(%addr, "listening");

    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    config: MirrorConfig,
    shutdown: F,
) -> Result<(), MirrorError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = handler::create_router(AppState::new(config));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|source| MirrorError::Serve { source })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT"),
        () = terminate => info!("received SIGTERM"),
    }
}
