use anyhow::Result;
use files_service::{
    config::AppConfig,
    routes::routes::app,
    services::{
        memory_store::MemoryObjectStore, s3_store::S3ObjectStore, storage_service::ObjectStore,
    },
    state::AppState,
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config + in-memory flag ---
    let (cfg, in_memory) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting files-service with config: {:?}", cfg);
    if cfg.bucket.is_none() {
        tracing::warn!("S3_BUCKET is not set; storage endpoints will return 500");
    }

    // --- Initialize storage backend ---
    let store: Arc<dyn ObjectStore> = if in_memory {
        tracing::info!("Using in-memory object store; nothing will be persisted");
        Arc::new(MemoryObjectStore::new())
    } else {
        Arc::new(S3ObjectStore::new(cfg.region.clone(), cfg.endpoint_url.clone()).await)
    };

    // --- Build router ---
    let addr = cfg.addr();
    let host = cfg.host.clone();
    let port = cfg.port;
    let router = app(AppState::new(cfg, store));

    // --- Start server ---
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Files service listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM so in-flight requests can finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        _ = terminate => tracing::info!("Received terminate signal"),
    }

    tracing::info!("Shutting down gracefully...");
}
