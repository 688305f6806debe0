//! Server lifecycle management - startup, shutdown, and signal handling

use std::net::SocketAddr;

use axum::Router;
use tokio::signal;
use tracing::{error, info, warn};

use crate::errors::{HttpError, HttpResult};

/// Serve `router` on `addr` until ctrl-c or SIGTERM
pub async fn start_server(addr: SocketAddr, router: Router) -> HttpResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| HttpError::server(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HttpError::server(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down gracefully...");
        },
    }
}
