use crate::domain::error::DomainError;
use crate::server::routing::create_router;
use crate::NewsRag;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serves the retrieval API until the process receives Ctrl-C.
pub async fn start_server(app: Arc<NewsRag>, addr: SocketAddr) -> Result<(), DomainError> {
    let router = create_router(app.clone());

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| DomainError::Io(format!("bind {addr}: {e}")))?;
    tracing::info!(%addr, collection = app.collection(), "retrieval server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DomainError::Io(format!("server error: {e}")))?;

    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
