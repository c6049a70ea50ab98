//! HTTP surface: routing, handlers and the JSON response envelope.

mod handlers;
mod response;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, patch},
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;

use crate::application::WalletService;
use crate::config::ServerConfig;

pub use handlers::*;
pub use response::*;

/// Route for reading a balance record.
pub const USER_BALANCE: &str = "/api/user-balance/{id}";
/// Route for disbursing a user's balance.
pub const DISBURSE_BALANCE: &str = "/api/user-balance/{id}/disburse";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WalletService>,
}

impl AppState {
    pub fn new(service: WalletService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(USER_BALANCE, get(get_user_balance))
        .route(DISBURSE_BALANCE, patch(disburse_balance))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until ctrl+c or SIGTERM.
pub async fn run(state: AppState, config: &ServerConfig) -> Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("HTTP server listening on {}", addr);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(graceful_shutdown())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Wait for either the ctrl+c or terminate signal, whichever comes first.
async fn graceful_shutdown() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::debug!("Received ctrl+c signal."),
        _ = terminate => tracing::debug!("Received terminate signal."),
    }
}
