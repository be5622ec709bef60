//! Web server module for the pod registry.
//!
//! This module contains the Axum web server implementation that provides
//! the registration pages, the admin pages and the JSON API.

pub mod auth;
pub mod error;
pub mod negotiate;
pub mod pages;
pub mod routes;

use std::net::SocketAddr;
use tracing::{error, info};

use crate::config::Config;
use crate::pod::Registry;

// Re-export main server functionality
pub use error::ApiError;
pub use negotiate::ResponseFormat;
pub use routes::{AppState, create_router};

/// Serves `registry` on `config.bind` until Ctrl-C.
pub async fn serve(config: &Config, registry: Registry) -> std::io::Result<()> {
    let state = AppState::new(registry, config.admin.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    info!("  GET  /                   - Registration form");
    info!("  GET  /student/<pod>      - Student page (JSON with Accept: application/json)");
    info!("  GET  /admin/             - Admin table (basic auth)");
    info!("  GET  /health             - Health check");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
