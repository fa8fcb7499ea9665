//! HTTP front end speaking the subset of the Galaxy v2 API that
//! `ansible-galaxy collection install` uses.

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod error;
pub mod handlers;
pub mod responses;
pub mod state;

pub use state::AppState;

const COLLECTION: &str = "/api/v2/collections/{namespace}/{collection}/";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/", get(handlers::api_root))
        .route(COLLECTION, get(handlers::collection))
        .route(&format!("{COLLECTION}versions/"), get(handlers::versions))
        .route(
            &format!("{COLLECTION}versions/{{version}}"),
            get(handlers::version_detail),
        )
        .route(
            &format!("{COLLECTION}versions/{{version}}/"),
            get(handlers::version_detail),
        )
        .route("/dl/{filename}", get(handlers::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until interrupted with Ctrl-C.
pub async fn serve(state: AppState, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening: {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("unable to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
