// ABOUTME: Router construction and the listening loop.
// ABOUTME: Stops accepting connections when the shutdown future resolves.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::deploy::Orchestrator;
use crate::error::{Error, Result};
use crate::runtime::FullRuntime;
use crate::server::handlers::{deploy_handler, liveness_handler};
use crate::server::state::AppState;

/// Build the application router around `orchestrator`.
pub fn router<R: FullRuntime + 'static>(orchestrator: Arc<Orchestrator<R>>) -> Router {
    Router::new()
        .route("/", get(liveness_handler))
        .route("/deploy", post(deploy_handler::<R>))
        .with_state(AppState::new(orchestrator))
        .layer(TraceLayer::new_for_http())
}

/// Serve on `listen` until `shutdown_signal` resolves.
pub async fn serve<R: FullRuntime + 'static>(
    listen: &str,
    orchestrator: Arc<Orchestrator<R>>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = router(orchestrator);

    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| Error::Server(format!("cannot listen on {}: {}", listen, e)))?;
    info!("Starting HTTP server on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| Error::Server(e.to_string()))
}
