// ABOUTME: HTTP request handlers for deploys and liveness.
// ABOUTME: Decodes the body, dispatches the pipeline, maps the outcome to a status code.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::deploy::{DeployRequest, DockerResponse};
use crate::runtime::FullRuntime;
use crate::server::state::AppState;

pub const EMPTY_REQUEST: &str = "Empty request";
pub const INVALID_BODY: &str = "Invalid request body structure";
pub const LIVENESS_TEXT: &str = "ascend is running";

/// Liveness handler
pub async fn liveness_handler() -> &'static str {
    LIVENESS_TEXT
}

/// Deploy handler
///
/// Suspends until the deploy task reports: `202` with the deployment
/// handle, `400` with the error otherwise.
pub async fn deploy_handler<R: FullRuntime + 'static>(
    State(state): State<AppState<R>>,
    body: Bytes,
) -> Response {
    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, EMPTY_REQUEST).into_response();
    }

    let request: DeployRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("rejecting deploy body: {}", e);
            return (StatusCode::BAD_REQUEST, INVALID_BODY).into_response();
        }
    };

    match state.orchestrator.dispatch(request).await {
        Ok(response) => {
            let status = if response.is_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::ACCEPTED
            };
            (status, Json(response)).into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(DockerResponse::Error(
                "deploy task ended without a result".to_string(),
            )),
        )
            .into_response(),
    }
}
