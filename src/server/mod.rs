// ABOUTME: HTTP surface: POST /deploy and a liveness probe on GET /.
// ABOUTME: Each deploy request is answered with exactly one DockerResponse.

mod handlers;
mod serve;
mod state;

pub use handlers::{EMPTY_REQUEST, INVALID_BODY, LIVENESS_TEXT, deploy_handler, liveness_handler};
pub use serve::{router, serve};
pub use state::AppState;
