use axum::{Router, routing::get};
use tower_http::services::ServeDir;

use super::AppState;

pub(crate) mod app_error;
pub(crate) mod forms;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

/// API routes plus the directory uploaded images are served from.
pub(crate) fn routes(state: AppState) -> Router {
    let uploads = ServeDir::new(state.upload_service.dir());
    let public_path = state.upload_service.public_path().to_string();

    Router::new()
        .route("/healthz", get(handlers::health::healthz))
        .merge(routes::router(state.clone()))
        .nest_service(&public_path, uploads)
        .with_state(state)
}
