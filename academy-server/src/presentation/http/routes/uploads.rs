use axum::Router;
use axum::middleware;
use axum::routing::post;

use crate::presentation::AppState;
use crate::presentation::http::handlers::uploads::upload_image;
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_image))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
