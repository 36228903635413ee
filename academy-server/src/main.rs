use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use application::content_service::ContentService;
use application::upload_service::UploadService;
use data::repositories::slot_post_repository::SlotPostRepository;
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use infrastructure::storage::build_kv_store;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.log_format)?;

    let store = build_kv_store(&settings).await?;
    let repo = SlotPostRepository::new(store, settings.store_slot_key.clone());
    let content_service = Arc::new(ContentService::new(repo));

    let upload_service = Arc::new(UploadService::new(
        settings.upload_dir.clone(),
        settings.upload_public_path.clone(),
    ));

    let jwt = Arc::new(JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds));
    let auth_service = Arc::new(AuthService::new(
        &settings.admin_username,
        &settings.admin_password,
        jwt,
    )?);

    let state = AppState::new(content_service, upload_service, auth_service);

    info!(backend = ?settings.store_backend, slot = %settings.store_slot_key, "content store ready");
    server::run_http(&settings, state).await
}
