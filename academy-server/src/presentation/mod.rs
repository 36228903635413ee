use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::content_service::ContentService;
use crate::application::upload_service::UploadService;
use crate::data::repositories::slot_post_repository::SlotPostRepository;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) content_service: Arc<ContentService<SlotPostRepository>>,
    pub(crate) upload_service: Arc<UploadService>,
    pub(crate) auth_service: Arc<AuthService>,
}

impl AppState {
    pub(crate) fn new(
        content_service: Arc<ContentService<SlotPostRepository>>,
        upload_service: Arc<UploadService>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            content_service,
            upload_service,
            auth_service,
        }
    }
}
