pub(crate) mod auth_service;
pub(crate) mod content_service;
pub(crate) mod upload_service;
