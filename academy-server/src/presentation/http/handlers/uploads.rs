use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::application::upload_service::UploadedImage;
use crate::domain::error::DomainError;
use crate::presentation::AppState;
use crate::presentation::http::forms::read_image;
use crate::presentation::http::middleware::auth::AuthenticatedAdmin;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadResponseDto {
    pub(crate) success: bool,
    pub(crate) url: String,
    pub(crate) file_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UploadErrorDto {
    pub(crate) success: bool,
    pub(crate) error: String,
}

/// Multipart form with a single `file` part.
#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct UploadFormSchema {
    /// jpeg, png, webp or gif, at most 5 MiB.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Upload failures keep the `{success, error}` body the site's forms expect.
#[derive(Debug)]
pub(crate) struct UploadError {
    status: StatusCode,
    message: String,
}

impl UploadError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DomainError> for UploadError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message, .. } => Self::bad_request(message),
            other => {
                error!(error = %other, "upload failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "upload failed".to_string(),
                }
            }
        }
    }
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(err.body_text())
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let body = UploadErrorDto {
            success: false,
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<UploadedImage> for UploadResponseDto {
    fn from(uploaded: UploadedImage) -> Self {
        Self {
            success: true,
            url: uploaded.url,
            file_name: uploaded.file_name,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "uploads",
    security(
        ("bearer_auth" = [])
    ),
    request_body(content = UploadFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = UploadResponseDto),
        (status = 400, description = "Missing file, unsupported type or too large", body = UploadErrorDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Upload failed", body = UploadErrorDto)
    )
)]
pub(crate) async fn upload_image(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponseDto>), UploadError> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            image = read_image(field).await.map_err(|err| UploadError::bad_request(err.to_string()))?;
            break;
        }
    }
    let image = image.ok_or_else(|| UploadError::bad_request("no file provided"))?;

    let uploaded = state.upload_service.store_image(image).await?;
    info!(admin = %admin.username, file_name = %uploaded.file_name, "admin uploaded image");
    Ok((StatusCode::CREATED, Json(UploadResponseDto::from(uploaded))))
}
