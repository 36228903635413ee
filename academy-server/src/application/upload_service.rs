use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, error};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::image::ImagePayload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UploadedImage {
    pub(crate) url: String,
    pub(crate) file_name: String,
}

/// Writes uploaded images into a directory that is served under `public_path`.
pub(crate) struct UploadService {
    dir: PathBuf,
    public_path: String,
}

impl UploadService {
    pub(crate) fn new(dir: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_path: public_path.into(),
        }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn public_path(&self) -> &str {
        &self.public_path
    }

    pub(crate) async fn store_image(
        &self,
        image: ImagePayload,
    ) -> Result<UploadedImage, DomainError> {
        image.validate_for_upload()?;

        let extension = image
            .extension()
            .unwrap_or_else(|| fallback_extension(&image.mime()).to_string());
        let file_name = format!("{}.{extension}", Uuid::new_v4());
        let path = self.dir.join(&file_name);

        fs::create_dir_all(&self.dir).await.map_err(|err| {
            error!(dir = %self.dir.display(), error = %err, "failed to create upload dir");
            DomainError::Unexpected(format!("failed to prepare upload dir: {err}"))
        })?;
        fs::write(&path, &image.bytes).await.map_err(|err| {
            error!(path = %path.display(), error = %err, "failed to write upload");
            DomainError::Unexpected(format!("failed to save upload: {err}"))
        })?;

        debug!(file_name = %file_name, size = image.bytes.len(), "image uploaded");
        Ok(UploadedImage {
            url: format!("{}/{file_name}", self.public_path.trim_end_matches('/')),
            file_name,
        })
    }
}

fn fallback_extension(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::UploadService;
    use crate::domain::error::DomainError;
    use crate::domain::image::{ImagePayload, MAX_IMAGE_BYTES};

    #[tokio::test]
    async fn store_image_writes_file_with_random_name_and_original_extension() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let service = UploadService::new(dir.path().join("uploads"), "/uploads/");

        let image = ImagePayload::new(Some("Campus.PNG".to_string()), "image/png", vec![1, 2, 3]);
        let uploaded = service.store_image(image).await.expect("upload must succeed");

        assert!(uploaded.file_name.ends_with(".png"));
        assert_ne!(uploaded.file_name, "Campus.png");
        assert_eq!(uploaded.url, format!("/uploads/{}", uploaded.file_name));

        let written = std::fs::read(service.dir().join(&uploaded.file_name))
            .expect("file must be written");
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn store_image_without_extension_uses_content_type() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let service = UploadService::new(dir.path(), "/uploads");

        let image = ImagePayload::new(Some("blob".to_string()), "image/webp", vec![1]);
        let uploaded = service.store_image(image).await.expect("upload must succeed");
        assert!(uploaded.file_name.ends_with(".webp"));
    }

    #[tokio::test]
    async fn store_image_rejects_unlisted_type_without_writing() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let service = UploadService::new(dir.path().join("uploads"), "/uploads");

        let image = ImagePayload::new(Some("a.txt".to_string()), "text/plain", b"x".to_vec());
        let err = service.store_image(image).await.expect_err("must be rejected");

        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(!service.dir().exists());
    }

    #[tokio::test]
    async fn store_image_rejects_oversized_file() {
        let dir = tempfile::tempdir().expect("tempdir must be created");
        let service = UploadService::new(dir.path(), "/uploads");

        let image = ImagePayload::new(
            Some("big.jpg".to_string()),
            "image/jpeg",
            vec![0; MAX_IMAGE_BYTES + 1],
        );
        assert!(service.store_image(image).await.is_err());
    }
}
