use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::DomainError;

pub(crate) const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Content types the upload endpoint writes to disk.
pub(crate) const UPLOAD_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Raw image bytes as received from a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImagePayload {
    pub(crate) file_name: Option<String>,
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

impl ImagePayload {
    pub(crate) fn new(
        file_name: Option<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name,
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub(crate) fn mime(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    /// Any `image/*` type up to [`MAX_IMAGE_BYTES`].
    pub(crate) fn validate(&self) -> Result<(), DomainError> {
        let mime = self.mime();
        if !mime.starts_with("image/") || mime.len() == "image/".len() {
            return Err(DomainError::validation(
                "image",
                format!(
                    "unsupported content type '{}', expected an image",
                    self.content_type
                ),
            ));
        }
        self.validate_size()
    }

    /// Stricter check used by the upload endpoint: only the listed formats.
    pub(crate) fn validate_for_upload(&self) -> Result<(), DomainError> {
        let mime = self.mime();
        if !UPLOAD_CONTENT_TYPES.contains(&mime.as_str()) {
            return Err(DomainError::validation(
                "file",
                format!(
                    "unsupported content type '{}', allowed: {}",
                    self.content_type,
                    UPLOAD_CONTENT_TYPES.join(", ")
                ),
            ));
        }
        self.validate_size()
    }

    fn validate_size(&self) -> Result<(), DomainError> {
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(DomainError::validation(
                "image",
                format!(
                    "image is {} bytes, maximum is {MAX_IMAGE_BYTES} bytes (5 MiB)",
                    self.bytes.len()
                ),
            ));
        }
        Ok(())
    }

    /// Validates and encodes the payload as a `data:` URL.
    pub(crate) fn into_data_url(self) -> Result<String, DomainError> {
        self.validate()?;
        Ok(format!(
            "data:{};base64,{}",
            self.mime(),
            STANDARD.encode(&self.bytes)
        ))
    }

    /// Lowercased extension of the original file name, if it has one.
    pub(crate) fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
