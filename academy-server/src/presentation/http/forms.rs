use axum::extract::Multipart;
use axum::extract::multipart::Field;
use tracing::debug;

use crate::domain::image::ImagePayload;
use crate::domain::post::{NewPost, PostPatch};
use crate::presentation::http::app_error::{AppError, AppResult};

/// Fields of a multipart post form. Absent fields stay `None`.
#[derive(Debug, Default)]
pub(crate) struct PostForm {
    pub(crate) fields: PostPatch,
    pub(crate) image: Option<ImagePayload>,
}

impl PostForm {
    pub(crate) fn into_new_post(self) -> (NewPost, Option<ImagePayload>) {
        let PostPatch {
            title,
            content,
            excerpt,
            author,
            published,
            image_url,
            tags,
        } = self.fields;

        let input = NewPost {
            title: title.unwrap_or_default(),
            content: content.unwrap_or_default(),
            excerpt: excerpt.unwrap_or_default(),
            author: author.unwrap_or_default(),
            published: published.unwrap_or(false),
            image_url: image_url.unwrap_or_default(),
            tags: tags.unwrap_or_default(),
        };
        (input, self.image)
    }
}

pub(crate) async fn read_post_form(mut multipart: Multipart) -> AppResult<PostForm> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.fields.title = Some(field.text().await?),
            "content" => form.fields.content = Some(field.text().await?),
            "excerpt" => form.fields.excerpt = Some(field.text().await?),
            "author" => form.fields.author = Some(field.text().await?),
            "imageUrl" => form.fields.image_url = Some(field.text().await?),
            "published" => form.fields.published = Some(parse_flag(&field.text().await?)?),
            "tags" => {
                let raw = field.text().await?;
                let tags = form.fields.tags.get_or_insert_with(Vec::new);
                tags.extend(single_tag(&raw));
            }
            "image" => form.image = read_image(field).await?,
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Reads a file part. Browsers submit an empty nameless part when no file was
/// chosen; that counts as no image.
pub(crate) async fn read_image(field: Field<'_>) -> AppResult<Option<ImagePayload>> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .filter(|name| !name.is_empty());
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await?;

    if bytes.is_empty() && file_name.is_none() {
        return Ok(None);
    }
    Ok(Some(ImagePayload::new(file_name, content_type, bytes.to_vec())))
}

fn parse_flag(raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" | "" => Ok(false),
        other => Err(AppError::BadRequest(format!(
            "field 'published' must be a boolean, got '{other}'"
        ))),
    }
}

/// Each `tags` part carries exactly one tag, commas included. A blank part
/// still marks the list as submitted, so it can clear tags on update.
fn single_tag(raw: &str) -> Option<String> {
    let tag = raw.trim();
    (!tag.is_empty()).then(|| tag.to_string())
}
