use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostFilter};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::forms::read_post_form;
use crate::presentation::http::middleware::auth::AuthenticatedAdmin;

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ListPostsQuery {
    /// Only published posts.
    pub(crate) published: Option<bool>,
    /// Case-insensitive substring of any tag.
    #[validate(length(max = 100))]
    pub(crate) tag: Option<String>,
    /// Case-insensitive substring of title, excerpt, content or any tag.
    #[validate(length(max = 200))]
    pub(crate) q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) author: String,
    pub(crate) published: bool,
    pub(crate) image_url: String,
    pub(crate) tags: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) total: usize,
}

/// Multipart form accepted by create and update. Every field is optional.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub(crate) struct PostFormSchema {
    title: Option<String>,
    content: Option<String>,
    excerpt: Option<String>,
    author: Option<String>,
    published: Option<bool>,
    image_url: Option<String>,
    /// Repeatable, each value may hold a comma separated list.
    tags: Option<Vec<String>>,
    /// Image file, at most 5 MiB, inlined into `imageUrl`.
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<Vec<u8>>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            excerpt: post.excerpt,
            author: post.author,
            published: post.published,
            image_url: post.image_url,
            tags: post.tags,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<Vec<Post>> for ListPostsResponseDto {
    fn from(posts: Vec<Post>) -> Self {
        Self {
            total: posts.len(),
            posts: posts.into_iter().map(PostDto::from).collect(),
        }
    }
}

fn post_not_found(id: &str) -> DomainError {
    DomainError::NotFound(format!("post '{id}'"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Posts listed, newest first", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Stored data is corrupt"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let published_only = query.published.unwrap_or(false);
    let tag = non_blank(query.tag);
    let search = non_blank(query.q);

    let content = &state.content_service;
    let posts = match (published_only, tag, search) {
        (false, None, None) => content.list_posts().await?,
        (true, None, None) => content.list_published().await?,
        (false, Some(tag), None) => content.posts_by_tag(&tag).await?,
        (false, None, Some(search)) => content.search_posts(&search).await?,
        (published_only, tag, query) => {
            let filter = PostFilter {
                published_only,
                tag,
                query,
            };
            content.find_posts(&filter).await?
        }
    };

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(posts))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let post = state
        .content_service
        .get_post(&id)
        .await?
        .ok_or_else(|| post_not_found(&id))?;

    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body(content = PostFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Invalid form or image"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let (input, image) = read_post_form(multipart).await?.into_new_post();

    let post = state.content_service.create_post(input, image).await?;
    info!(admin = %admin.username, post_id = %post.id, "admin created post");
    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Post id")
    ),
    request_body(content = PostFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Invalid form or image"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let form = read_post_form(multipart).await?;

    let post = state
        .content_service
        .update_post(&id, form.fields, form.image)
        .await?
        .ok_or_else(|| post_not_found(&id))?;
    info!(admin = %admin.username, post_id = %id, "admin updated post");
    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    patch,
    path = "/api/posts/{id}/publish",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Publish flag flipped", body = PostDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub(crate) async fn toggle_publish(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let post = state
        .content_service
        .toggle_published(&id)
        .await?
        .ok_or_else(|| post_not_found(&id))?;
    info!(admin = %admin.username, post_id = %id, published = post.published, "admin toggled publish state");
    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = String, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted or already absent"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let deleted = state.content_service.delete_post(&id).await?;
    info!(admin = %admin.username, post_id = %id, deleted, "admin deleted post");
    Ok(StatusCode::NO_CONTENT)
}
