use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::auth::{AuthResponseDto, LoginDto};
use crate::presentation::http::handlers::health::HealthzResponse;
use crate::presentation::http::handlers::posts::{
    ListPostsQuery, ListPostsResponseDto, PostDto, PostFormSchema,
};
use crate::presentation::http::handlers::uploads::{
    UploadErrorDto, UploadFormSchema, UploadResponseDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::toggle_publish,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::uploads::upload_image
    ),
    components(
        schemas(
            HealthzResponse,
            LoginDto,
            AuthResponseDto,
            ListPostsQuery,
            PostDto,
            ListPostsResponseDto,
            PostFormSchema,
            UploadFormSchema,
            UploadResponseDto,
            UploadErrorDto
        )
    ),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "auth", description = "Administrator login"),
        (name = "posts", description = "News and announcements"),
        (name = "uploads", description = "Image uploads")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
