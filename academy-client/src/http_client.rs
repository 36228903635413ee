use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{AcademyClientError, AcademyClientResult};
use crate::models::{
    AuthResponse, ImageFile, ListPostsResponse, Post, PostFilter, PostInput, PostPatch,
    UploadedImage,
};

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponseDto {
    success: bool,
    url: Option<String>,
    file_name: Option<String>,
    error: Option<String>,
}

impl TryFrom<UploadResponseDto> for UploadedImage {
    type Error = AcademyClientError;

    fn try_from(value: UploadResponseDto) -> Result<Self, Self::Error> {
        match (value.success, value.url, value.file_name) {
            (true, Some(url), Some(file_name)) => Ok(Self { url, file_name }),
            _ => Err(AcademyClientError::InvalidRequest(
                value
                    .error
                    .unwrap_or_else(|| "upload response is incomplete".to_string()),
            )),
        }
    }
}

fn image_part(image: ImageFile) -> AcademyClientResult<Part> {
    Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&image.content_type)
        .map_err(|_| {
            AcademyClientError::InvalidRequest(format!(
                "invalid content type '{}'",
                image.content_type
            ))
        })
}

fn input_form(input: PostInput, image: Option<ImageFile>) -> AcademyClientResult<Form> {
    let patch = PostPatch {
        title: Some(input.title),
        content: Some(input.content),
        excerpt: Some(input.excerpt),
        author: Some(input.author),
        published: Some(input.published),
        image_url: input.image_url,
        tags: Some(input.tags),
    };
    patch_form(patch, image)
}

fn patch_form(patch: PostPatch, image: Option<ImageFile>) -> AcademyClientResult<Form> {
    let mut form = Form::new();
    let text_fields = [
        ("title", patch.title),
        ("content", patch.content),
        ("excerpt", patch.excerpt),
        ("author", patch.author),
        ("imageUrl", patch.image_url),
        ("published", patch.published.map(|flag| flag.to_string())),
    ];
    for (name, value) in text_fields {
        if let Some(value) = value {
            form = form.text(name, value);
        }
    }
    if let Some(tags) = patch.tags {
        for tag in tag_parts(tags) {
            form = form.text("tags", tag);
        }
    }
    if let Some(image) = image {
        form = form.part("image", image_part(image)?);
    }
    Ok(form)
}

/// Значения частей `tags`: по одному тегу на часть, запятые внутри тега
/// сохраняются. Пустой список отправляется одной пустой частью, чтобы
/// сервер очистил теги.
fn tag_parts(tags: Vec<String>) -> Vec<String> {
    if tags.is_empty() {
        return vec![String::new()];
    }
    tags
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `academy-server`.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub fn new(base_url: impl Into<String>) -> AcademyClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: reqwest::Response) -> AcademyClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .error
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        AcademyClientError::from_http_status(status, Some(message))
    }

    /// отправляет запрос и разбирает json-ответ либо ошибку сервера
    async fn send<TRes>(&self, request: RequestBuilder) -> AcademyClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(AcademyClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        response
            .json::<TRes>()
            .await
            .map_err(AcademyClientError::from_reqwest)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Выполняет вход администратора и возвращает JWT.
    pub async fn login(&self, username: &str, password: &str) -> AcademyClientResult<AuthResponse> {
        let payload = LoginRequestDto { username, password };
        let request = self
            .request(Method::POST, "/api/auth/login", None)
            .json(&payload);
        self.send(request).await
    }

    /// Возвращает посты, подходящие под фильтр, от новых к старым.
    pub async fn list_posts(&self, filter: &PostFilter) -> AcademyClientResult<ListPostsResponse> {
        let request = self.request(Method::GET, "/api/posts", None).query(filter);
        self.send(request).await
    }

    /// Получает пост по идентификатору.
    pub async fn get_post(&self, id: &str) -> AcademyClientResult<Post> {
        let request = self.request(Method::GET, &format!("/api/posts/{id}"), None);
        self.send(request).await
    }

    /// Создаёт пост. Изображение, если передано, встраивается в `imageUrl`.
    ///
    /// Требует валидный JWT-токен.
    pub async fn create_post(
        &self,
        token: &str,
        input: PostInput,
        image: Option<ImageFile>,
    ) -> AcademyClientResult<Post> {
        let form = input_form(input, image)?;
        let request = self
            .request(Method::POST, "/api/posts", Some(token))
            .multipart(form);
        self.send(request).await
    }

    /// Частично обновляет пост.
    ///
    /// Требует валидный JWT-токен.
    pub async fn update_post(
        &self,
        token: &str,
        id: &str,
        patch: PostPatch,
        image: Option<ImageFile>,
    ) -> AcademyClientResult<Post> {
        let form = patch_form(patch, image)?;
        let request = self
            .request(Method::PUT, &format!("/api/posts/{id}"), Some(token))
            .multipart(form);
        self.send(request).await
    }

    /// Переключает статус публикации поста.
    ///
    /// Требует валидный JWT-токен.
    pub async fn toggle_publish(&self, token: &str, id: &str) -> AcademyClientResult<Post> {
        let request = self.request(
            Method::PATCH,
            &format!("/api/posts/{id}/publish"),
            Some(token),
        );
        self.send(request).await
    }

    /// Удаляет пост. Удаление несуществующего поста не считается ошибкой.
    ///
    /// Требует валидный JWT-токен.
    pub async fn delete_post(&self, token: &str, id: &str) -> AcademyClientResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/api/posts/{id}"), Some(token))
            .send()
            .await
            .map_err(AcademyClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        Ok(())
    }

    /// Загружает изображение в публичный каталог сервера.
    ///
    /// Требует валидный JWT-токен.
    pub async fn upload_image(
        &self,
        token: &str,
        image: ImageFile,
    ) -> AcademyClientResult<UploadedImage> {
        let form = Form::new().part("file", image_part(image)?);
        let request = self
            .request(Method::POST, "/api/upload", Some(token))
            .multipart(form);
        let dto: UploadResponseDto = self.send(request).await?;
        UploadedImage::try_from(dto)
    }
}
