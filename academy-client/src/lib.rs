//! Клиентская библиотека для работы с academy-server по HTTP.
//!
//! Предоставляет `AcademyClient` для чтения новостей и объявлений сайта и для
//! их администрирования. Клиент хранит JWT-токен после `login` и автоматически
//! использует его в защищённых операциях.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{AcademyClientError, AcademyClientResult};
pub use http_client::HttpClient;
pub use models::{
    AuthResponse, ImageFile, ListPostsResponse, Post, PostFilter, PostInput, PostPatch,
    UploadedImage,
};

#[derive(Debug, Clone)]
/// Клиент контент-сервиса образовательного центра.
pub struct AcademyClient {
    http: HttpClient,
    token: Option<String>,
}

impl AcademyClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> AcademyClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Выполняет вход администратора и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> AcademyClientResult<AuthResponse> {
        let result = self.http.login(username, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Возвращает посты, подходящие под фильтр. Пустой фильтр возвращает все посты.
    pub async fn list_posts(&self, filter: &PostFilter) -> AcademyClientResult<ListPostsResponse> {
        self.http.list_posts(filter).await
    }

    /// Возвращает пост по идентификатору.
    pub async fn get_post(&self, id: &str) -> AcademyClientResult<Post> {
        self.http.get_post(id).await
    }

    /// Создаёт новый пост.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(
        &self,
        input: PostInput,
        image: Option<ImageFile>,
    ) -> AcademyClientResult<Post> {
        let token = self.require_token()?;
        self.http.create_post(token, input, image).await
    }

    /// Обновляет поля поста, переданные в `patch`.
    ///
    /// Требует установленный JWT-токен.
    pub async fn update_post(
        &self,
        id: &str,
        patch: PostPatch,
        image: Option<ImageFile>,
    ) -> AcademyClientResult<Post> {
        let token = self.require_token()?;
        self.http.update_post(token, id, patch, image).await
    }

    /// Публикует черновик или снимает пост с публикации.
    ///
    /// Требует установленный JWT-токен.
    pub async fn toggle_publish(&self, id: &str) -> AcademyClientResult<Post> {
        let token = self.require_token()?;
        self.http.toggle_publish(token, id).await
    }

    /// Удаляет пост по идентификатору.
    ///
    /// Требует установленный JWT-токен.
    pub async fn delete_post(&self, id: &str) -> AcademyClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, id).await
    }

    /// Загружает изображение и возвращает его публичный путь.
    ///
    /// Требует установленный JWT-токен.
    pub async fn upload_image(&self, image: ImageFile) -> AcademyClientResult<UploadedImage> {
        let token = self.require_token()?;
        self.http.upload_image(token, image).await
    }

    fn require_token(&self) -> AcademyClientResult<&str> {
        self.token.as_deref().ok_or(AcademyClientError::Unauthorized)
    }
}
