use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичная модель поста (новость или объявление).
pub struct Post {
    /// Идентификатор поста (UUID).
    pub id: String,
    /// Заголовок.
    pub title: String,
    /// Полный текст.
    pub content: String,
    /// Краткое описание для списка.
    pub excerpt: String,
    /// Автор.
    pub author: String,
    /// Опубликован ли пост на сайте.
    pub published: bool,
    /// Ссылка на изображение или `data:` URL; пустая строка, если изображения нет.
    #[serde(default)]
    pub image_url: String,
    /// Теги в порядке ввода.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего изменения (UTC).
    pub updated_at: DateTime<Utc>,
}

/// Файл изображения для отправки на сервер.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Имя файла, например `campus.png`.
    pub file_name: String,
    /// MIME-тип, например `image/png`.
    pub content_type: String,
    /// Содержимое файла.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Данные для создания поста.
pub struct PostInput {
    /// Заголовок.
    pub title: String,
    /// Полный текст.
    pub content: String,
    /// Краткое описание.
    pub excerpt: String,
    /// Автор.
    pub author: String,
    /// Опубликовать сразу.
    pub published: bool,
    /// Готовая ссылка на изображение.
    pub image_url: Option<String>,
    /// Теги.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Частичное обновление поста: `None` оставляет поле без изменений.
pub struct PostPatch {
    /// Новый заголовок.
    pub title: Option<String>,
    /// Новый текст.
    pub content: Option<String>,
    /// Новое краткое описание.
    pub excerpt: Option<String>,
    /// Новый автор.
    pub author: Option<String>,
    /// Новый статус публикации.
    pub published: Option<bool>,
    /// Новая ссылка на изображение.
    pub image_url: Option<String>,
    /// Новый список тегов (заменяет старый целиком).
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Фильтр списка постов. Пустой фильтр возвращает все посты.
pub struct PostFilter {
    /// Только опубликованные.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    /// Подстрока тега без учёта регистра.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Поисковая строка по заголовку, описанию, тексту и тегам.
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ списка постов.
pub struct ListPostsResponse {
    /// Посты, от новых к старым.
    pub posts: Vec<Post>,
    /// Количество постов в ответе.
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешного входа администратора.
pub struct AuthResponse {
    /// JWT access token.
    pub access_token: String,
    /// Имя администратора.
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Результат загрузки изображения.
pub struct UploadedImage {
    /// Публичный путь к файлу, например `/uploads/<uuid>.png`.
    pub url: String,
    /// Имя сохранённого файла.
    pub file_name: String,
}
