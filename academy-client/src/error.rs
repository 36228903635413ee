use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `academy-client`.
pub enum AcademyClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен или неверные учётные данные).
    #[error("unauthorized")]
    Unauthorized,

    /// Запрошенный пост не найден.
    #[error("not found")]
    NotFound,

    /// Некорректный запрос: ошибка валидации полей или изображения.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Хранилище сервера недоступно или переполнено.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Прочие ошибки сервера.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение сервера.
        message: String,
    },
}

/// Результат операций `academy-client`.
pub type AcademyClientResult<T> = Result<T, AcademyClientError>;

impl AcademyClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            reqwest::StatusCode::SERVICE_UNAVAILABLE => Self::StorageUnavailable(message),
            status if status.is_client_error() => Self::InvalidRequest(message),
            status => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}
