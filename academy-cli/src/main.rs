use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use academy_client::{
    AcademyClient, AcademyClientError, AuthResponse, ImageFile, ListPostsResponse, Post,
    PostFilter, PostInput, PostPatch, UploadedImage,
};
use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};

const TOKEN_FILE: &str = ".academy_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";
const SERVER_ENV: &str = "ACADEMY_SERVER";

#[derive(Debug, Parser)]
#[command(name = "academy-cli", version, about = "CLI клиент для academy-server")]
struct Cli {
    /// Адрес сервера. По умолчанию берётся из ACADEMY_SERVER или http://127.0.0.1:8080.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Печатать ответы в формате JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct PostFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    excerpt: Option<String>,
    #[arg(long)]
    author: Option<String>,
    /// Готовая ссылка на изображение.
    #[arg(long)]
    image_url: Option<String>,
    /// Теги через запятую.
    #[arg(long)]
    tags: Option<String>,
    /// Путь к файлу изображения, которое встраивается в пост.
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Вход администратора.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Список постов с фильтрами.
    List {
        /// Только опубликованные.
        #[arg(long)]
        published: bool,
        /// Фильтр по тегу (подстрока, без учёта регистра).
        #[arg(long)]
        tag: Option<String>,
        /// Поиск по заголовку, описанию, тексту и тегам.
        #[arg(long)]
        query: Option<String>,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: String,
    },
    /// Создание поста (требует токен).
    Create {
        #[command(flatten)]
        fields: PostFields,
        /// Опубликовать сразу.
        #[arg(long)]
        published: bool,
    },
    /// Обновление поста (требует токен). Неуказанные поля не меняются.
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: PostFields,
        /// Новый статус публикации.
        #[arg(long)]
        published: Option<bool>,
    },
    /// Переключение статуса публикации (требует токен).
    Publish {
        #[arg(long)]
        id: String,
    },
    /// Удаление поста (требует токен).
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Загрузка изображения в публичный каталог сервера (требует токен).
    Upload {
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server.or_else(|| env::var(SERVER_ENV).ok()));
    let mut client = AcademyClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .academy_token")? {
        client.set_token(token);
    }

    let output = Output { json: cli.json };
    match cli.command {
        Command::Login { username, password } => {
            let auth = client
                .login(&username, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            output.auth(&auth)?;
        }
        Command::List {
            published,
            tag,
            query,
        } => {
            let filter = PostFilter {
                published: published.then_some(true),
                tag,
                query,
            };
            let list = client.list_posts(&filter).await.map_err(map_client_error)?;
            output.list(&list)?;
        }
        Command::Get { id } => {
            let post = client.get_post(&id).await.map_err(map_client_error)?;
            output.post("Пост", &post)?;
        }
        Command::Create { fields, published } => {
            let image = fields.image.as_deref().map(read_image).transpose()?;
            let input = PostInput {
                title: fields.title.unwrap_or_default(),
                content: fields.content.unwrap_or_default(),
                excerpt: fields.excerpt.unwrap_or_default(),
                author: fields.author.unwrap_or_default(),
                published,
                image_url: fields.image_url,
                tags: fields.tags.as_deref().map(split_tags).unwrap_or_default(),
            };
            let post = client
                .create_post(input, image)
                .await
                .map_err(map_client_error)?;
            output.post("Пост создан", &post)?;
        }
        Command::Update {
            id,
            fields,
            published,
        } => {
            let image = fields.image.as_deref().map(read_image).transpose()?;
            let patch = PostPatch {
                title: fields.title,
                content: fields.content,
                excerpt: fields.excerpt,
                author: fields.author,
                published,
                image_url: fields.image_url,
                tags: fields.tags.as_deref().map(split_tags),
            };
            let post = client
                .update_post(&id, patch, image)
                .await
                .map_err(map_client_error)?;
            output.post("Пост обновлён", &post)?;
        }
        Command::Publish { id } => {
            let post = client.toggle_publish(&id).await.map_err(map_client_error)?;
            let title = if post.published {
                "Пост опубликован"
            } else {
                "Пост снят с публикации"
            };
            output.post(title, &post)?;
        }
        Command::Delete { id } => {
            client.delete_post(&id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::Upload { file } => {
            let image = read_image(&file)?;
            let uploaded = client.upload_image(image).await.map_err(map_client_error)?;
            output.upload(&uploaded)?;
        }
    }

    Ok(())
}

fn resolve_server(server: Option<String>) -> String {
    normalize_server(server.unwrap_or_else(|| DEFAULT_SERVER.to_string()))
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// MIME-тип по расширению файла; сервер сам отклонит неподдерживаемый тип.
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

fn read_image(path: &Path) -> Result<ImageFile> {
    let bytes =
        fs::read(path).with_context(|| format!("не удалось прочитать {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("некорректное имя файла: {}", path.display()))?
        .to_string();

    Ok(ImageFile {
        file_name,
        content_type: content_type_for(path).to_string(),
        bytes,
    })
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &AcademyClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn map_client_error(err: AcademyClientError) -> anyhow::Error {
    let message = match err {
        AcademyClientError::Unauthorized => {
            "требуется авторизация: выполните `academy-cli login ...`".to_string()
        }
        AcademyClientError::NotFound => "пост не найден".to_string(),
        AcademyClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        AcademyClientError::StorageUnavailable(message) => {
            format!("хранилище недоступно: {message}")
        }
        AcademyClientError::Server { status, message } => {
            format!("ошибка сервера ({status}): {message}")
        }
        AcademyClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow!(message)
}

struct Output {
    json: bool,
}

impl Output {
    fn auth(&self, auth: &AuthResponse) -> Result<()> {
        if self.json {
            return print_json(auth);
        }
        println!("Вход выполнен");
        println!("username: {}", auth.username);
        println!("token: {}", auth.access_token);
        Ok(())
    }

    fn post(&self, title: &str, post: &Post) -> Result<()> {
        if self.json {
            return print_json(post);
        }
        println!("{title}");
        println!("id: {}", post.id);
        println!("title: {}", post.title);
        println!("author: {}", post.author);
        println!("published: {}", post.published);
        println!("tags: {}", post.tags.join(", "));
        println!("excerpt: {}", post.excerpt);
        println!("content: {}", post.content);
        println!("image: {}", describe_image(&post.image_url));
        println!("created_at: {}", post.created_at);
        println!("updated_at: {}", post.updated_at);
        Ok(())
    }

    fn list(&self, list: &ListPostsResponse) -> Result<()> {
        if self.json {
            return print_json(list);
        }
        println!("Постов: {}", list.total);
        for post in &list.posts {
            let status = if post.published { "опубликован" } else { "черновик" };
            println!("- [{}] {} ({status}, {})", post.id, post.title, post.created_at);
        }
        Ok(())
    }

    fn upload(&self, uploaded: &UploadedImage) -> Result<()> {
        if self.json {
            return print_json(uploaded);
        }
        println!("Файл загружен");
        println!("url: {}", uploaded.url);
        println!("file_name: {}", uploaded.file_name);
        Ok(())
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// data: URL бывают очень длинными, поэтому печатается только их тип и размер.
fn describe_image(image_url: &str) -> String {
    if image_url.is_empty() {
        return "-".to_string();
    }
    match image_url.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split(';').next().unwrap_or_default();
            format!("встроенное {mime}, {} символов", image_url.len())
        }
        None => image_url.to_string(),
    }
}
