use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "postgres" => Ok(Self::Postgres),
            other => Err(anyhow!(
                "unknown STORE_BACKEND '{other}', expected memory, file or postgres"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown LOG_FORMAT '{other}', expected compact or json")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub store_backend: StoreBackend,
    pub store_dir: PathBuf,
    pub store_slot_key: String,
    pub store_quota_bytes: Option<usize>,
    pub database_url: Option<String>,
    pub upload_dir: PathBuf,
    pub upload_public_path: String,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub admin_username: String,
    pub admin_password: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = get_required(&lookup, "JWT_SECRET")?;
        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }
        let jwt_ttl_seconds: i64 = var("JWT_TTL_SECONDS", "3600")
            .parse()
            .context("Failed to parse JWT_TTL_SECONDS, expecting integer")?;

        let admin_username = var("ADMIN_USERNAME", "admin").trim().to_string();
        if admin_username.is_empty() {
            return Err(anyhow!("ADMIN_USERNAME must not be empty"));
        }
        // Used verbatim: surrounding spaces are part of the password.
        let admin_password = lookup("ADMIN_PASSWORD")
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("ADMIN_PASSWORD is required"))?;

        let store_backend: StoreBackend = var("STORE_BACKEND", "file").parse()?;
        let database_url = lookup("DATABASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL is required when STORE_BACKEND=postgres"));
        }
        let store_quota_bytes = lookup("STORE_QUOTA_BYTES")
            .map(|raw| parse_positive::<usize>("STORE_QUOTA_BYTES", &raw))
            .transpose()?;

        let store_slot_key = var("STORE_SLOT_KEY", "blog_posts").trim().to_string();
        if store_slot_key.is_empty() {
            return Err(anyhow!("STORE_SLOT_KEY must not be empty"));
        }

        let upload_public_path = normalize_public_path(&var("UPLOAD_PUBLIC_PATH", "/uploads"))?;

        let log_level = lookup("LOG_LEVEL")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        Ok(Self {
            http_addr: var("HTTP_ADDR", "0.0.0.0:8080"),
            cors_origins: parse_cors_origins(&var(
                "CORS_ORIGINS",
                "http://localhost:3000,http://127.0.0.1:3000",
            )),
            log_level,
            log_format: var("LOG_FORMAT", "compact").parse()?,
            store_backend,
            store_dir: PathBuf::from(var("STORE_DIR", "./data")),
            store_slot_key,
            store_quota_bytes,
            database_url,
            upload_dir: PathBuf::from(var("UPLOAD_DIR", "./public/uploads")),
            upload_public_path,
            jwt_secret,
            jwt_ttl_seconds,
            admin_username,
            admin_password,
            http_request_body_limit_bytes: parse_positive(
                "HTTP_REQUEST_BODY_LIMIT_BYTES",
                &var("HTTP_REQUEST_BODY_LIMIT_BYTES", &(8 * 1024 * 1024).to_string()),
            )?,
            http_concurrency_limit: parse_positive(
                "HTTP_CONCURRENCY_LIMIT",
                &var("HTTP_CONCURRENCY_LIMIT", "256"),
            )?,
            http_request_timeout_secs: parse_positive(
                "HTTP_REQUEST_TIMEOUT_SECS",
                &var("HTTP_REQUEST_TIMEOUT_SECS", "30"),
            )?,
        })
    }
}

fn get_required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    let value = lookup(key).with_context(|| format!("{key} is required"))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr + PartialEq + Default,
{
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|_| anyhow!("Failed to parse {key}, expecting positive integer"))?;

    if value == T::default() {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn normalize_public_path(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.len() < 2 {
        return Err(anyhow!(
            "UPLOAD_PUBLIC_PATH must be an absolute path such as /uploads"
        ));
    }
    Ok(trimmed.to_string())
}
