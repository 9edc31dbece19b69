use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    pub secure: bool,
}

/// Remote object storage that uploaded images are relayed to.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub base_url: String,
    pub bucket: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")
                .or_else(|_| std::env::var("SECRET"))
                .context("JWT_SECRET is not set")?,
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };
        let cookie = CookieConfig {
            secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };
        let storage = StorageConfig {
            base_url: std::env::var("SUPABASE_URL")
                .context("SUPABASE_URL is not set")?
                .trim_end_matches('/')
                .to_string(),
            bucket: std::env::var("SUPABASE_BUCKET").context("SUPABASE_BUCKET is not set")?,
            api_key: std::env::var("SUPABASE_API_KEY").context("SUPABASE_API_KEY is not set")?,
        };
        Ok(Self {
            database_url,
            max_connections,
            jwt,
            cookie,
            storage,
        })
    }
}
