/// Configuration for condovoice-service, read from environment variables
/// (optionally seeded from a `.env` file by `main`).
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub feed: FeedConfig,
    pub uploads: UploadConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub private_key_pem: String,
    pub public_key_pem: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("private_key_pem", &"[REDACTED]")
            .field("public_key_pem", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl FeedConfig {
    /// Clamp a requested page size into 1..=max_limit
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UploadConfig {
    pub avatar_max_bytes: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LogConfig {
    pub json: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Failed to parse {}='{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

/// PEM values often arrive with literal `\n` when passed through env files
fn read_pem(key: &str) -> Result<String> {
    let raw = std::env::var(key).with_context(|| format!("{} must be set", key))?;
    Ok(raw.replace("\\n", "\n"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: env_or("APP_ENV", "development"),
            host: env_or("APP_HOST", "0.0.0.0"),
            port: parse_env("PORT", 8080u16)?,
        };

        let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(value) => value,
            Err(_) if app.is_production() => {
                bail!("CORS_ALLOWED_ORIGINS must be set in production")
            }
            Err(_) => "http://localhost:3000".to_string(),
        };
        if app.is_production() && allowed_origins.trim() == "*" {
            bail!("CORS_ALLOWED_ORIGINS cannot be '*' in production");
        }

        let store = match env_or("STORE_BACKEND", "postgres").to_lowercase().as_str() {
            "postgres" | "postgresql" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => bail!("Unknown STORE_BACKEND '{}' (expected postgres or memory)", other),
        };
        let database_url = std::env::var("DATABASE_URL").ok();
        if store == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND=postgres");
        }

        let jwt = JwtConfig {
            private_key_pem: read_pem("JWT_PRIVATE_KEY_PEM")?,
            public_key_pem: read_pem("JWT_PUBLIC_KEY_PEM")?,
        };

        let feed = FeedConfig {
            default_limit: parse_env("FEED_DEFAULT_LIMIT", 20i64)?,
            max_limit: parse_env("FEED_MAX_LIMIT", 100i64)?,
        };
        if feed.max_limit < 1 || feed.default_limit < 1 || feed.default_limit > feed.max_limit {
            bail!("FEED_DEFAULT_LIMIT must be between 1 and FEED_MAX_LIMIT");
        }

        Ok(Config {
            app,
            cors: CorsConfig { allowed_origins },
            store,
            database_url,
            jwt,
            feed,
            uploads: UploadConfig {
                avatar_max_bytes: parse_env("AVATAR_MAX_BYTES", DEFAULT_AVATAR_MAX_BYTES)?,
            },
            log: LogConfig {
                json: env_or("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "APP_ENV",
        "APP_HOST",
        "PORT",
        "CORS_ALLOWED_ORIGINS",
        "STORE_BACKEND",
        "DATABASE_URL",
        "JWT_PRIVATE_KEY_PEM",
        "JWT_PUBLIC_KEY_PEM",
        "FEED_DEFAULT_LIMIT",
        "FEED_MAX_LIMIT",
        "AVATAR_MAX_BYTES",
        "LOG_FORMAT",
    ];

    fn reset_env() {
        for key in VARS {
            std::env::remove_var(key);
        }
        std::env::set_var("JWT_PRIVATE_KEY_PEM", "private\\nkey");
        std::env::set_var("JWT_PUBLIC_KEY_PEM", "public");
    }

    #[test]
    #[serial]
    fn test_memory_backend_defaults() {
        reset_env();
        std::env::set_var("STORE_BACKEND", "memory");

        let config = Config::from_env().unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.cors.allowed_origins, "http://localhost:3000");
        assert_eq!(config.feed.default_limit, 20);
        assert_eq!(config.feed.max_limit, 100);
        assert_eq!(config.uploads.avatar_max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.jwt.private_key_pem, "private\nkey");
        assert!(!config.log.json);
    }

    #[test]
    #[serial]
    fn test_postgres_requires_database_url() {
        reset_env();
        assert!(Config::from_env().is_err());

        std::env::set_var("DATABASE_URL", "postgres://localhost/condovoice");
        let config = Config::from_env().unwrap();
        assert_eq!(config.store, StoreBackend::Postgres);
    }

    #[test]
    #[serial]
    fn test_production_rejects_wildcard_cors() {
        reset_env();
        std::env::set_var("STORE_BACKEND", "memory");
        std::env::set_var("APP_ENV", "production");
        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://condovoice.app");
        assert!(Config::from_env().is_ok());
    }

    #[test]
    #[serial]
    fn test_bad_numbers_are_errors() {
        reset_env();
        std::env::set_var("STORE_BACKEND", "memory");
        std::env::set_var("PORT", "eighty");
        assert!(Config::from_env().is_err());

        std::env::set_var("PORT", "9000");
        std::env::set_var("FEED_DEFAULT_LIMIT", "500");
        assert!(Config::from_env().is_err());
    }

    #[test]
    fn test_page_size_clamps() {
        let feed = FeedConfig::default();
        assert_eq!(feed.page_size(None), 20);
        assert_eq!(feed.page_size(Some(0)), 1);
        assert_eq!(feed.page_size(Some(1000)), 100);
        assert_eq!(feed.page_size(Some(35)), 35);
    }
}
