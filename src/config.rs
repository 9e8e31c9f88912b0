use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `None` runs the catalog in process memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Local,
    Azure,
}

impl FromStr for StorageProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "filesystem" => Ok(Self::Local),
            "azure" | "blob" => Ok(Self::Azure),
            other => Err(anyhow!("unknown STORAGE_PROVIDER '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub upload_dir: PathBuf,
    pub azure_connection_string: Option<String>,
    pub azure_container: String,
    pub access_url_ttl_secs: u64,
}

impl StorageConfig {
    pub fn access_url_ttl(&self) -> Duration {
        Duration::from_secs(self.access_url_ttl_secs)
    }
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub session_secret: String,
    pub session_ttl_secs: u64,
    pub password_iterations: u32,
}

// Keeps the secret out of startup logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_secret", &"<redacted>")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("password_iterations", &self.password_iterations)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    pub catalog_secs: u64,
    pub storage_secs: u64,
}

impl TimeoutConfig {
    pub fn catalog(&self) -> Duration {
        Duration::from_secs(self.catalog_secs)
    }

    pub fn storage(&self) -> Duration {
        Duration::from_secs(self.storage_secs)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider: StorageProvider = parse_or(&get, "STORAGE_PROVIDER", StorageProvider::Local)?;
        let azure_connection_string = get("AZURE_STORAGE_CONNECTION_STRING");
        if provider == StorageProvider::Azure && azure_connection_string.is_none() {
            return Err(anyhow!(
                "AZURE_STORAGE_CONNECTION_STRING must be set when STORAGE_PROVIDER=azure"
            ));
        }

        Ok(Self {
            server: ServerConfig {
                port: parse_or(&get, "PORT", 8080)?,
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?,
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL"),
                max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_or(&get, "DB_MIN_CONNECTIONS", 1)?,
                acquire_timeout_secs: parse_or(&get, "DB_ACQUIRE_TIMEOUT_SECS", 5)?,
            },
            storage: StorageConfig {
                provider,
                upload_dir: get("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("uploads")),
                azure_connection_string,
                azure_container: get("AZURE_STORAGE_CONTAINER")
                    .unwrap_or_else(|| "books".to_string()),
                access_url_ttl_secs: parse_or(&get, "ACCESS_URL_TTL_SECS", 3600)?,
            },
            auth: AuthConfig {
                session_secret: get("SESSION_SECRET").context("SESSION_SECRET must be set")?,
                session_ttl_secs: parse_or(&get, "SESSION_TTL_SECS", 86_400)?,
                password_iterations: parse_or(
                    &get,
                    "PASSWORD_HASH_ITERATIONS",
                    crate::crypto::DEFAULT_ITERATIONS,
                )?,
            },
            timeouts: TimeoutConfig {
                catalog_secs: parse_or(&get, "CATALOG_TIMEOUT_SECS", 5)?,
                storage_secs: parse_or(&get, "STORAGE_TIMEOUT_SECS", 30)?,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid value for {}: {}", key, e)),
        None => Ok(default),
    }
}
