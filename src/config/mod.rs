use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

/// Response store configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database: DatabaseConfig,
    pub file_path: PathBuf,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Which response store to run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Sqlite,
    File,
    Memory,
}

/// Question catalog source
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// JSON catalog file; the built-in catalog is used when unset.
    pub path: Option<PathBuf>,
}

/// Respondent session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let bind_raw = env::var("SURVEY_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());
        let server = ServerConfig {
            bind_addr: bind_raw.parse().map_err(|_| AppError::Config {
                message: format!("SURVEY_BIND_ADDR is not a socket address: {}", bind_raw),
            })?,
        };

        let storage = StorageConfig {
            backend: match env::var("STORAGE_BACKEND") {
                Ok(raw) => raw.parse()?,
                Err(_) => StorageBackend::default(),
            },
            database: DatabaseConfig {
                path: PathBuf::from(
                    env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/responses.db".to_string()),
                ),
                max_connections: positive_or("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            file_path: PathBuf::from(
                env::var("RESPONSES_FILE_PATH")
                    .unwrap_or_else(|_| "./data/survey_responses.json".to_string()),
            ),
        };

        let catalog = CatalogConfig {
            path: env::var("SURVEY_CATALOG_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        };

        let session = SessionConfig {
            cookie_name: env::var("SESSION_COOKIE_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "survey_sid".to_string()),
            ttl_secs: positive_or("SESSION_TTL_SECS", 3600)?,
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(Config {
            server,
            storage,
            catalog,
            session,
            logging,
        })
    }
}

/// Read a numeric variable, falling back on absence or garbage. Zero is an error.
fn positive_or<T>(var: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + PartialEq + Default,
{
    match env::var(var).ok().and_then(|s| s.trim().parse::<T>().ok()) {
        Some(value) if value == T::default() => Err(AppError::Config {
            message: format!("{} must be greater than zero", var),
        }),
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(StorageBackend::Sqlite),
            "file" | "json" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(AppError::Config {
                message: format!(
                    "Unknown storage backend '{}' (expected sqlite, file or memory)",
                    other
                ),
            }),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "survey_sid".to_string(),
            ttl_secs: 3600,
        }
    }
}
