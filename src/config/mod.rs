use crate::utils::validation::MAX_FILE_SIZE;
use std::env;
use std::path::PathBuf;

/// Runtime configuration, loaded from the environment with sane defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string (default: sqlite://database.sqlite?mode=rwc)
    pub database_url: String,

    /// Root directory for attachment files (default: ./uploads)
    pub upload_dir: PathBuf,

    /// Maximum accepted attachment size in bytes (default: 5 MiB)
    pub max_file_size: usize,

    /// Listen address (default: 127.0.0.1:3000)
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://database.sqlite?mode=rwc".to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_file_size: MAX_FILE_SIZE,
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            bind_addr: env::var("BIND_ADDR").unwrap_or(default.bind_addr),
        }
    }
}
