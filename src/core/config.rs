use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub navlog: NavlogConfig,
}

/// Object storage settings for room file uploads
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name the backend stores room uploads in
    pub bucket: String,
}

/// Client-local navigation bookkeeping (created/deleted room ids)
#[derive(Debug, Clone)]
pub struct NavlogConfig {
    /// Path of the JSON file the navlog persists to across restarts
    pub path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            storage: StorageConfig::from_env()?,
            navlog: NavlogConfig::from_env()?,
        })
    }
}

impl StorageConfig {
    const DEFAULT_BUCKET: &'static str = "uploads";

    pub fn from_env() -> Result<Self, String> {
        let bucket =
            env::var("ROOMHUB_STORAGE_BUCKET").unwrap_or_else(|_| Self::DEFAULT_BUCKET.to_string());

        if bucket.is_empty() {
            return Err("ROOMHUB_STORAGE_BUCKET must not be empty".to_string());
        }

        Ok(Self { bucket })
    }
}

impl NavlogConfig {
    const DEFAULT_PATH: &'static str = ".roomhub/navlog.json";

    pub fn from_env() -> Result<Self, String> {
        let path = env::var("ROOMHUB_NAVLOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(Self::DEFAULT_PATH));

        Ok(Self { path })
    }
}
