//! Configuration module
//!
//! Configuration for the gallery API: server, database, authentication,
//! storage backend and the upload security policy knobs.

use std::env;

use crate::storage_types::StorageBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
}

/// Gallery configuration
#[derive(Clone, Debug)]
pub struct GalleryConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // S3-compatible providers (MinIO, R2, ...)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload security policy
    pub min_upload_size_bytes: usize,
    pub max_upload_size_bytes: usize,
    pub image_decode_timeout_secs: u64,
    pub min_image_dimension: u32,
    pub strip_exif: bool,
    /// When EXIF removal fails, keep the original file (with a warning)
    /// instead of rejecting the upload.
    pub exif_strip_fail_open: bool,
    /// Minimum share of the original characters a sanitized field must keep.
    pub sanitize_min_retained_ratio: f64,
    pub view_cooldown_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GalleryConfig>);

impl Config {
    fn as_gallery(&self) -> &GalleryConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_gallery().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = GalleryConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_gallery().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_gallery().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_gallery().base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.as_gallery().base.jwt_expiry_hours
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_gallery().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_gallery().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_gallery().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_gallery().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.as_gallery().database_url
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_gallery().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_gallery().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_gallery().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_gallery().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_gallery().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_gallery().local_storage_base_url.as_deref()
    }

    pub fn min_upload_size_bytes(&self) -> usize {
        self.as_gallery().min_upload_size_bytes
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_gallery().max_upload_size_bytes
    }

    pub fn image_decode_timeout_secs(&self) -> u64 {
        self.as_gallery().image_decode_timeout_secs
    }

    pub fn min_image_dimension(&self) -> u32 {
        self.as_gallery().min_image_dimension
    }

    pub fn strip_exif(&self) -> bool {
        self.as_gallery().strip_exif
    }

    pub fn exif_strip_fail_open(&self) -> bool {
        self.as_gallery().exif_strip_fail_open
    }

    pub fn sanitize_min_retained_ratio(&self) -> f64 {
        self.as_gallery().sanitize_min_retained_ratio
    }

    pub fn view_cooldown_secs(&self) -> u64 {
        self.as_gallery().view_cooldown_secs
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().to_lowercase().parse().ok())
        .unwrap_or(default)
}

impl GalleryConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MIN_UPLOAD_SIZE_BYTES: usize = 100;
        const MAX_UPLOAD_SIZE_MB: usize = 50;
        const IMAGE_DECODE_TIMEOUT_SECS: u64 = 10;
        const MIN_IMAGE_DIMENSION: u32 = 10;
        const SANITIZE_MIN_RETAINED_RATIO: f64 = 0.5;
        const VIEW_COOLDOWN_SECS: u64 = 30 * 60;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            environment,
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?;

        let config = GalleryConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            min_upload_size_bytes: env::var("MIN_UPLOAD_SIZE_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MIN_UPLOAD_SIZE_BYTES),
            max_upload_size_bytes: env::var("MAX_UPLOAD_SIZE_MB")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(MAX_UPLOAD_SIZE_MB)
                * 1024
                * 1024,
            image_decode_timeout_secs: env::var("IMAGE_DECODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(IMAGE_DECODE_TIMEOUT_SECS),
            min_image_dimension: env::var("MIN_IMAGE_DIMENSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MIN_IMAGE_DIMENSION),
            strip_exif: env_bool("STRIP_EXIF", true),
            exif_strip_fail_open: env_bool("EXIF_STRIP_FAIL_OPEN", true),
            sanitize_min_retained_ratio: env::var("SANITIZE_MIN_RETAINED_RATIO")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(SANITIZE_MIN_RETAINED_RATIO),
            view_cooldown_secs: env::var("VIEW_COOLDOWN_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(VIEW_COOLDOWN_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if is_production_env(&self.base.environment)
            && self.base.cors_origins.iter().any(|o| o == "*")
        {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !(0.0..=1.0).contains(&self.sanitize_min_retained_ratio) {
            return Err(anyhow::anyhow!(
                "SANITIZE_MIN_RETAINED_RATIO must be between 0.0 and 1.0"
            ));
        }

        if self.min_upload_size_bytes >= self.max_upload_size_bytes {
            return Err(anyhow::anyhow!(
                "MIN_UPLOAD_SIZE_BYTES must be smaller than MAX_UPLOAD_SIZE_MB"
            ));
        }

        match self.storage_backend.unwrap_or(StorageBackend::Local) {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
