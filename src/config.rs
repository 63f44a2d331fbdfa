use std::{fmt::Display, path::PathBuf, str::FromStr};

use log::info;
use thiserror::Error;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10 MiB

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

pub struct Config {
    pub db_path: String,
    pub static_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub jwt_secret: Vec<u8>,
    pub max_upload_bytes: usize,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let jwt_secret = match lookup("REVIEW_JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret.into_bytes(),
            None => {
                info!("JWT secret not found, generating a random one...");
                uuid::Uuid::new_v4().as_bytes().to_vec()
            }
        };

        Ok(Self {
            db_path: try_load(&lookup, "REVIEW_DB", "database/games_review.db")?,
            static_dir: try_load(&lookup, "REVIEW_STATIC_DIR", "static")?,
            host: try_load(&lookup, "REVIEW_HOST", "127.0.0.1")?,
            port: try_load(&lookup, "REVIEW_HTTP_PORT", "5000")?,
            jwt_secret,
            max_upload_bytes: try_load(
                &lookup,
                "REVIEW_MAX_UPLOAD_BYTES",
                &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
            )?,
            bcrypt_cost: try_load(
                &lookup,
                "REVIEW_BCRYPT_COST",
                &bcrypt::DEFAULT_COST.to_string(),
            )?,
        })
    }

    /// Creates the directory holding the database file, if the path has one.
    pub fn create_db_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = std::path::Path::new(&self.db_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        reason: e.to_string(),
        value,
    })
}
