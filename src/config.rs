use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

use crate::db::DatabaseLocation;

const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";
const DEV_ADMIN_PASSWORD: &str = "admin";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub secret_key: String,
    pub database: DatabaseLocation,
    pub upload_dir: PathBuf,
    pub admin_username: String,
    pub admin_password: String,
    pub notify_recipient: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `load` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            port: try_load(&lookup, "PORT", "5000")?,
            secret_key: try_load(&lookup, "SECRET_KEY", DEV_SECRET_KEY)?,
            database: try_load(&lookup, "DATABASE_URL", "sqlite://ecommerce.db")?,
            upload_dir: try_load(&lookup, "UPLOAD_FOLDER", "static/uploads")?,
            admin_username: try_load(&lookup, "ADMIN_USERNAME", "admin")?,
            admin_password: try_load(&lookup, "ADMIN_PASSWORD", DEV_ADMIN_PASSWORD)?,
            notify_recipient: try_load(&lookup, "NOTIFY_RECIPIENT", "+910000000000")?,
        };

        if config.secret_key == DEV_SECRET_KEY {
            warn!("SECRET_KEY is the development default; admin sessions can be forged");
        }
        if config.admin_password == DEV_ADMIN_PASSWORD {
            warn!("ADMIN_PASSWORD is the development default");
        }
        Ok(config)
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid { key, reason: e.to_string() }
        })
}
