//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use url::Url;

use crate::error::ClientError;

/// Backend configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP listening port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Database Configuration ===
    /// Database user.
    #[serde(default = "default_db_user")]
    pub db_user: String,

    /// Database password.
    #[serde(default = "default_db_password")]
    pub db_password: String,

    /// Database host.
    #[serde(default = "default_db_host")]
    pub db_host: String,

    /// Database port.
    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// Database name.
    #[serde(default = "default_db_name")]
    pub db_name: String,

    /// Seconds to wait between connection attempts.
    #[serde(default = "default_db_retry_secs")]
    pub db_retry_secs: u64,
}

fn default_port() -> u16 {
    5000
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_password() -> String {
    "postgres".to_string()
}

fn default_db_host() -> String {
    "postgres-service".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "appdb_devops".to_string()
}

fn default_db_retry_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            db_user: default_db_user(),
            db_password: default_db_password(),
            db_host: default_db_host(),
            db_port: default_db_port(),
            db_name: default_db_name(),
            db_retry_secs: default_db_retry_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.db_host.is_empty() {
            return Err("DB_HOST must not be empty".to_string());
        }

        if self.db_user.is_empty() {
            return Err("DB_USER must not be empty".to_string());
        }

        if self.db_name.is_empty() {
            return Err("DB_NAME must not be empty".to_string());
        }

        if self.db_retry_secs == 0 {
            return Err("DB_RETRY_SECS must be at least 1".to_string());
        }

        Ok(())
    }

    /// Connection options for the database.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
    }

    /// Delay between connection attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.db_retry_secs)
    }
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Parse the backend base URL.
    pub fn base_url(&self) -> Result<Url, ClientError> {
        Ok(Url::parse(&self.api_url)?)
    }
}
