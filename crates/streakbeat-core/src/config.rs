//! Streakbeat configuration system.
//!
//! TOML file at `~/.streakbeat/config.toml` with serde field defaults;
//! credentials can be supplied or overridden through environment variables
//! so nothing secret has to live on disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, StreakbeatError};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreakbeatConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub app: AppConfig,
}

impl StreakbeatConfig {
    /// Load config from the default path, then layer environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load config from a specific path (no env overrides applied).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StreakbeatError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| StreakbeatError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| StreakbeatError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Environment variables override the file for secrets and deploy-time
    /// values.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(host) = std::env::var("SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Ok(port) = std::env::var("SMTP_PORT")
            && let Ok(port) = port.parse()
        {
            self.smtp.port = port;
        }
        if let Ok(user) = std::env::var("SMTP_USERNAME") {
            self.smtp.username = user;
        }
        if let Ok(pass) = std::env::var("SMTP_PASSWORD") {
            self.smtp.password = pass;
        }
        if let Ok(from) = std::env::var("SMTP_FROM_ADDRESS") {
            self.smtp.from_address = from;
        }
        if let Ok(url) = std::env::var("STREAKBEAT_PUBLIC_URL") {
            self.app.public_url = url;
        }
        if let Ok(secret) = std::env::var("STREAKBEAT_CRON_SECRET") {
            self.gateway.cron_secret = Some(secret);
        }
    }

    /// Missing database or SMTP credentials are fatal at startup for the
    /// long-lived driver.
    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(StreakbeatError::Config(
                "database.url is empty (set DATABASE_URL or edit config.toml)".into(),
            ));
        }
        if self.smtp.host.is_empty() {
            return Err(StreakbeatError::Config(
                "smtp.host is empty (set SMTP_HOST or edit config.toml)".into(),
            ));
        }
        if self.smtp.from_address.is_empty() {
            return Err(StreakbeatError::Config(
                "smtp.from_address is empty (set SMTP_FROM_ADDRESS or edit config.toml)".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the streakbeat home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".streakbeat")
    }
}

/// Postgres connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// SMTP sender settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default)]
    pub from_address: String,
}

fn default_smtp_port() -> u16 {
    587
}
fn default_from_name() -> String {
    "Streakbeat".into()
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from_name: default_from_name(),
            from_address: String::new(),
        }
    }
}

/// Tick cadence and the interval fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between pipeline passes for the long-lived driver.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Minimum minutes between interval emails when a challenge row carries
    /// no value of its own.
    #[serde(default = "default_interval_minutes")]
    pub default_interval_minutes: i64,
}

fn default_tick_secs() -> u64 {
    60
}
fn default_interval_minutes() -> i64 {
    60
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            default_interval_minutes: default_interval_minutes(),
        }
    }
}

/// HTTP trigger endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer secret for the cron trigger. When unset the gateway accepts
    /// unauthenticated calls and warns at startup.
    #[serde(default)]
    pub cron_secret: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8787
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cron_secret: None,
        }
    }
}

/// Application-facing values embedded in email bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL for email CTA links.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_public_url() -> String {
    "http://localhost:3000".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            public_url: default_public_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreakbeatConfig::default();
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.scheduler.tick_secs, 60);
        assert_eq!(config.scheduler.default_interval_minutes, 60);
        assert_eq!(config.gateway.port, 8787);
        assert!(config.gateway.cron_secret.is_none());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [database]
            url = "postgres://localhost/streakbeat"

            [smtp]
            host = "smtp.example.com"
            from_address = "noreply@example.com"

            [scheduler]
            tick_secs = 30
        "#;

        let config: StreakbeatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.url, "postgres://localhost/streakbeat");
        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.scheduler.tick_secs, 30);
        // Untouched sections keep their defaults
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.gateway.host, "127.0.0.1");
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: StreakbeatConfig = toml::from_str("").unwrap();
        assert_eq!(config.scheduler.default_interval_minutes, 60);
        assert_eq!(config.app.public_url, "http://localhost:3000");
    }

    #[test]
    fn test_validate_rejects_empty_credentials() {
        let mut config = StreakbeatConfig::default();
        assert!(config.validate().is_err());

        config.database.url = "postgres://localhost/streakbeat".into();
        assert!(config.validate().is_err());

        config.smtp.host = "smtp.example.com".into();
        config.smtp.from_address = "noreply@example.com".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_home_dir() {
        let home = StreakbeatConfig::home_dir();
        assert!(home.to_string_lossy().contains("streakbeat"));
    }
}
