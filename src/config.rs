//! Configuration management for the portal client
//!
//! Handles environment variables and client settings.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Same-origin prefix used when no explicit API base URL is configured
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Storage key the bearer token is persisted under
pub const TOKEN_STORAGE_KEY: &str = "authToken";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Origin the same-origin `/api` prefix is resolved against
    pub origin: String,

    /// Explicit API base URL; overrides `origin` + `/api` when set
    pub api_base_url: Option<String>,

    /// External AI tutor webhook
    pub tutor_webhook_url: Option<String>,

    /// File holding the persisted session token
    pub token_file: PathBuf,

    /// Environment (development, production)
    pub environment: String,

    /// Log level
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Periodic refresh interval in seconds
    pub poll_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8000".to_string(),
            api_base_url: None,
            tutor_webhook_url: None,
            token_file: PathBuf::from("./data/session.json"),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            request_timeout: 30,
            poll_interval: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(origin) = env::var("SCHOOL_PORTAL_ORIGIN") {
            config.origin = origin;
        }

        if let Ok(base) = env::var("SCHOOL_PORTAL_API_BASE_URL") {
            if !base.trim().is_empty() {
                config.api_base_url = Some(base);
            }
        }

        if let Ok(webhook) = env::var("SCHOOL_PORTAL_TUTOR_WEBHOOK_URL") {
            if !webhook.trim().is_empty() {
                config.tutor_webhook_url = Some(webhook);
            }
        }

        if let Ok(token_file) = env::var("SCHOOL_PORTAL_TOKEN_FILE") {
            config.token_file = PathBuf::from(token_file);
        }

        if let Ok(environment) = env::var("SCHOOL_PORTAL_ENVIRONMENT") {
            config.environment = environment;
        }

        if let Ok(log_level) = env::var("SCHOOL_PORTAL_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(log_format) = env::var("SCHOOL_PORTAL_LOG_FORMAT") {
            config.log_format = match log_format.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => return Err(ConfigError::InvalidLogFormat(log_format)),
            };
        }

        if let Ok(timeout) = env::var("SCHOOL_PORTAL_REQUEST_TIMEOUT") {
            config.request_timeout = timeout
                .parse()
                .map_err(|_| ConfigError::InvalidRequestTimeout(timeout))?;
        }

        if let Ok(interval) = env::var("SCHOOL_PORTAL_POLL_INTERVAL") {
            config.poll_interval = interval
                .parse()
                .map_err(|_| ConfigError::InvalidPollInterval(interval))?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base()?;

        if self.is_production() && matches!(base.host_str(), Some("localhost" | "127.0.0.1")) {
            return Err(ConfigError::LocalhostInProduction);
        }

        if let Some(webhook) = &self.tutor_webhook_url {
            parse_http_url(webhook)?;
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidRequestTimeout(
                self.request_timeout.to_string(),
            ));
        }

        if self.poll_interval == 0 {
            return Err(ConfigError::InvalidPollInterval(self.poll_interval.to_string()));
        }

        if self.token_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyTokenFile);
        }

        Ok(())
    }

    /// Resolved API base URL, always ending in `/`
    ///
    /// Falls back to the same-origin `/api` prefix when no explicit base is set.
    pub fn api_base(&self) -> Result<Url, ConfigError> {
        let raw = match &self.api_base_url {
            Some(base) => base.clone(),
            None => format!("{}{}", self.origin.trim_end_matches('/'), DEFAULT_API_PREFIX),
        };

        let mut url = parse_http_url(&raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Tutor webhook URL, required by the tutor client
    pub fn tutor_webhook(&self) -> Result<Url, ConfigError> {
        let raw = self
            .tutor_webhook_url
            .as_deref()
            .ok_or(ConfigError::MissingTutorWebhook)?;
        parse_http_url(raw)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn poll_interval_duration(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    /// Log configuration
    pub fn log_config(&self) {
        info!("Configuration loaded:");
        info!("  Environment: {}", self.environment);
        match self.api_base() {
            Ok(base) => info!("  API base: {}", base),
            Err(e) => warn!("  API base invalid: {}", e),
        }
        info!(
            "  Tutor webhook: {}",
            if self.tutor_webhook_url.is_some() { "configured" } else { "not configured" }
        );
        info!("  Token file: {:?}", self.token_file);
        info!("  Log level: {}", self.log_level);
        info!("  Log format: {:?}", self.log_format);
        info!("  Request timeout: {}s", self.request_timeout);
        info!("  Poll interval: {}s", self.poll_interval);
    }
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid request timeout: {0}")]
    InvalidRequestTimeout(String),

    #[error("Invalid poll interval: {0}")]
    InvalidPollInterval(String),

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),

    #[error("Localhost API origin is not allowed in production")]
    LocalhostInProduction,

    #[error("Tutor webhook URL is not configured")]
    MissingTutorWebhook,

    #[error("Empty token file path")]
    EmptyTokenFile,
}
