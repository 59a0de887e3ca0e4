#[cfg(feature = "cli")]
pub mod cli;

use crate::adapters::http::DEFAULT_ENDPOINT;
use crate::core::scan::ScanSettings;
use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{self, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is a valid regex"));

fn default_mongo_uri() -> String {
    "mongodb://127.0.0.1:27017".to_string()
}

fn default_database() -> String {
    "HIBP".to_string()
}

fn default_collection() -> String {
    "Breaches".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_rate_limit_fallback_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    concat!("hibp-scan/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Settings loaded once from the JSON config file.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// API credential sent as `hibp-api-key`.
    pub key: String,
    /// Pause between lookups, in milliseconds.
    pub delay: u64,
    #[serde(default = "default_mongo_uri")]
    pub mongo_uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Backoff when a 429 message carries no digit.
    #[serde(default = "default_rate_limit_fallback_ms")]
    pub rate_limit_fallback_ms: u64,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// key 不能出現在日誌
impl std::fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanConfig")
            .field("key", &"<redacted>")
            .field("delay", &self.delay)
            .field("mongo_uri", &self.mongo_uri)
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("endpoint", &self.endpoint)
            .field("rate_limit_fallback_ms", &self.rate_limit_fallback_ms)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ScanConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        let value: serde_json::Value = serde_json::from_str(&processed)?;

        for field in ["key", "delay"] {
            if value.get(field).is_none() {
                return Err(ScanError::MissingConfigError {
                    field: field.to_string(),
                });
            }
        }

        Ok(serde_json::from_value(value)?)
    }

    /// 替換環境變數 (例如 ${HIBP_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            api_key: self.key.clone(),
            inter_request_delay: self.inter_request_delay(),
            rate_limit_fallback: Duration::from_millis(self.rate_limit_fallback_ms),
        }
    }
}

impl Validate for ScanConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("key", &self.key)?;
        if ENV_PLACEHOLDER.is_match(&self.key) {
            return Err(ScanError::InvalidConfigValueError {
                field: "key".to_string(),
                value: "<redacted>".to_string(),
                reason: "Environment variable placeholder was not resolved".to_string(),
            });
        }
        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_mongo_uri("mongoUri", &self.mongo_uri)?;
        validation::validate_non_empty_string("database", &self.database)?;
        validation::validate_non_empty_string("collection", &self.collection)?;
        validation::validate_non_empty_string("userAgent", &self.user_agent)?;
        if self.timeout_seconds == Some(0) {
            return Err(ScanError::InvalidConfigValueError {
                field: "timeoutSeconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }
}
