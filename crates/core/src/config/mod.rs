//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MGNREGA_*)
//! 2. TOML config file (if MGNREGA_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::normalize::DerivationPolicy;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MGNREGA_*)
/// 2. TOML config file (if MGNREGA_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// data.gov.in API key for upstream calls.
    ///
    /// Set via MGNREGA_API_KEY environment variable.
    /// Required only when an upstream call is actually attempted.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the upstream MGNREGA resource.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path to the SQLite metrics store.
    ///
    /// Set via MGNREGA_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Redis connection URL for the key-value cache.
    ///
    /// When unset, an in-process cache is used instead.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// The reverse-geocode provider requires a descriptive identifier.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Restrict the mirror to one state (e.g. "UTTAR PRADESH").
    ///
    /// Unset means all states: sync ingests every region and lookups
    /// take the state from the request.
    #[serde(default)]
    pub target_state: Option<String>,

    /// Which derived-metric convention the normalizer applies.
    #[serde(default)]
    pub derivation_policy: DerivationPolicy,

    /// Hours before a stored record counts as stale.
    #[serde(default = "default_freshness_hours")]
    pub freshness_hours: i64,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Seconds between scheduled sync runs.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Fiscal years the sync loop ingests, most recent first.
    #[serde(default = "default_sync_years")]
    pub sync_years: Vec<String>,
}

fn default_base_url() -> String {
    "https://api.data.gov.in/resource/ee03643a-ee4c-48c2-ac30-9f2ff26ab722".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./mgnrega-mirror.sqlite")
}

fn default_user_agent() -> String {
    "mgnrega-mirror/0.1".into()
}

fn default_freshness_hours() -> i64 {
    24
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_sync_interval_secs() -> u64 {
    3_600
}

fn default_sync_years() -> Vec<String> {
    vec![
        "2024-2025".to_string(),
        "2023-2024".to_string(),
        "2022-2023".to_string(),
        "2021-2022".to_string(),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            db_path: default_db_path(),
            redis_url: None,
            user_agent: default_user_agent(),
            target_state: None,
            derivation_policy: DerivationPolicy::Direct,
            freshness_hours: default_freshness_hours(),
            timeout_ms: default_timeout_ms(),
            sync_interval_secs: default_sync_interval_secs(),
            sync_years: default_sync_years(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Sync interval as Duration.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MGNREGA_`
    /// 2. TOML file from `MGNREGA_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MGNREGA_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MGNREGA_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the upstream API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the API key is not set.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "api_key".into(),
            hint: "Set MGNREGA_API_KEY environment variable".into(),
        })
    }
}
