//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// A fiscal year is "YYYY-YYYY" with consecutive years, e.g. "2024-2025".
fn is_fiscal_year(s: &str) -> bool {
    let Some((start, end)) = s.split_once('-') else {
        return false;
    };
    let (Ok(start), Ok(end)) = (start.parse::<u32>(), end.parse::<u32>()) else {
        return false;
    };
    start >= 2006 && end == start + 1
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `freshness_hours` is not positive
    /// - `sync_interval_secs` is below 60
    /// - `sync_years` is empty or holds a malformed fiscal year
    /// - `user_agent` or `base_url` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.freshness_hours < 1 {
            return Err(ConfigError::Invalid {
                field: "freshness_hours".into(),
                reason: "must be at least 1".into(),
            });
        }

        if self.sync_interval_secs < 60 {
            return Err(ConfigError::Invalid {
                field: "sync_interval_secs".into(),
                reason: "must be at least 60 seconds".into(),
            });
        }

        if self.sync_years.is_empty() {
            return Err(ConfigError::Invalid { field: "sync_years".into(), reason: "must not be empty".into() });
        }
        for year in &self.sync_years {
            if !is_fiscal_year(year) {
                return Err(ConfigError::Invalid {
                    field: "sync_years".into(),
                    reason: format!("malformed fiscal year: {year}"),
                });
            }
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid { field: "base_url".into(), reason: "must not be empty".into() });
        }

        if let Some(state) = &self.target_state
            && state.trim().is_empty()
        {
            return Err(ConfigError::Invalid {
                field: "target_state".into(),
                reason: "must not be blank when set".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_bad_fiscal_year() {
        let config = AppConfig { sync_years: vec!["2024-2026".into()], ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "sync_years"));
    }

    #[test]
    fn test_validate_empty_sync_years() {
        let config = AppConfig { sync_years: Vec::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "sync_years"));
    }

    #[test]
    fn test_validate_blank_target_state() {
        let config = AppConfig { target_state: Some("  ".into()), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "target_state"));
    }

    #[test]
    fn test_is_fiscal_year() {
        assert!(is_fiscal_year("2024-2025"));
        assert!(!is_fiscal_year("2024"));
        assert!(!is_fiscal_year("2024-2024"));
        assert!(!is_fiscal_year("abcd-efgh"));
    }
}
