//! Configuration management for cookbox
//!
//! Settings are read from environment variables with defaults, then
//! validated before use.
//!
//! # Environment Variables
//!
//! - `COOKBOX_SERVICE_URL`: base URL of the extraction service - default: "http://localhost:8080"
//! - `COOKBOX_REQUEST_TIMEOUT`: per-request timeout in seconds - default: "30"
//! - `COOKBOX_MAX_PARALLEL_STEPS`: extraction steps run at once - default: "3"
//! - `COOKBOX_REPORT_PROGRESS`: post progress transitions to the service (true|false) - default: "true"
//! - `COOKBOX_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use cookbox::CookboxConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CookboxConfig::default();
//! config.validate()?;
//!
//! let client = config.create_client()?;
//! println!("Talking to {}", client.base_url());
//! # Ok(())
//! # }
//! ```

use crate::error::ServiceError;
use crate::pipeline::PipelineConfig;
use crate::services::HttpServiceClient;
use crate::util::logging::try_parse_level;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_PARALLEL_STEPS: usize = 3;
const DEFAULT_REPORT_PROGRESS: bool = true;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
const MAX_PARALLEL_STEPS: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to create service client: {0}")]
    ClientInit(#[from] ServiceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookboxConfig {
    /// Base URL of the extraction service
    pub service_url: String,

    pub request_timeout_secs: u64,

    /// Width of the parallel extraction group
    pub max_parallel_steps: usize,

    /// Post progress transitions back to the service
    pub report_progress: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for CookboxConfig {
    /// Loads from `COOKBOX_*` environment variables, falling back to
    /// defaults for anything unset or unparseable
    fn default() -> Self {
        let service_url = env::var("COOKBOX_SERVICE_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());

        let request_timeout_secs = env::var("COOKBOX_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let max_parallel_steps = env::var("COOKBOX_MAX_PARALLEL_STEPS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_PARALLEL_STEPS);

        let report_progress = env::var("COOKBOX_REPORT_PROGRESS")
            .ok()
            .and_then(|v| v.trim().to_lowercase().parse::<bool>().ok())
            .unwrap_or(DEFAULT_REPORT_PROGRESS);

        let log_level = env::var("COOKBOX_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            service_url,
            request_timeout_secs,
            max_parallel_steps,
            report_progress,
            log_level,
        }
    }
}

impl CookboxConfig {
    /// Checks that the service URL is http(s), numeric values are in range
    /// and the log level is known
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.service_url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Service URL must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(format!(
                "Service URL must start with http:// or https://: {}",
                url
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.max_parallel_steps == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max parallel steps must be at least 1".to_string(),
            ));
        }
        if self.max_parallel_steps > MAX_PARALLEL_STEPS {
            return Err(ConfigError::ValidationFailed(format!(
                "Max parallel steps cannot exceed {}",
                MAX_PARALLEL_STEPS
            )));
        }

        if try_parse_level(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new().with_max_parallel_steps(self.max_parallel_steps)
    }

    /// HTTP client for every collaborator, bound to the configured service
    pub fn create_client(&self) -> Result<HttpServiceClient, ConfigError> {
        Ok(HttpServiceClient::with_timeout(
            self.service_url.trim(),
            self.request_timeout(),
        )?)
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("service_url".to_string(), self.service_url.clone());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert(
            "max_parallel_steps".to_string(),
            self.max_parallel_steps.to_string(),
        );
        map.insert(
            "report_progress".to_string(),
            self.report_progress.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for CookboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cookbox Configuration:")?;
        writeln!(f, "  Service URL: {}", self.service_url)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Max Parallel Steps: {}", self.max_parallel_steps)?;
        writeln!(f, "  Report Progress: {}", self.report_progress)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Temporarily sets (or clears) an environment variable
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn valid() -> CookboxConfig {
        CookboxConfig {
            service_url: "https://recipes.internal".to_string(),
            request_timeout_secs: 30,
            max_parallel_steps: 3,
            report_progress: true,
            log_level: "info".to_string(),
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::unset("COOKBOX_SERVICE_URL"),
            EnvGuard::unset("COOKBOX_REQUEST_TIMEOUT"),
            EnvGuard::unset("COOKBOX_MAX_PARALLEL_STEPS"),
            EnvGuard::unset("COOKBOX_REPORT_PROGRESS"),
            EnvGuard::unset("COOKBOX_LOG_LEVEL"),
        ];

        let config = CookboxConfig::default();

        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.max_parallel_steps, DEFAULT_MAX_PARALLEL_STEPS);
        assert!(config.report_progress);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("COOKBOX_SERVICE_URL", " https://api.example.com "),
            EnvGuard::set("COOKBOX_REQUEST_TIMEOUT", "90"),
            EnvGuard::set("COOKBOX_MAX_PARALLEL_STEPS", "1"),
            EnvGuard::set("COOKBOX_REPORT_PROGRESS", "FALSE"),
            EnvGuard::set("COOKBOX_LOG_LEVEL", "DEBUG"),
        ];

        let config = CookboxConfig::default();

        assert_eq!(config.service_url, "https://api.example.com");
        assert_eq!(config.request_timeout_secs, 90);
        assert_eq!(config.max_parallel_steps, 1);
        assert!(!config.report_progress);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_unparseable_values_fall_back() {
        let _guards = vec![
            EnvGuard::set("COOKBOX_REQUEST_TIMEOUT", "soon"),
            EnvGuard::set("COOKBOX_MAX_PARALLEL_STEPS", "-2"),
        ];

        let config = CookboxConfig::default();

        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.max_parallel_steps, DEFAULT_MAX_PARALLEL_STEPS);
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let mut config = valid();
        config.service_url = "ftp://recipes.internal".to_string();
        assert!(config.validate().is_err());

        config.service_url = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_numeric_ranges() {
        let mut config = valid();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.request_timeout_secs = 601;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.max_parallel_steps = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.max_parallel_steps = 65;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = valid();
        config.log_level = "chatty".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chatty"));
    }

    #[test]
    fn test_pipeline_config_and_client() {
        let config = valid();
        assert_eq!(config.pipeline_config().max_parallel_steps, 3);

        let client = config.create_client().unwrap();
        assert_eq!(client.base_url(), "https://recipes.internal");
        assert_eq!(client.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_display() {
        let display = format!("{}", valid());
        assert!(display.contains("Cookbox Configuration:"));
        assert!(display.contains("Service URL: https://recipes.internal"));

        let map = valid().to_display_map();
        assert_eq!(map.get("max_parallel_steps").map(String::as_str), Some("3"));
    }
}
