// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DUMP_PATH, DEFAULT_FLUSH_THRESHOLD, DEFAULT_INGESTION_TTL, DEFAULT_INGEST_URL,
    DEFAULT_JOBS, DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::errors::ConfigError;

/// Configuration for a shim run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Retention applied to every forwarded point, in seconds
    pub ingestion_ttl: u32,
    /// Newline-delimited JSON file to relay
    pub dump_path: PathBuf,
    /// Blueflood multi-metric ingestion endpoint
    pub url: String,
    /// Number of concurrent workers, each with its own connection
    pub jobs: usize,
    /// Buffer size above which a worker ships a batch
    pub flush_threshold: usize,
    /// Ship whatever is left in a worker's buffer when it terminates
    pub flush_on_shutdown: bool,
    /// POST an empty array when flushing an empty buffer
    pub send_empty_batches: bool,
    pub request_timeout: Duration,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingestion_ttl: DEFAULT_INGESTION_TTL,
            dump_path: PathBuf::from(DEFAULT_DUMP_PATH),
            url: DEFAULT_INGEST_URL.to_string(),
            jobs: DEFAULT_JOBS,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            flush_on_shutdown: true,
            send_empty_batches: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let ingestion_ttl = env::var("BF_INGESTION_TTL")
            .ok()
            .and_then(|ttl| ttl.parse::<u32>().ok())
            .unwrap_or(DEFAULT_INGESTION_TTL);
        let dump_path = env::var("BF_DUMP_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DUMP_PATH));
        let url = env::var("BF_URL").unwrap_or_else(|_| DEFAULT_INGEST_URL.to_string());
        let jobs = env::var("BF_JOBS")
            .ok()
            .and_then(|jobs| jobs.parse::<usize>().ok())
            .unwrap_or(DEFAULT_JOBS);
        let flush_threshold = env::var("BF_FLUSH_THRESHOLD")
            .ok()
            .and_then(|threshold| threshold.parse::<usize>().ok())
            .unwrap_or(DEFAULT_FLUSH_THRESHOLD);
        let flush_on_shutdown = env::var("BF_FLUSH_ON_SHUTDOWN")
            .map(|val| val.to_lowercase() != "false")
            .unwrap_or(true);
        let send_empty_batches = env::var("BF_SEND_EMPTY_BATCHES")
            .map(|val| val.to_lowercase() == "true")
            .unwrap_or(false);
        let request_timeout = env::var("BF_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        let log_level = env::var("BF_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        let config = Self {
            ingestion_ttl,
            dump_path,
            url,
            jobs,
            flush_threshold,
            flush_on_shutdown,
            send_empty_batches,
            request_timeout,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::Invalid(
                "BF_JOBS must be greater than 0".to_string(),
            ));
        }

        if self.flush_threshold == 0 {
            return Err(ConfigError::Invalid(
                "BF_FLUSH_THRESHOLD must be greater than 0".to_string(),
            ));
        }

        if self.dump_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "BF_DUMP_PATH cannot be empty".to_string(),
            ));
        }

        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid("BF_URL cannot be empty".to_string()));
        }
        if let Err(e) = reqwest::Url::parse(&self.url) {
            return Err(ConfigError::Invalid(format!(
                "BF_URL '{}' is not a valid URL: {e}",
                self.url
            )));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 9] = [
        "BF_INGESTION_TTL",
        "BF_DUMP_PATH",
        "BF_URL",
        "BF_JOBS",
        "BF_FLUSH_THRESHOLD",
        "BF_FLUSH_ON_SHUTDOWN",
        "BF_SEND_EMPTY_BATCHES",
        "BF_REQUEST_TIMEOUT_SECS",
        "BF_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ingestion_ttl, 172_800);
        assert_eq!(config.flush_threshold, 1500);
        assert_eq!(config.jobs, 1);
        assert_eq!(config.dump_path, PathBuf::from("dump.json"));
    }

    #[test]
    fn test_validate_zero_jobs() {
        let config = Config {
            jobs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_threshold() {
        let config = Config {
            flush_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_url() {
        let config = Config {
            url: "   ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_dump_path() {
        let config = Config {
            dump_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = Config {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("failed to load config");
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var("BF_INGESTION_TTL", "60");
        env::set_var("BF_DUMP_PATH", "/tmp/observations.json");
        env::set_var("BF_URL", "http://localhost:19000/v2.0/1/ingest/multi");
        env::set_var("BF_JOBS", "4");
        env::set_var("BF_FLUSH_THRESHOLD", "10");
        env::set_var("BF_FLUSH_ON_SHUTDOWN", "FALSE");
        env::set_var("BF_SEND_EMPTY_BATCHES", "true");
        env::set_var("BF_REQUEST_TIMEOUT_SECS", "5");
        env::set_var("BF_LOG_LEVEL", "DEBUG");

        let config = Config::from_env().expect("failed to load config");
        clear_env();

        assert_eq!(config.ingestion_ttl, 60);
        assert_eq!(config.dump_path, PathBuf::from("/tmp/observations.json"));
        assert_eq!(config.url, "http://localhost:19000/v2.0/1/ingest/multi");
        assert_eq!(config.jobs, 4);
        assert_eq!(config.flush_threshold, 10);
        assert!(!config.flush_on_shutdown);
        assert!(config.send_empty_batches);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_from_env_unparseable_numbers_fall_back() {
        clear_env();
        env::set_var("BF_INGESTION_TTL", "forever");
        env::set_var("BF_JOBS", "-2");
        let config = Config::from_env().expect("failed to load config");
        clear_env();

        assert_eq!(config.ingestion_ttl, DEFAULT_INGESTION_TTL);
        assert_eq!(config.jobs, DEFAULT_JOBS);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero_jobs() {
        clear_env();
        env::set_var("BF_JOBS", "0");
        let result = Config::from_env();
        clear_env();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
