#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::retry::RetryPolicy;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DIRECTORY_URL: &str = "http://universities.hipolabs.com/search";
pub const MEMORY_BACKEND: &str = "memory://";

/// 解析後的完整服務設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: String,
    pub directory_url: String,
    pub request_timeout_secs: Option<u64>,
    pub broker_url: String,
    pub result_backend: String,
    pub worker_concurrency: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub retry_backoff_max_ms: u64,
    pub retry_jitter: bool,
    pub group_timeout_secs: u64,
    pub result_ttl_secs: u64,
    pub log_format: LogFormat,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            request_timeout_secs: Some(30),
            broker_url: MEMORY_BACKEND.to_string(),
            result_backend: MEMORY_BACKEND.to_string(),
            worker_concurrency: 4,
            max_retries: 5,
            retry_backoff_ms: 1_000,
            retry_backoff_max_ms: 600_000,
            retry_jitter: true,
            group_timeout_secs: 120,
            result_ttl_secs: 86_400,
            log_format: LogFormat::Compact,
            verbose: false,
        }
    }
}

impl AppConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff_base: Duration::from_millis(self.retry_backoff_ms),
            backoff_max: Duration::from_millis(self.retry_backoff_max_ms),
            jitter: self.retry_jitter,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn group_timeout(&self) -> Duration {
        Duration::from_secs(self.group_timeout_secs)
    }

    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_secs)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_socket_addr("server.bind_addr", &self.bind_addr)?;
        validate_url("directory.url", &self.directory_url)?;
        if let Some(timeout) = self.request_timeout_secs {
            validate_positive_number("directory.request_timeout_secs", timeout, 1)?;
        }

        validate_non_empty_string("queue.broker_url", &self.broker_url)?;
        validate_backend_url("queue.broker_url", &self.broker_url)?;
        validate_non_empty_string("queue.result_backend", &self.result_backend)?;
        validate_backend_url("queue.result_backend", &self.result_backend)?;

        validate_range("queue.worker_concurrency", self.worker_concurrency, 1, 256)?;
        validate_range("queue.max_retries", self.max_retries, 0, 20)?;
        validate_range(
            "queue.retry_backoff_max_ms",
            self.retry_backoff_max_ms,
            self.retry_backoff_ms,
            u64::MAX,
        )?;
        validate_positive_number("queue.group_timeout_secs", self.group_timeout_secs, 1)?;
        validate_positive_number("queue.result_ttl_secs", self.result_ttl_secs, 1)?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
