use crate::config::AppConfig;
use crate::utils::error::{Result, ServiceError};
use crate::utils::logger::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML 設定檔，所有欄位皆為可選，未填寫者沿用預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server: Option<ServerSection>,
    pub directory: Option<DirectorySection>,
    pub queue: Option<QueueSection>,
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind_addr: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySection {
    pub url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueSection {
    pub broker_url: Option<String>,
    pub result_backend: Option<String>,
    pub worker_concurrency: Option<usize>,
    pub max_retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub retry_backoff_max_ms: Option<u64>,
    pub retry_jitter: Option<bool>,
    pub group_timeout_secs: Option<u64>,
    pub result_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    pub format: Option<LogFormat>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ServiceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BROKER_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ServiceError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 將檔案中有設定的欄位套用到現有配置上
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(server) = &self.server {
            if let Some(bind_addr) = &server.bind_addr {
                config.bind_addr = bind_addr.clone();
            }
        }

        if let Some(directory) = &self.directory {
            if let Some(url) = &directory.url {
                config.directory_url = url.clone();
            }
            if let Some(timeout) = directory.request_timeout_secs {
                config.request_timeout_secs = Some(timeout);
            }
        }

        if let Some(queue) = &self.queue {
            if let Some(broker_url) = &queue.broker_url {
                config.broker_url = broker_url.clone();
            }
            if let Some(result_backend) = &queue.result_backend {
                config.result_backend = result_backend.clone();
            }
            if let Some(v) = queue.worker_concurrency {
                config.worker_concurrency = v;
            }
            if let Some(v) = queue.max_retries {
                config.max_retries = v;
            }
            if let Some(v) = queue.retry_backoff_ms {
                config.retry_backoff_ms = v;
            }
            if let Some(v) = queue.retry_backoff_max_ms {
                config.retry_backoff_max_ms = v;
            }
            if let Some(v) = queue.retry_jitter {
                config.retry_jitter = v;
            }
            if let Some(v) = queue.group_timeout_secs {
                config.group_timeout_secs = v;
            }
            if let Some(v) = queue.result_ttl_secs {
                config.result_ttl_secs = v;
            }
        }

        if let Some(logging) = &self.logging {
            if let Some(format) = logging.format {
                config.log_format = format;
            }
            if let Some(verbose) = logging.verbose {
                config.verbose = verbose;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_overrides_only_given_fields() {
        let file = FileConfig::from_toml_str(
            r#"
            [server]
            bind_addr = "0.0.0.0:8080"

            [queue]
            worker_concurrency = 8
            max_retries = 3

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        file.apply_to(&mut config);

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.worker_concurrency, 8);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.log_format, LogFormat::Json);
        // Untouched fields keep their defaults.
        assert_eq!(config.directory_url, crate::config::DEFAULT_DIRECTORY_URL);
        assert_eq!(config.group_timeout_secs, 120);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("UNILOOKUP_TEST_DIRECTORY", "http://directory.test/search");
        let file = FileConfig::from_toml_str(
            r#"
            [directory]
            url = "${UNILOOKUP_TEST_DIRECTORY}"
            "#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        file.apply_to(&mut config);
        assert_eq!(config.directory_url, "http://directory.test/search");
    }

    #[test]
    fn test_unset_variable_is_left_verbatim() {
        let file = FileConfig::from_toml_str(
            r#"
            [queue]
            broker_url = "${UNILOOKUP_TEST_SURELY_UNSET}"
            "#,
        )
        .unwrap();

        let queue = file.queue.unwrap();
        assert_eq!(queue.broker_url.as_deref(), Some("${UNILOOKUP_TEST_SURELY_UNSET}"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = FileConfig::from_toml_str("[queue\nmax_retries = ").unwrap_err();
        assert!(matches!(err, ServiceError::ConfigError { .. }));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(FileConfig::from_toml_str("[celery]\nbroker = \"amqp://\"").is_err());
    }
}
