use crate::config::toml_config::FileConfig;
use crate::config::AppConfig;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// 命令列與環境變數；優先順序：命令列/環境變數 > 設定檔 > 預設值
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "unilookup")]
#[command(about = "University directory lookup API with sync, async and parallel modes")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "UNILOOKUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address the HTTP server binds to
    #[arg(long, env = "UNILOOKUP_BIND")]
    pub bind: Option<String>,

    /// Base URL of the university directory service
    #[arg(long, env = "UNILOOKUP_DIRECTORY_URL")]
    pub directory_url: Option<String>,

    /// Timeout for a single directory request, in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Broker connection string
    #[arg(long, env = "BROKER_URL")]
    pub broker_url: Option<String>,

    /// Result backend connection string
    #[arg(long, env = "RESULT_BACKEND")]
    pub result_backend: Option<String>,

    /// Number of queue workers
    #[arg(long)]
    pub workers: Option<usize>,

    /// Retries allowed after the first failed attempt
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Seconds the parallel endpoint waits for its task group
    #[arg(long)]
    pub group_timeout: Option<u64>,

    /// Log output format (compact or json)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = AppConfig::default();

        if let Some(path) = &self.config {
            FileConfig::from_file(path)?.apply_to(&mut config);
        }

        if let Some(bind) = &self.bind {
            config.bind_addr = bind.clone();
        }
        if let Some(url) = &self.directory_url {
            config.directory_url = url.clone();
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout_secs = Some(timeout);
        }
        if let Some(broker_url) = &self.broker_url {
            config.broker_url = broker_url.clone();
        }
        if let Some(result_backend) = &self.result_backend {
            config.result_backend = result_backend.clone();
        }
        if let Some(workers) = self.workers {
            config.worker_concurrency = workers;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(group_timeout) = self.group_timeout {
            config.group_timeout_secs = group_timeout;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if self.verbose {
            config.verbose = true;
        }

        Ok(config)
    }
}
