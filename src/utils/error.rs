use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Directory request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Directory response could not be parsed: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Directory response is not a JSON array (got {found})")]
    UnexpectedPayload { found: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Task {task_id} for country '{country}' failed: {message}")]
    GroupMemberFailed {
        task_id: String,
        country: String,
        message: String,
    },

    #[error("Task group did not finish within {waited:?} ({pending} task(s) still pending)")]
    GroupTimeout { waited: Duration, pending: usize },

    #[error("Task {task_id} is unknown to the result backend")]
    TaskNotFound { task_id: String },

    #[error("Task queue is closed")]
    QueueClosed,
}

impl ServiceError {
    /// 目錄服務的傳輸或解析錯誤，工作者會依重試策略重新排程
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::TransportError(_)
                | ServiceError::ParseError(_)
                | ServiceError::UnexpectedPayload { .. }
                | ServiceError::IoError(_)
        )
    }

    /// 對應到 HTTP 回應的狀態碼
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::ValidationError { .. } => 422,
            ServiceError::TransportError(_)
            | ServiceError::ParseError(_)
            | ServiceError::UnexpectedPayload { .. } => 502,
            ServiceError::GroupTimeout { .. } => 504,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
