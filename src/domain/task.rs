use crate::domain::model::CountryResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = String;

/// 任務狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// 已送出，等待工作者取用（未知的任務也回報此狀態）
    Pending,

    /// 工作者執行中
    Started,

    /// 執行失敗，等待退避後重試
    Retry,

    /// 執行成功，結果可取用
    Success,

    /// 重試用盡，錯誤為最終結果
    Failure,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Success | TaskState::Failure)
    }
}

/// 任務種類與其參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskKind {
    /// 依序查詢多個國家並合併成單一結果
    FetchMany { countries: Vec<String> },

    /// 查詢單一國家，作為平行展開的工作單位
    FetchOne { country: String },
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::FetchMany { .. } => "universities.fetch_many",
            TaskKind::FetchOne { .. } => "universities.fetch_one",
        }
    }
}

/// 結果儲存中的任務紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: TaskId,
    pub name: String,
    pub state: TaskState,
    pub result: Option<CountryResult>,
    pub error: Option<String>,
    pub retries: u32,
    pub group_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskInfo {
    pub fn pending(task_id: TaskId, kind: &TaskKind, group_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            name: kind.name().to_string(),
            state: TaskState::Pending,
            result: None,
            error: None,
            retries: 0,
            group_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// 結果儲存中查無此任務時回報的紀錄
    pub fn unknown(task_id: &str) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.to_string(),
            name: String::new(),
            state: TaskState::Pending,
            result: None,
            error: None,
            retries: 0,
            group_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_started(&mut self) {
        self.state = TaskState::Started;
        self.updated_at = Utc::now();
    }

    pub fn mark_retry(&mut self, error: String, retries: u32) {
        self.state = TaskState::Retry;
        self.error = Some(error);
        self.retries = retries;
        self.updated_at = Utc::now();
    }

    pub fn mark_success(&mut self, result: CountryResult) {
        self.state = TaskState::Success;
        self.result = Some(result);
        self.error = None;
        self.updated_at = Utc::now();
    }

    pub fn mark_failure(&mut self, error: String) {
        self.state = TaskState::Failure;
        self.error = Some(error);
        self.updated_at = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_state_serialization() {
        let json = serde_json::to_string(&TaskState::Retry).unwrap();
        assert_eq!(json, "\"RETRY\"");
        let json = serde_json::to_string(&TaskState::Success).unwrap();
        assert_eq!(json, "\"SUCCESS\"");
    }

    #[test]
    fn test_task_kind_serialization() {
        let kind = TaskKind::FetchOne {
            country: "turkey".to_string(),
        };
        let value = serde_json::to_value(&kind).unwrap();
        assert_eq!(value["task"], "fetch_one");
        assert_eq!(value["country"], "turkey");
        assert_eq!(kind.name(), "universities.fetch_one");
    }

    #[test]
    fn test_task_info_lifecycle() {
        let kind = TaskKind::FetchMany {
            countries: vec!["india".to_string()],
        };
        let mut info = TaskInfo::pending("task-1".to_string(), &kind, None);
        assert_eq!(info.state, TaskState::Pending);
        assert!(!info.is_terminal());

        info.mark_started();
        assert_eq!(info.state, TaskState::Started);

        info.mark_retry("connection reset".to_string(), 1);
        assert_eq!(info.state, TaskState::Retry);
        assert_eq!(info.retries, 1);
        assert!(!info.is_terminal());

        info.mark_success(CountryResult::new());
        assert_eq!(info.state, TaskState::Success);
        assert!(info.error.is_none());
        assert!(info.is_terminal());
    }

    #[test]
    fn test_unknown_task_reports_pending() {
        let info = TaskInfo::unknown("does-not-exist");
        assert_eq!(info.state, TaskState::Pending);
        assert!(info.result.is_none());
    }
}
