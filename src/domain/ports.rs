use crate::domain::model::CountryResult;
use crate::domain::task::TaskInfo;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;

/// 外部大學目錄的查詢介面
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// 查詢單一國家，回傳只含該國一個鍵的對應
    async fn fetch(&self, country: &str) -> Result<CountryResult>;
}

/// 任務狀態與結果的儲存
pub trait ResultBackend: Send + Sync {
    /// 登記新任務
    fn insert(&self, info: TaskInfo);

    /// 覆寫既有任務的紀錄並通知等待者
    fn store(&self, info: TaskInfo) -> Result<()>;

    fn get(&self, task_id: &str) -> Option<TaskInfo>;

    /// 訂閱任務紀錄的變化
    fn watch(&self, task_id: &str) -> Option<watch::Receiver<TaskInfo>>;

    /// 清除結束超過 `ttl` 的任務，回傳清除數量
    fn purge_expired(&self, ttl: Duration) -> usize;
}
