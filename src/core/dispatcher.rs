use crate::core::broker::{MemoryBroker, TaskMessage};
use crate::core::group::{FanOutBarrier, GroupMember};
use crate::core::{CountryResult, ResultBackend, TaskId, TaskInfo, TaskKind};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// 任務送出與狀態查詢
pub struct TaskDispatcher {
    broker: MemoryBroker,
    backend: Arc<dyn ResultBackend>,
    group_timeout: Duration,
}

impl TaskDispatcher {
    pub fn new(broker: MemoryBroker, backend: Arc<dyn ResultBackend>, group_timeout: Duration) -> Self {
        Self {
            broker,
            backend,
            group_timeout,
        }
    }

    pub fn backend(&self) -> &Arc<dyn ResultBackend> {
        &self.backend
    }

    fn submit(&self, kind: TaskKind, group_id: Option<String>) -> Result<TaskId> {
        let task_id = Uuid::new_v4().to_string();

        // 先登記再送出，避免工作者搶先取用時查無紀錄
        self.backend
            .insert(TaskInfo::pending(task_id.clone(), &kind, group_id));
        self.broker.publish(TaskMessage::new(task_id.clone(), kind))?;

        Ok(task_id)
    }

    /// 送出一個 fetch-many 任務，立即回傳任務 ID
    pub fn submit_many(&self, countries: Vec<String>) -> Result<TaskId> {
        let count = countries.len();
        let task_id = self.submit(TaskKind::FetchMany { countries }, None)?;
        tracing::info!("📨 Submitted task {} for {} countries", task_id, count);
        Ok(task_id)
    }

    /// 每個國家送出一個 fetch-one 任務，等待整組結束後合併結果
    pub async fn submit_group(&self, countries: Vec<String>) -> Result<CountryResult> {
        let group_id = Uuid::new_v4().to_string();
        let mut members = Vec::with_capacity(countries.len());

        for country in countries {
            let task_id = self.submit(
                TaskKind::FetchOne {
                    country: country.clone(),
                },
                Some(group_id.clone()),
            )?;
            members.push(GroupMember { country, task_id });
        }

        tracing::info!(
            "📨 Submitted group {} with {} tasks, waiting up to {:?}",
            group_id,
            members.len(),
            self.group_timeout
        );

        FanOutBarrier::new(group_id, members, self.group_timeout)
            .join(self.backend.as_ref())
            .await
    }

    /// 查詢任務狀態；未知或已過期的任務回報 PENDING
    pub fn status(&self, task_id: &str) -> TaskInfo {
        self.backend
            .get(task_id)
            .unwrap_or_else(|| TaskInfo::unknown(task_id))
    }
}
