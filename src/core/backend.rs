use crate::core::{ResultBackend, TaskId, TaskInfo};
use crate::utils::error::{Result, ServiceError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;

/// 行程內的任務結果儲存（memory://）
///
/// 每個任務對應一個 watch 通道，寫入時同步通知所有等待者。
#[derive(Default)]
pub struct MemoryResultBackend {
    tasks: RwLock<HashMap<TaskId, watch::Sender<TaskInfo>>>,
}

impl MemoryResultBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultBackend for MemoryResultBackend {
    fn insert(&self, info: TaskInfo) {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        let (sender, _) = watch::channel(info.clone());
        tasks.insert(info.task_id, sender);
    }

    fn store(&self, info: TaskInfo) -> Result<()> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        match tasks.get(&info.task_id) {
            Some(sender) => {
                sender.send_replace(info);
                Ok(())
            }
            None => Err(ServiceError::TaskNotFound {
                task_id: info.task_id,
            }),
        }
    }

    fn get(&self, task_id: &str) -> Option<TaskInfo> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        tasks.get(task_id).map(|sender| sender.borrow().clone())
    }

    fn watch(&self, task_id: &str) -> Option<watch::Receiver<TaskInfo>> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        tasks.get(task_id).map(|sender| sender.subscribe())
    }

    fn purge_expired(&self, ttl: Duration) -> usize {
        let cutoff = match chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl))
        {
            Some(cutoff) => cutoff,
            None => return 0,
        };

        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        let before = tasks.len();
        tasks.retain(|_, sender| {
            let info = sender.borrow();
            !(info.is_terminal() && info.updated_at < cutoff)
        });
        before - tasks.len()
    }
}
