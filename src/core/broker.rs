use crate::core::retry::RetryPolicy;
use crate::core::{DirectorySource, ResultBackend, TaskId, TaskKind};
use crate::utils::error::{Result, ServiceError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// 佇列中傳遞的任務訊息
#[derive(Debug, Clone)]
pub struct TaskMessage {
    pub task_id: TaskId,
    pub kind: TaskKind,
    /// 已經重試過的次數
    pub retries: u32,
}

impl TaskMessage {
    pub fn new(task_id: TaskId, kind: TaskKind) -> Self {
        Self {
            task_id,
            kind,
            retries: 0,
        }
    }
}

pub type TaskReceiver = mpsc::UnboundedReceiver<TaskMessage>;

/// 行程內的訊息佇列（memory://）
#[derive(Debug, Clone)]
pub struct MemoryBroker {
    sender: mpsc::UnboundedSender<TaskMessage>,
}

impl MemoryBroker {
    pub fn new() -> (Self, TaskReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// 立即送出，不等待任何工作者
    pub fn publish(&self, message: TaskMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| ServiceError::QueueClosed)
    }

    /// 延遲後重新送出，期間不佔用工作者
    pub fn publish_after(&self, message: TaskMessage, delay: Duration) {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = sender.send(message) {
                tracing::warn!("⚠️ Dropping retry for task {}: queue closed", e.0.task_id);
            }
        });
    }
}

/// 工作者共用的執行環境
#[derive(Clone)]
pub struct WorkerContext {
    pub broker: MemoryBroker,
    pub backend: Arc<dyn ResultBackend>,
    pub source: Arc<dyn DirectorySource>,
    pub retry: RetryPolicy,
}

/// 消費佇列的工作者池
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(concurrency: usize, receiver: TaskReceiver, context: WorkerContext) -> Self {
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..concurrency.max(1))
            .map(|i| {
                let receiver = Arc::clone(&receiver);
                let context = context.clone();
                tokio::spawn(worker_loop(format!("worker-{}", i), receiver, context))
            })
            .collect();

        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    pub fn shutdown(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}

async fn worker_loop(name: String, receiver: Arc<Mutex<TaskReceiver>>, context: WorkerContext) {
    tracing::debug!("🔧 {} started", name);

    loop {
        // 只在取訊息時持有鎖，執行期間讓其他工作者繼續取用
        let message = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };

        let Some(message) = message else {
            tracing::debug!("{} stopping: queue closed", name);
            break;
        };

        tracing::debug!("🔨 {} picked up task {} ({})", name, message.task_id, message.kind.name());
        run_task(&context, message).await;
    }
}

/// 執行單一任務並將結果寫回結果儲存
pub async fn run_task(context: &WorkerContext, message: TaskMessage) {
    let Some(mut info) = context.backend.get(&message.task_id) else {
        tracing::warn!("⚠️ Task {} no longer in result backend, skipping", message.task_id);
        return;
    };

    info.mark_started();
    let _ = context.backend.store(info.clone());

    match message.kind.execute(context.source.as_ref()).await {
        Ok(result) => {
            tracing::info!(
                "✅ Task {} succeeded with {} countries",
                message.task_id,
                result.len()
            );
            info.mark_success(result);
        }
        Err(e) if e.is_retryable() && context.retry.should_retry(message.retries) => {
            let delay = context.retry.delay_for(message.retries);
            let retries = message.retries + 1;
            tracing::warn!(
                "🔁 Task {} failed ({}), retry {}/{} in {:?}",
                message.task_id,
                e,
                retries,
                context.retry.max_retries,
                delay
            );
            info.mark_retry(e.to_string(), retries);
            context.broker.publish_after(
                TaskMessage {
                    retries,
                    ..message
                },
                delay,
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Task {} failed permanently after {} retries: {}",
                message.task_id,
                message.retries,
                e
            );
            info.mark_failure(e.to_string());
        }
    }

    if let Err(e) = context.backend.store(info) {
        tracing::warn!("⚠️ Could not record task outcome: {}", e);
    }
}
