use crate::config::AppConfig;
use crate::core::backend::MemoryResultBackend;
use crate::core::broker::{MemoryBroker, WorkerContext, WorkerPool};
use crate::core::directory::DirectoryClient;
use crate::core::dispatcher::TaskDispatcher;
use crate::core::{DirectorySource, ResultBackend};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// 請求處理所需的共用狀態，於啟動時建立一次並傳給路由
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub directory: Arc<dyn DirectorySource>,
    pub dispatcher: Arc<TaskDispatcher>,
}

/// 背景工作：佇列工作者與過期結果清理
pub struct BackgroundTasks {
    workers: WorkerPool,
    reaper: JoinHandle<()>,
}

impl BackgroundTasks {
    pub fn worker_count(&self) -> usize {
        self.workers.size()
    }

    pub fn shutdown(self) {
        self.reaper.abort();
        self.workers.shutdown();
        tracing::info!("🛑 Background workers stopped");
    }
}

impl AppContext {
    /// 建立目錄客戶端並啟動背景工作
    pub fn start(config: AppConfig) -> Result<(Self, BackgroundTasks)> {
        let client = DirectoryClient::new(config.directory_url.clone(), config.request_timeout())?;
        Ok(Self::start_with_source(config, Arc::new(client)))
    }

    /// 使用指定的目錄來源啟動，必須在 tokio runtime 內呼叫
    pub fn start_with_source(
        config: AppConfig,
        source: Arc<dyn DirectorySource>,
    ) -> (Self, BackgroundTasks) {
        let backend: Arc<dyn ResultBackend> = Arc::new(MemoryResultBackend::new());
        let (broker, receiver) = MemoryBroker::new();

        let workers = WorkerPool::spawn(
            config.worker_concurrency,
            receiver,
            WorkerContext {
                broker: broker.clone(),
                backend: Arc::clone(&backend),
                source: Arc::clone(&source),
                retry: config.retry_policy(),
            },
        );
        let reaper = spawn_reaper(Arc::clone(&backend), config.result_ttl());

        tracing::info!(
            "🔧 Started {} queue workers (broker {}, results {})",
            workers.size(),
            config.broker_url,
            config.result_backend
        );

        let dispatcher = TaskDispatcher::new(broker, backend, config.group_timeout());
        let context = Self {
            config: Arc::new(config),
            directory: source,
            dispatcher: Arc::new(dispatcher),
        };

        (context, BackgroundTasks { workers, reaper })
    }
}

fn spawn_reaper(backend: Arc<dyn ResultBackend>, ttl: Duration) -> JoinHandle<()> {
    let period = ttl.clamp(Duration::from_secs(1), Duration::from_secs(60));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // 第一次 tick 立即完成
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = backend.purge_expired(ttl);
            if purged > 0 {
                tracing::info!("🧹 Purged {} expired task results", purged);
            }
        }
    })
}
