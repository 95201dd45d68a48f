use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use unilookup::core::{tasks, DirectorySource, TaskInfo, TaskState};
use unilookup::{AppConfig, AppContext, CountryResult, ServiceError, UniversityRecord};

/// In-memory directory: each country fails `failures[country]` times before answering.
struct ScriptedDirectory {
    failures: HashMap<String, usize>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl ScriptedDirectory {
    fn new() -> Self {
        Self {
            failures: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
            delay: Duration::ZERO,
        }
    }

    fn failing(mut self, country: &str, times: usize) -> Self {
        self.failures.insert(country.to_string(), times);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls_for(&self, country: &str) -> usize {
        self.calls.lock().unwrap().get(country).copied().unwrap_or(0)
    }
}

#[async_trait]
impl DirectorySource for ScriptedDirectory {
    async fn fetch(&self, country: &str) -> unilookup::Result<CountryResult> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let call = {
            let mut calls = self.calls.lock().unwrap();
            let entry = calls.entry(country.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        if call <= self.failures.get(country).copied().unwrap_or(0) {
            return Err(ServiceError::UnexpectedPayload {
                found: "object".to_string(),
            });
        }

        let mut result = CountryResult::new();
        result.insert(
            country.to_string(),
            vec![UniversityRecord {
                name: Some(format!("University of {}", country)),
                country: Some(country.to_string()),
                ..Default::default()
            }],
        );
        Ok(result)
    }
}

fn fast_config() -> AppConfig {
    AppConfig {
        worker_concurrency: 4,
        retry_backoff_ms: 1,
        retry_backoff_max_ms: 10,
        retry_jitter: false,
        group_timeout_secs: 5,
        ..Default::default()
    }
}

async fn wait_terminal(context: &AppContext, task_id: &str) -> TaskInfo {
    let mut receiver = context.dispatcher.backend().watch(task_id).unwrap();
    let info = tokio::time::timeout(
        Duration::from_secs(5),
        receiver.wait_for(|info| info.is_terminal()),
    )
    .await
    .expect("task did not finish in time")
    .unwrap()
    .clone();
    info
}

#[tokio::test]
async fn test_async_task_recovers_after_transient_failures() {
    let directory = Arc::new(ScriptedDirectory::new().failing("india", 2));
    let (context, background) = AppContext::start_with_source(fast_config(), directory.clone());

    let task_id = context
        .dispatcher
        .submit_many(vec!["india".to_string(), "australia".to_string()])
        .unwrap();

    let info = wait_terminal(&context, &task_id).await;
    assert_eq!(info.state, TaskState::Success);
    assert_eq!(info.retries, 2);
    assert_eq!(info.result.unwrap().len(), 2);
    assert_eq!(directory.calls_for("india"), 3);

    background.shutdown();
}

#[tokio::test]
async fn test_async_task_fails_after_retry_budget() {
    let directory = Arc::new(ScriptedDirectory::new().failing("atlantis", usize::MAX));
    let config = AppConfig {
        max_retries: 3,
        ..fast_config()
    };
    let (context, background) = AppContext::start_with_source(config, directory.clone());

    let task_id = context
        .dispatcher
        .submit_many(vec!["atlantis".to_string()])
        .unwrap();

    let info = wait_terminal(&context, &task_id).await;
    assert_eq!(info.state, TaskState::Failure);
    assert_eq!(info.retries, 3);
    assert!(info.error.is_some());
    assert_eq!(directory.calls_for("atlantis"), 4);

    background.shutdown();
}

#[tokio::test]
async fn test_submit_does_not_wait_for_directory() {
    let directory = Arc::new(ScriptedDirectory::new().with_delay(Duration::from_secs(2)));
    let (context, background) = AppContext::start_with_source(fast_config(), directory);

    let started = Instant::now();
    let task_id = context
        .dispatcher
        .submit_many(vec!["india".to_string()])
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(100));
    let state = context.dispatcher.status(&task_id).state;
    assert!(matches!(state, TaskState::Pending | TaskState::Started));

    background.shutdown();
}

#[tokio::test]
async fn test_group_result_equals_fetch_many() {
    let directory = Arc::new(ScriptedDirectory::new());
    let (context, background) = AppContext::start_with_source(fast_config(), directory.clone());
    let countries: Vec<String> = ["turkey", "india", "australia", "india"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let parallel = context.dispatcher.submit_group(countries.clone()).await.unwrap();
    let sequential = tasks::fetch_many(directory.as_ref(), &countries).await.unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.len(), 3);

    background.shutdown();
}

#[tokio::test]
async fn test_group_fails_even_though_other_members_succeed() {
    let directory = Arc::new(ScriptedDirectory::new().failing("atlantis", usize::MAX));
    let config = AppConfig {
        max_retries: 2,
        ..fast_config()
    };
    let (context, background) = AppContext::start_with_source(config, directory.clone());

    let err = context
        .dispatcher
        .submit_group(vec![
            "india".to_string(),
            "atlantis".to_string(),
            "turkey".to_string(),
        ])
        .await
        .unwrap_err();

    match err {
        ServiceError::GroupMemberFailed { country, .. } => assert_eq!(country, "atlantis"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(directory.calls_for("atlantis"), 3);

    background.shutdown();
}

#[tokio::test]
async fn test_workers_process_group_members_concurrently() {
    let calls = Arc::new(AtomicUsize::new(0));

    struct SlowDirectory {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DirectorySource for SlowDirectory {
        async fn fetch(&self, country: &str) -> unilookup::Result<CountryResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(300)).await;
            let mut result = CountryResult::new();
            result.insert(country.to_string(), Vec::new());
            Ok(result)
        }
    }

    let directory = Arc::new(SlowDirectory {
        calls: Arc::clone(&calls),
    });
    let (context, background) = AppContext::start_with_source(fast_config(), directory);

    let started = Instant::now();
    let result = context
        .dispatcher
        .submit_group(
            ["a", "b", "c", "d"].iter().map(|c| c.to_string()).collect(),
        )
        .await
        .unwrap();

    assert_eq!(result.len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    // Four workers run the four members side by side.
    assert!(started.elapsed() < Duration::from_millis(1000));

    background.shutdown();
}
