use crate::core::{merge_into, CountryResult, ResultBackend, TaskId, TaskInfo, TaskState};
use crate::utils::error::{Result, ServiceError};
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;
use tokio::sync::watch;

/// 平行展開群組中的一個成員任務
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub country: String,
    pub task_id: TaskId,
}

/// 等待群組內所有任務結束的屏障，附帶逾時上限
///
/// 成員依完成順序合併；任一成員最終失敗時整個群組失敗，
/// 已成功的部分結果會被捨棄，仍在執行的成員不會被取消。
pub struct FanOutBarrier {
    group_id: String,
    members: Vec<GroupMember>,
    timeout: Duration,
}

impl FanOutBarrier {
    pub fn new(group_id: String, members: Vec<GroupMember>, timeout: Duration) -> Self {
        Self {
            group_id,
            members,
            timeout,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub async fn join(self, backend: &dyn ResultBackend) -> Result<CountryResult> {
        let FanOutBarrier {
            group_id,
            members,
            timeout,
        } = self;
        let total = members.len();
        let mut pending = FuturesUnordered::new();

        for member in members {
            let receiver = backend.watch(&member.task_id);
            pending.push(async move {
                let outcome = wait_terminal(&member.task_id, receiver).await;
                (member, outcome)
            });
        }

        let mut merged = CountryResult::new();
        let mut completed = 0usize;

        let join = async {
            while let Some((member, outcome)) = pending.next().await {
                let info = outcome?;
                completed += 1;

                match info.state {
                    TaskState::Success => {
                        tracing::debug!(
                            "Group {}: member {} ({}) done, {}/{}",
                            group_id,
                            member.task_id,
                            member.country,
                            completed,
                            total
                        );
                        merge_into(&mut merged, info.result.unwrap_or_default());
                    }
                    _ => {
                        return Err(ServiceError::GroupMemberFailed {
                            task_id: member.task_id,
                            country: member.country,
                            message: info.error.unwrap_or_else(|| "unknown error".to_string()),
                        });
                    }
                }
            }
            Ok::<(), ServiceError>(())
        };

        match tokio::time::timeout(timeout, join).await {
            Ok(Ok(())) => Ok(merged),
            Ok(Err(e)) => {
                tracing::error!("❌ Group {} failed: {}", group_id, e);
                Err(e)
            }
            Err(_) => {
                let pending = total - completed;
                tracing::error!(
                    "⏱️ Group {} timed out after {:?} with {} task(s) pending",
                    group_id,
                    timeout,
                    pending
                );
                Err(ServiceError::GroupTimeout {
                    waited: timeout,
                    pending,
                })
            }
        }
    }
}

async fn wait_terminal(
    task_id: &str,
    receiver: Option<watch::Receiver<TaskInfo>>,
) -> Result<TaskInfo> {
    let not_found = || ServiceError::TaskNotFound {
        task_id: task_id.to_string(),
    };

    let mut receiver = receiver.ok_or_else(not_found)?;
    let info = receiver
        .wait_for(|info| info.is_terminal())
        .await
        .map_err(|_| not_found())?;
    Ok(info.clone())
}
