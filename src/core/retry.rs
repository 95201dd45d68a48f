use rand::Rng;
use std::time::Duration;

/// 任務失敗時的重試策略（指數退避）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 第一次執行之後允許的重試次數
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    /// 啟用時實際延遲在 [0, 退避上限] 間均勻取樣
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base: Duration::from_secs(1),
            backoff_max: Duration::from_secs(600),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, retries_so_far: u32) -> bool {
        retries_so_far < self.max_retries
    }

    /// 第 `retry` 次重試（從 0 起算）的退避上限：min(base * 2^retry, max)
    pub fn backoff_ceiling(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.backoff_base
            .checked_mul(factor)
            .unwrap_or(self.backoff_max)
            .min(self.backoff_max)
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        let ceiling = self.backoff_ceiling(retry);
        if !self.jitter || ceiling.is_zero() {
            return ceiling;
        }

        let millis = ceiling.as_millis().min(u64::MAX as u128) as u64;
        Duration::from_millis(rand::rng().random_range(0..=millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> RetryPolicy {
        RetryPolicy {
            jitter: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_backoff_doubles_until_capped() {
        let policy = no_jitter();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(16));
        assert_eq!(policy.delay_for(10), Duration::from_secs(600));
        assert_eq!(policy.delay_for(40), Duration::from_secs(600));
    }

    #[test]
    fn test_jitter_stays_within_ceiling() {
        let policy = RetryPolicy::default();
        for retry in 0..6 {
            let ceiling = policy.backoff_ceiling(retry);
            for _ in 0..20 {
                assert!(policy.delay_for(retry) <= ceiling);
            }
        }
    }

    #[test]
    fn test_should_retry_respects_limit() {
        let policy = no_jitter();
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(4));
        assert!(!policy.should_retry(5));

        let never = RetryPolicy {
            max_retries: 0,
            ..no_jitter()
        };
        assert!(!never.should_retry(0));
    }
}
