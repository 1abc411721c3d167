use std::time::Duration;

/// Default number of retries after the first failed attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wait between attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(5000);

/// Fixed-interval retry policy for database connections
///
/// Every retry waits the same `interval`: no exponential growth and no
/// jitter. A policy with `max_retries = 3` allows four attempts in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first failure
    pub max_retries: u32,

    /// Delay before each retry
    pub interval: Duration,
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then make retry number `attempt` (1-based)
    Retry { attempt: u32, delay: Duration },
    /// The retry budget is spent
    GiveUp,
}

impl RetryPolicy {
    /// Create a new retry policy with defaults (3 retries, 5s apart)
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            interval: Duration::ZERO,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Decide the next step given how many retries were already made.
    pub fn after_failure(&self, retries_so_far: u32) -> RetryDecision {
        if retries_so_far < self.max_retries {
            RetryDecision::Retry {
                attempt: retries_so_far + 1,
                delay: self.interval,
            }
        } else {
            RetryDecision::GiveUp
        }
    }

    /// Total number of attempts this policy allows, first one included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_retry_policy_builder() {
        let policy = RetryPolicy::new()
            .with_max_retries(5)
            .with_interval(Duration::from_millis(200));

        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.interval, Duration::from_millis(200));
    }

    #[test]
    fn test_after_failure_retries_until_budget_spent() {
        let policy = RetryPolicy::new().with_max_retries(2);

        assert_eq!(
            policy.after_failure(0),
            RetryDecision::Retry {
                attempt: 1,
                delay: DEFAULT_RETRY_INTERVAL
            }
        );
        assert_eq!(
            policy.after_failure(1),
            RetryDecision::Retry {
                attempt: 2,
                delay: DEFAULT_RETRY_INTERVAL
            }
        );
        assert_eq!(policy.after_failure(2), RetryDecision::GiveUp);
    }

    #[test]
    fn test_interval_is_fixed() {
        let policy = RetryPolicy::new().with_max_retries(10);
        let delays: Vec<_> = (0..10)
            .filter_map(|n| match policy.after_failure(n) {
                RetryDecision::Retry { delay, .. } => Some(delay),
                RetryDecision::GiveUp => None,
            })
            .collect();

        assert_eq!(delays.len(), 10);
        assert!(delays.iter().all(|d| *d == DEFAULT_RETRY_INTERVAL));
    }

    #[test]
    fn test_no_retry() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.after_failure(0), RetryDecision::GiveUp);
        assert_eq!(policy.max_attempts(), 1);
    }
}
