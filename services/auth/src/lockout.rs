//! Failed-login tracking for brute force protection

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Lockout configuration
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Consecutive failures before the account is locked
    pub max_failures: u32,
    /// Window in which failures are counted
    pub window: Duration,
    /// How long a locked account stays locked
    pub lockout: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(300),
            lockout: Duration::from_secs(900),
        }
    }
}

#[derive(Debug)]
struct FailureEntry {
    failures: u32,
    first_failure: Instant,
    locked_until: Option<Instant>,
}

/// Per-username failed-login tracker
#[derive(Debug, Clone)]
pub struct LoginLockout {
    config: LockoutConfig,
    entries: Arc<Mutex<HashMap<String, FailureEntry>>>,
}

impl LoginLockout {
    /// Create a new lockout tracker
    pub fn new(config: LockoutConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Is this username currently locked out?
    pub async fn is_locked(&self, username: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(username) else {
            return false;
        };

        match entry.locked_until {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                // Lock expired, start over.
                entries.remove(username);
                false
            }
            None => false,
        }
    }

    /// Record a failed attempt; locks the username once the limit is hit
    pub async fn record_failure(&self, username: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries
            .entry(username.to_string())
            .or_insert(FailureEntry {
                failures: 0,
                first_failure: now,
                locked_until: None,
            });

        // Stale window, restart the count.
        if now.duration_since(entry.first_failure) >= self.config.window {
            entry.failures = 0;
            entry.first_failure = now;
        }

        entry.failures += 1;
        if entry.failures >= self.config.max_failures {
            entry.locked_until = Some(now + self.config.lockout);
            info!(
                "Locked username {} for {} seconds after {} failed logins",
                username,
                self.config.lockout.as_secs(),
                entry.failures
            );
        }
    }

    /// Clear tracked failures after a successful login
    pub async fn clear(&self, username: &str) {
        self.entries.lock().await.remove(username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lockout(max_failures: u32) -> LoginLockout {
        LoginLockout::new(LockoutConfig {
            max_failures,
            window: Duration::from_secs(300),
            lockout: Duration::from_secs(900),
        })
    }

    #[tokio::test]
    async fn test_locks_after_max_failures() {
        let tracker = lockout(3);

        for _ in 0..2 {
            tracker.record_failure("alice").await;
        }
        assert!(!tracker.is_locked("alice").await);

        tracker.record_failure("alice").await;
        assert!(tracker.is_locked("alice").await);
        assert!(!tracker.is_locked("bob").await);
    }

    #[tokio::test]
    async fn test_success_clears_failures() {
        let tracker = lockout(3);

        tracker.record_failure("alice").await;
        tracker.record_failure("alice").await;
        tracker.clear("alice").await;

        tracker.record_failure("alice").await;
        assert!(!tracker.is_locked("alice").await);
    }

    #[tokio::test]
    async fn test_expired_lock_is_released() {
        let tracker = LoginLockout::new(LockoutConfig {
            max_failures: 1,
            window: Duration::from_secs(300),
            lockout: Duration::from_millis(10),
        });

        tracker.record_failure("alice").await;
        assert!(tracker.is_locked("alice").await);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!tracker.is_locked("alice").await);
    }
}
