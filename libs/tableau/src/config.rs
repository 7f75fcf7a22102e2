//! Client configuration

use std::time::Duration;

/// Knobs of the HTTP client and the directory operations
///
/// The client never reads the environment itself; callers build this from
/// whatever configuration source they own.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deadline applied to every HTTP request
    pub timeout: Duration,
    /// Reads of a user after a role update before an inconsistency is reported
    pub verify_attempts: u32,
    /// Pause between two verification reads
    pub verify_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            verify_attempts: 1,
            verify_delay: Duration::from_millis(500),
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Allow `attempts` verification reads, `delay` apart (at least one read)
    pub fn with_verify_retries(mut self, attempts: u32, delay: Duration) -> Self {
        self.verify_attempts = attempts.max(1);
        self.verify_delay = delay;
        self
    }
}
