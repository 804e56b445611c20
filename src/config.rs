use alloc::string::String;

/// Default wake-lock timeout: one hour.
pub const DEFAULT_WAKE_LOCK_TIMEOUT_MS: u64 = 60 * 60 * 1000;

/// Default tag reported to the wake-lock service.
pub const DEFAULT_WAKE_LOCK_TAG: &str = "axsession:session_lock";

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Tag passed to the wake-lock service on acquisition.
    pub wake_lock_tag: String,
    /// Upper bound the wake-lock service may hold the lock for, in milliseconds.
    pub wake_lock_timeout_ms: u64,
    /// Whether a wake lock is taken once a session reports it is open.
    pub acquire_wake_lock: bool,
}

/// The implemention for SchedulerConfig
impl SchedulerConfig {
    /// The new function for SchedulerConfig
    pub fn new() -> Self {
        Self {
            wake_lock_tag: String::from(DEFAULT_WAKE_LOCK_TAG),
            wake_lock_timeout_ms: DEFAULT_WAKE_LOCK_TIMEOUT_MS,
            acquire_wake_lock: true,
        }
    }

    /// Sets the wake-lock tag.
    pub fn with_wake_lock_tag(mut self, tag: &str) -> Self {
        self.wake_lock_tag = String::from(tag);
        self
    }

    /// Sets the wake-lock timeout in milliseconds.
    pub fn with_wake_lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.wake_lock_timeout_ms = timeout_ms;
        self
    }

    /// Disables wake-lock acquisition entirely.
    pub fn without_wake_lock(mut self) -> Self {
        self.acquire_wake_lock = false;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.wake_lock_tag, DEFAULT_WAKE_LOCK_TAG);
        assert_eq!(config.wake_lock_timeout_ms, 3_600_000);
        assert!(config.acquire_wake_lock);
    }

    #[test]
    fn test_config_builders() {
        let config = SchedulerConfig::new()
            .with_wake_lock_tag("rtl:driver")
            .with_wake_lock_timeout_ms(5_000)
            .without_wake_lock();
        assert_eq!(config.wake_lock_tag, "rtl:driver");
        assert_eq!(config.wake_lock_timeout_ms, 5_000);
        assert!(!config.acquire_wake_lock);
    }
}
