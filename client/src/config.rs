use std::time::Duration;

/// Wait after a transaction change before recomputing budget spent amounts
pub const DEFAULT_REALTIME_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub realtime_settle_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            realtime_settle_delay: DEFAULT_REALTIME_SETTLE_DELAY,
        }
    }
}
