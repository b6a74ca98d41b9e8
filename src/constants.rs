//! Tuned delay and retry constants.
//!
//! The settle delays were measured on real hardware: shorter waits after an
//! AP teardown made the newly defined network come up very slowly or not at
//! all. Treat these as defaults, not laws; they are overridable through
//! [`Timings`](crate::models::Timings).

/// Delay constants (in milliseconds).
pub mod timeouts {
    use std::time::Duration;

    pub const POLL_INTERVAL_MS: u64 = 3_000;
    pub const SCAN_RETRY_DELAY_MS: u64 = 3_000;
    pub const RESPONSE_SETTLE_MS: u64 = 2_000;
    pub const TEARDOWN_SETTLE_MS: u64 = 5_000;

    /// Interval between connection-status probes.
    pub fn poll_interval() -> Duration {
        Duration::from_millis(POLL_INTERVAL_MS)
    }

    /// Wait between failed scan attempts.
    pub fn scan_retry_delay() -> Duration {
        Duration::from_millis(SCAN_RETRY_DELAY_MS)
    }

    /// Wait after acknowledging a reconfiguration request, so the in-flight
    /// response can leave before the interface goes down with it.
    pub fn response_settle() -> Duration {
        Duration::from_millis(RESPONSE_SETTLE_MS)
    }

    /// Wait after stopping the access point, so the interface and its IP are
    /// fully released before the new network is defined.
    pub fn teardown_settle() -> Duration {
        Duration::from_millis(TEARDOWN_SETTLE_MS)
    }
}

/// Attempt budget constants.
pub mod retries {
    pub const BOOTSTRAP_MAX_ATTEMPTS: u32 = 10;
    pub const RECONFIGURE_MAX_ATTEMPTS: u32 = 20;
    pub const SCAN_MAX_ATTEMPTS: u32 = 10;
}
