//! Network scanning with bounded retry.

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::command::CommandRunner;
use crate::platform::PlatformCommandSet;

/// Lists visible networks ordered by signal strength.
///
/// Scanning is advisory: it must never block startup, so [`Scanner::scan`]
/// cannot fail. The underlying tools reject scans when the hardware is busy
/// (and on some targets whenever the AP is up), so failed attempts are
/// retried after a fixed delay up to the caller's budget, and exhaustion
/// yields an empty list.
#[derive(Clone)]
pub struct Scanner {
    runner: Arc<dyn CommandRunner>,
    commands: Arc<PlatformCommandSet>,
    retry_delay: Duration,
    cancel: CancellationToken,
}

impl Scanner {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        commands: Arc<PlatformCommandSet>,
        retry_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            runner,
            commands,
            retry_delay,
            cancel,
        }
    }

    /// Scans for visible networks, retrying up to `max_attempts` total tries.
    ///
    /// Returns SSIDs in the order the platform reports them (best signal
    /// first), with empty lines dropped. Never errors; all attempts failing,
    /// or cancellation mid-retry, resolves to an empty list.
    pub async fn scan(&self, max_attempts: u32) -> Vec<String> {
        let budget = max_attempts.max(1);

        for attempt in 1..=budget {
            match self.runner.run(self.commands.scan, &[]).await {
                Ok(out) => return parse_network_list(&out),
                Err(e) => warn!("scan attempt {attempt}/{budget} failed: {e}"),
            }

            if attempt < budget {
                debug!("will scan again in {:?}", self.retry_delay);
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        debug!("scan cancelled; returning no results");
                        return Vec::new();
                    }
                    _ = time::sleep(self.retry_delay) => {}
                }
            }
        }

        warn!("giving up; no scan results available");
        Vec::new()
    }
}

/// Splits newline-delimited command output into an order-preserving list,
/// dropping empty entries. The probing layer does not deduplicate.
pub(crate) fn parse_network_list(out: &str) -> Vec<String> {
    out.lines()
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
