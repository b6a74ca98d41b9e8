//! Connection status probing.

use std::sync::Arc;

use crate::Result;
use crate::command::CommandRunner;
use crate::platform::PlatformCommandSet;

/// Reports the current connection state and associated network name.
///
/// A stateless request/response wrapper: retry and "is this connected?"
/// classification both belong to the caller.
#[derive(Clone)]
pub struct StatusProbe {
    runner: Arc<dyn CommandRunner>,
    commands: Arc<PlatformCommandSet>,
}

impl StatusProbe {
    pub fn new(runner: Arc<dyn CommandRunner>, commands: Arc<PlatformCommandSet>) -> Self {
        Self { runner, commands }
    }

    /// Returns the raw connection state token, uncategorized.
    ///
    /// On the supported targets the token is `COMPLETED` when connected and
    /// values like `DISCONNECTED`, `INACTIVE`, or transitional states
    /// otherwise. Compare against
    /// [`PlatformCommandSet::connected_token`](crate::PlatformCommandSet)
    /// rather than hard-coding a value.
    pub async fn status(&self) -> Result<String> {
        self.runner.run(self.commands.status, &[]).await
    }

    /// Returns the SSID of the current network, or an empty string when not
    /// associated.
    pub async fn connected_network(&self) -> Result<String> {
        self.runner.run(self.commands.connected_network, &[]).await
    }
}
