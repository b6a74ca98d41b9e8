//! Configuration access point control.

use log::info;
use std::sync::Arc;

use crate::Result;
use crate::command::CommandRunner;
use crate::platform::PlatformCommandSet;

/// Starts and stops the local configuration access point.
///
/// Both operations resolve when their command has been issued, which is not
/// the same as the AP being up or fully torn down: hostapd and the DHCP
/// daemon converge on their own schedule. Callers that need readiness apply
/// the orchestrator's settle delays.
///
/// Neither operation tracks whether the AP is already in the requested
/// state; a redundant start or stop is indistinguishable from the first and
/// succeeds or fails on the normal command contract.
#[derive(Clone)]
pub struct AccessPointController {
    runner: Arc<dyn CommandRunner>,
    commands: Arc<PlatformCommandSet>,
}

impl AccessPointController {
    pub fn new(runner: Arc<dyn CommandRunner>, commands: Arc<PlatformCommandSet>) -> Self {
        Self { runner, commands }
    }

    /// Issues the platform's start-AP command.
    pub async fn start(&self) -> Result<()> {
        info!("starting configuration access point");
        self.runner.run(self.commands.start_ap, &[]).await?;
        Ok(())
    }

    /// Issues the platform's stop-AP command.
    pub async fn stop(&self) -> Result<()> {
        info!("stopping configuration access point");
        self.runner.run(self.commands.stop_ap, &[]).await?;
        Ok(())
    }
}
