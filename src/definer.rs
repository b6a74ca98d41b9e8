//! Persisting network definitions to the platform supplicant.

use log::info;
use std::sync::Arc;

use crate::Result;
use crate::command::CommandRunner;
use crate::models::Credentials;
use crate::platform::PlatformCommandSet;
use crate::scan::parse_network_list;

/// Persists new credentials (open or secured) to the underlying supplicant.
#[derive(Clone)]
pub struct NetworkDefiner {
    runner: Arc<dyn CommandRunner>,
    commands: Arc<PlatformCommandSet>,
}

impl NetworkDefiner {
    pub fn new(runner: Arc<dyn CommandRunner>, commands: Arc<PlatformCommandSet>) -> Self {
        Self { runner, commands }
    }

    /// Defines a new network from validated credentials.
    ///
    /// Open credentials select the open-network template; otherwise the
    /// secured template runs. The SSID and passphrase are bound as the
    /// `SSID`/`PSK` environment variables, never substituted into the
    /// command text, so user-supplied names cannot inject shell syntax.
    ///
    /// If the device is not currently connected, a valid definition should
    /// cause the supplicant to associate on its own.
    pub async fn define(&self, creds: &Credentials) -> Result<()> {
        let template = if creds.is_open() {
            info!("defining open network '{}'", creds.ssid());
            self.commands.define_open_network
        } else {
            info!("defining secured network '{}'", creds.ssid());
            self.commands.define_network
        };

        let env = [
            ("SSID", creds.ssid()),
            ("PSK", creds.passphrase().unwrap_or("")),
        ];
        self.runner.run(template, &env).await?;
        Ok(())
    }

    /// Returns the names of known (saved) networks.
    pub async fn known_networks(&self) -> Result<Vec<String>> {
        let out = self.runner.run(self.commands.known_networks, &[]).await?;
        Ok(parse_network_list(&out))
    }
}
