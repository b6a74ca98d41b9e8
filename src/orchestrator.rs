//! The connectivity bootstrap and mode-transition state machine.
//!
//! One orchestrator instance exists per device. It owns the device mode and
//! the preliminary scan cache exclusively; the components it composes are
//! stateless wrappers. All retry, backoff, and settle-delay policy lives
//! here and nowhere else.

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::access_point::AccessPointController;
use crate::command::{CommandRunner, ShellRunner};
use crate::definer::NetworkDefiner;
use crate::models::{Credentials, DeviceMode, Event, ProvisionError, Timings};
use crate::platform::{Platform, PlatformCommandSet};
use crate::scan::Scanner;
use crate::status::StatusProbe;

/// Mode and cross-call state, owned exclusively by the orchestrator.
struct OrchestratorState {
    mode: DeviceMode,
    /// Scan results captured before entering provisioning mode. Some targets
    /// cannot scan once the AP is broadcasting, so this is the only listing
    /// a user connecting to the AP will get. Written once per entry into
    /// provisioning, discarded on return to station mode.
    preliminary_scan: Vec<String>,
}

/// Sequences connectivity bootstrap, provisioning fallback, and
/// user-driven reconfiguration.
///
/// At most one mode transition runs at a time: [`DeviceMode::Transitioning`]
/// doubles as the exclusion flag, and a request arriving while one is in
/// flight is rejected with [`ProvisionError::TransitionInProgress`].
pub struct Orchestrator {
    runner: Arc<dyn CommandRunner>,
    commands: Arc<PlatformCommandSet>,
    probe: StatusProbe,
    scanner: Scanner,
    access_point: AccessPointController,
    definer: NetworkDefiner,
    timings: Timings,
    state: Mutex<OrchestratorState>,
    events: Option<mpsc::UnboundedSender<Event>>,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Creates an orchestrator over the given runner and command set, with
    /// default [`Timings`].
    pub fn new(runner: Arc<dyn CommandRunner>, commands: PlatformCommandSet) -> Self {
        let commands = Arc::new(commands);
        let timings = Timings::default();
        let cancel = CancellationToken::new();
        Self {
            probe: StatusProbe::new(runner.clone(), commands.clone()),
            scanner: Scanner::new(
                runner.clone(),
                commands.clone(),
                timings.scan_retry_delay,
                cancel.clone(),
            ),
            access_point: AccessPointController::new(runner.clone(), commands.clone()),
            definer: NetworkDefiner::new(runner.clone(), commands.clone()),
            runner,
            commands,
            timings,
            state: Mutex::new(OrchestratorState {
                mode: DeviceMode::Station,
                preliminary_scan: Vec::new(),
            }),
            events: None,
            cancel,
        }
    }

    /// Creates an orchestrator for the detected platform, using the real
    /// shell runner.
    pub async fn detect() -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner::new());
        let platform = Platform::detect(runner.as_ref()).await;
        Self::new(runner, PlatformCommandSet::for_platform(platform))
    }

    /// Replaces the default timings.
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.scanner = Scanner::new(
            self.runner.clone(),
            self.commands.clone(),
            timings.scan_retry_delay,
            self.cancel.clone(),
        );
        self.timings = timings;
        self
    }

    /// Attaches a notification channel. Events are one-way; a dropped
    /// receiver never blocks or fails an operation.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<Event>) -> Self {
        self.events = Some(events);
        self
    }

    /// Threads an externally owned cancellation token through every
    /// suspension point (settle delays and retry waits). Cancelling it makes
    /// in-flight operations return [`ProvisionError::Cancelled`] at their
    /// next delay.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.scanner = Scanner::new(
            self.runner.clone(),
            self.commands.clone(),
            self.timings.scan_retry_delay,
            cancel.clone(),
        );
        self.cancel = cancel;
        self
    }

    /// The cancellation token governing this orchestrator's suspension
    /// points.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The current device mode.
    pub async fn mode(&self) -> DeviceMode {
        self.state.lock().await.mode
    }

    /// Returns the raw connection state token (see [`StatusProbe::status`]).
    pub async fn status(&self) -> Result<String> {
        self.probe.status().await
    }

    /// Returns the SSID of the current network, or an empty string.
    pub async fn connected_network(&self) -> Result<String> {
        self.probe.connected_network().await
    }

    /// Returns the names of known (saved) networks.
    pub async fn known_networks(&self) -> Result<Vec<String>> {
        self.definer.known_networks().await
    }

    /// Issues the platform's start-AP command without changing mode.
    pub async fn start_ap(&self) -> Result<()> {
        self.access_point.start().await
    }

    /// Issues the platform's stop-AP command without changing mode.
    pub async fn stop_ap(&self) -> Result<()> {
        self.access_point.stop().await
    }

    /// Scans for visible networks.
    ///
    /// While in provisioning mode a live scan often comes back empty (the
    /// hardware cannot scan with the AP up), so an empty result falls back
    /// to the preliminary scan captured before the AP started.
    pub async fn scan(&self, max_attempts: u32) -> Vec<String> {
        let live = self.scanner.scan(max_attempts).await;
        if !live.is_empty() {
            return live;
        }

        let state = self.state.lock().await;
        if state.mode == DeviceMode::Provisioning && !state.preliminary_scan.is_empty() {
            debug!("live scan empty in provisioning mode; serving pre-AP scan results");
            return state.preliminary_scan.clone();
        }
        live
    }

    /// Polls the status probe until the platform's connected token appears.
    ///
    /// Resolves as soon as the token is observed, after as few as one probe.
    /// Any other token, and any probe failure, counts as a failed attempt;
    /// attempts are separated by `interval`. The association either
    /// completes within a few seconds of a valid definition or not at all
    /// without user intervention, so the interval is fixed rather than
    /// exponential.
    ///
    /// # Errors
    ///
    /// [`ProvisionError::BootstrapExhausted`] after `max_attempts` failed
    /// probes, [`ProvisionError::Cancelled`] if cancelled during a wait.
    pub async fn wait_for_wifi(&self, max_attempts: u32, interval: Duration) -> Result<()> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.probe.status().await {
                Ok(token) if token == self.commands.connected_token => {
                    info!("wifi connection found on attempt {attempts}");
                    return Ok(());
                }
                Ok(token) => {
                    debug!("no wifi connection on attempt {attempts} (state {token})");
                }
                Err(e) => {
                    warn!("status check failed on attempt {attempts}: {e}");
                }
            }

            if attempts >= max_attempts {
                warn!("giving up; no wifi after {attempts} attempts");
                return Err(ProvisionError::BootstrapExhausted { attempts });
            }
            self.delay(interval).await?;
        }
    }

    /// The startup decision: confirm connectivity or fall back to
    /// provisioning.
    ///
    /// Waits for an existing connection within the bootstrap budget. On
    /// success the device is in station mode. On exhaustion the visible
    /// networks are scanned *first* (they are often unobtainable once the AP
    /// is up), cached, and the configuration AP is started; the device is
    /// then in provisioning mode and [`Event::ProvisioningStarted`] carries
    /// the captured scan.
    ///
    /// The bootstrap loop counts as a mode transition: it holds the same
    /// exclusion flag as [`reconfigure`](Self::reconfigure).
    ///
    /// # Errors
    ///
    /// Only a failed start-AP command, cancellation, or a transition already
    /// in flight surfaces as an error; exhaustion of the bootstrap budget is
    /// the designed fallback path, not a failure.
    pub async fn bootstrap(&self) -> Result<DeviceMode> {
        let previous = {
            let mut state = self.state.lock().await;
            if state.mode == DeviceMode::Transitioning {
                warn!("rejecting bootstrap: transition already in progress");
                return Err(ProvisionError::TransitionInProgress);
            }
            let previous = state.mode;
            state.mode = DeviceMode::Transitioning;
            previous
        };

        match self
            .wait_for_wifi(self.timings.bootstrap_attempts, self.timings.poll_interval)
            .await
        {
            Ok(()) => {
                let mut state = self.state.lock().await;
                state.mode = DeviceMode::Station;
                state.preliminary_scan.clear();
                drop(state);
                self.emit(Event::BootstrapCompleted);
                Ok(DeviceMode::Station)
            }
            Err(ProvisionError::BootstrapExhausted { .. }) => {
                info!("no wifi found; entering provisioning mode");

                // Scan now: once the AP is broadcasting, some targets cannot.
                let networks = self.scanner.scan(self.timings.scan_attempts).await;
                if let Err(e) = self.access_point.start().await {
                    self.state.lock().await.mode = previous;
                    return Err(e);
                }

                let mut state = self.state.lock().await;
                state.preliminary_scan = networks.clone();
                state.mode = DeviceMode::Provisioning;
                drop(state);
                self.emit(Event::ProvisioningStarted { networks });
                Ok(DeviceMode::Provisioning)
            }
            Err(e) => {
                self.state.lock().await.mode = previous;
                Err(e)
            }
        }
    }

    /// Applies new credentials and switches the device to station mode.
    ///
    /// The sequence, with its ordering guarantees:
    ///
    /// 1. Enter `Transitioning` (rejecting the request if a transition is
    ///    already in flight).
    /// 2. Emit [`Event::ReconfigurationAccepted`]: collaborators flush any
    ///    in-flight response now, before the interface carrying it goes
    ///    down.
    /// 3. Wait the response settle delay.
    /// 4. Stop the AP, only if the device was in provisioning mode.
    /// 5. Wait the teardown settle delay for the interface/IP to release.
    /// 6. Define the network.
    /// 7. Confirm association within the reconfiguration budget.
    ///
    /// On success the device is in station mode and the preliminary scan
    /// cache is discarded. On failure it is in provisioning mode (the safe
    /// place for the user to retry) and [`Event::ReconfigurationFailed`]
    /// fires. A failure after step 4 leaves the access point down even
    /// though the mode reads provisioning: the caller owns re-issuing
    /// [`start_ap`](Self::start_ap) on [`Event::ReconfigurationFailed`] so
    /// the user has a network to rejoin.
    ///
    /// # Errors
    ///
    /// [`ProvisionError::TransitionInProgress`] if another transition holds
    /// the device, [`ProvisionError::ReconfigurationFailed`] if the new
    /// network never associates, [`ProvisionError::CommandFailed`] from the
    /// underlying commands, or [`ProvisionError::Cancelled`].
    pub async fn reconfigure(&self, creds: Credentials) -> Result<()> {
        let previous = {
            let mut state = self.state.lock().await;
            if state.mode == DeviceMode::Transitioning {
                warn!("rejecting reconfiguration: transition already in progress");
                return Err(ProvisionError::TransitionInProgress);
            }
            let previous = state.mode;
            state.mode = DeviceMode::Transitioning;
            previous
        };

        info!("reconfiguring to network '{}'", creds.ssid());
        let result = self.run_reconfiguration(&creds, previous).await;

        let mut state = self.state.lock().await;
        match &result {
            Ok(()) => {
                state.mode = DeviceMode::Station;
                state.preliminary_scan.clear();
                drop(state);
                self.emit(Event::ReconfigurationCompleted {
                    ssid: creds.ssid().to_string(),
                });
            }
            Err(ProvisionError::Cancelled) => {
                // Cancellation is an abort, not a verdict on the credentials.
                state.mode = previous;
            }
            Err(e) => {
                warn!("reconfiguration to '{}' failed: {e}", creds.ssid());
                state.mode = DeviceMode::Provisioning;
                drop(state);
                self.emit(Event::ReconfigurationFailed {
                    ssid: creds.ssid().to_string(),
                });
            }
        }
        result
    }

    async fn run_reconfiguration(&self, creds: &Credentials, previous: DeviceMode) -> Result<()> {
        self.emit(Event::ReconfigurationAccepted {
            ssid: creds.ssid().to_string(),
        });

        // Let the acknowledgement leave before disrupting connectivity.
        self.delay(self.timings.response_settle).await?;

        if previous == DeviceMode::Provisioning {
            self.access_point.stop().await?;
        }

        // The interface holds its AP address for a while after teardown;
        // defining the network too early makes it come up slowly or not at
        // all.
        self.delay(self.timings.teardown_settle).await?;

        self.definer.define(creds).await?;

        self.wait_for_wifi(self.timings.reconfigure_attempts, self.timings.poll_interval)
            .await
            .map_err(|e| match e {
                ProvisionError::BootstrapExhausted { .. } => {
                    ProvisionError::ReconfigurationFailed {
                        ssid: creds.ssid().to_string(),
                    }
                }
                other => other,
            })
    }

    /// A cancellable fixed delay; every suspension point goes through here.
    async fn delay(&self, duration: Duration) -> Result<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(ProvisionError::Cancelled),
            _ = time::sleep(duration) => Ok(()),
        }
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.events
            && tx.send(event).is_err()
        {
            debug!("event receiver dropped; notification discarded");
        }
    }
}
