use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{retries, timeouts};

/// The connectivity mode a device is in.
///
/// Exactly one mode holds at any time. `Transitioning` is never a steady
/// state: it exists only while a mode change is in flight, and doubles as the
/// mutual-exclusion flag that keeps two transitions from interleaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceMode {
    /// Attached (or attaching) to an existing network as a wireless client.
    Station,
    /// Broadcasting the local configuration access point.
    Provisioning,
    /// A mode switch is in flight; further transitions are rejected.
    Transitioning,
}

impl Display for DeviceMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Station => write!(f, "station"),
            Self::Provisioning => write!(f, "provisioning"),
            Self::Transitioning => write!(f, "transitioning"),
        }
    }
}

/// Credentials for a network the user wants the device to join.
///
/// Construct with [`Credentials::new`], which trims user input and rejects
/// an empty SSID. An absent (or all-whitespace) passphrase selects the
/// open-network definition path. Deserialization goes through the same
/// validation, so form input decoded straight into `Credentials` cannot
/// carry an untrimmed or empty SSID. The type is deliberately not
/// serializable: nothing should write a passphrase back out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawCredentials")]
pub struct Credentials {
    ssid: String,
    passphrase: Option<String>,
}

/// Wire shape for [`Credentials`] before validation.
#[derive(Deserialize)]
struct RawCredentials {
    ssid: String,
    passphrase: Option<String>,
}

impl TryFrom<RawCredentials> for Credentials {
    type Error = ProvisionError;

    fn try_from(raw: RawCredentials) -> crate::Result<Self> {
        Credentials::new(&raw.ssid, raw.passphrase.as_deref())
    }
}

impl Credentials {
    /// Builds credentials from raw user input.
    ///
    /// Leading and trailing whitespace is stripped from both fields, as
    /// web-form input routinely carries it.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::EmptySsid`] if the SSID is empty after
    /// trimming.
    pub fn new(ssid: &str, passphrase: Option<&str>) -> crate::Result<Self> {
        let ssid = ssid.trim();
        if ssid.is_empty() {
            return Err(ProvisionError::EmptySsid);
        }
        let passphrase = passphrase
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from);
        Ok(Self {
            ssid: ssid.to_string(),
            passphrase,
        })
    }

    /// The network name.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// The passphrase, if the network is secured.
    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }

    /// Whether these credentials select the open-network path.
    pub fn is_open(&self) -> bool {
        self.passphrase.is_none()
    }
}

/// One-way notifications emitted by the orchestrator.
///
/// Delivered on an unbounded channel; the orchestrator never waits for a
/// receiver, and a dropped receiver is logged and ignored. Collaborators use
/// these to drive user feedback (a setup page, an audio prompt) and to learn
/// when it is safe, or urgent, to act.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// The bootstrap check found a working connection; the device is in
    /// station mode.
    BootstrapCompleted,
    /// The bootstrap check gave up; the configuration access point is up and
    /// the device is in provisioning mode. Carries the pre-AP scan results.
    ProvisioningStarted { networks: Vec<String> },
    /// A reconfiguration request was accepted. Emitted before anything
    /// disruptive happens: a collaborator holding an in-flight HTTP response
    /// must flush it on this event, because the interface it travels over is
    /// about to go down.
    ReconfigurationAccepted { ssid: String },
    /// The new network associated; the device is back in station mode.
    ReconfigurationCompleted { ssid: String },
    /// The new network never associated (bad passphrase, out of range); the
    /// device returned to provisioning mode so the user can retry.
    ReconfigurationFailed { ssid: String },
}

/// Delays and attempt budgets used by the orchestrator.
///
/// The defaults are empirically tuned for the supported hardware targets;
/// override them only with new measurements in hand.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use wifi_provision::Timings;
///
/// // Defaults (3 s polling, 2 s / 5 s settle delays)
/// let timings = Timings::default();
///
/// // A target with a slower supplicant
/// let timings_slow = Timings {
///     teardown_settle: Duration::from_secs(8),
///     ..Timings::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Timings {
    /// Interval between connection-status probes.
    pub poll_interval: Duration,
    /// Wait between failed scan attempts.
    pub scan_retry_delay: Duration,
    /// Wait after acknowledging a reconfiguration, before any disruption.
    pub response_settle: Duration,
    /// Wait after stopping the access point, before defining the network.
    pub teardown_settle: Duration,
    /// Status probes allowed during the startup bootstrap check.
    pub bootstrap_attempts: u32,
    /// Status probes allowed while confirming a newly defined network.
    pub reconfigure_attempts: u32,
    /// Scan attempts allowed when capturing the pre-AP scan.
    pub scan_attempts: u32,
}

impl Default for Timings {
    /// Returns the measured defaults.
    ///
    /// - `poll_interval`: 3 s
    /// - `scan_retry_delay`: 3 s
    /// - `response_settle`: 2 s
    /// - `teardown_settle`: 5 s
    /// - `bootstrap_attempts`: 10
    /// - `reconfigure_attempts`: 20
    /// - `scan_attempts`: 10
    fn default() -> Self {
        Self {
            poll_interval: timeouts::poll_interval(),
            scan_retry_delay: timeouts::scan_retry_delay(),
            response_settle: timeouts::response_settle(),
            teardown_settle: timeouts::teardown_settle(),
            bootstrap_attempts: retries::BOOTSTRAP_MAX_ATTEMPTS,
            reconfigure_attempts: retries::RECONFIGURE_MAX_ATTEMPTS,
            scan_attempts: retries::SCAN_MAX_ATTEMPTS,
        }
    }
}

/// Errors returned by provisioning operations.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The child process could not be spawned or its output collected.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A shell command exited non-zero or wrote to its error stream.
    ///
    /// Output on stderr counts as failure even with a zero exit status;
    /// several of the underlying network tools emit diagnostics there that
    /// historically correlated with partial failure.
    #[error("command failed: `{command}`: {detail}")]
    CommandFailed { command: String, detail: String },

    /// The SSID was empty after trimming.
    #[error("SSID must not be empty")]
    EmptySsid,

    /// The bootstrap check exhausted its attempt budget without observing a
    /// connection. Not fatal: this is the designed trigger for entering
    /// provisioning mode.
    #[error("no wifi connection after {attempts} attempts")]
    BootstrapExhausted { attempts: u32 },

    /// A newly defined network failed to associate within its attempt
    /// budget. The device returns to provisioning mode so the user can retry
    /// with corrected credentials.
    #[error("network '{ssid}' did not come up after reconfiguration")]
    ReconfigurationFailed { ssid: String },

    /// A mode transition was already in flight; the request was rejected
    /// rather than interleaved.
    #[error("another mode transition is in progress")]
    TransitionInProgress,

    /// The operation was cancelled at a suspension point.
    #[error("operation cancelled")]
    Cancelled,
}
