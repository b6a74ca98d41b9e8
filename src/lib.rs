//! Connectivity bootstrap and provisioning-mode orchestration for headless
//! Linux devices.
//!
//! A device with no display has no way to ask for Wi-Fi credentials, so first
//! boot (and any later loss of connectivity) follows a fixed sequence: probe
//! for a working connection, give up after a bounded number of attempts,
//! capture a scan of nearby networks while that is still possible, then bring
//! up a local access point the user can join to submit credentials. Once new
//! credentials arrive, the access point is torn down, the network is defined
//! with the platform's supplicant, and the device confirms it has associated
//! before declaring itself back in station mode.
//!
//! This crate provides that orchestration:
//!
//! - Probing connection status and the currently associated SSID
//! - Scanning for visible networks with bounded retry
//! - Starting/stopping the local configuration access point
//! - Persisting open or passphrase-protected network definitions
//! - The [`Orchestrator`] state machine that sequences all of the above with
//!   the settle delays flaky network stacks require
//!
//! # Example
//!
//! ```no_run
//! use wifi_provision::Orchestrator;
//!
//! # async fn example() -> wifi_provision::Result<()> {
//! let orchestrator = Orchestrator::detect().await;
//!
//! // Either confirms an existing connection or falls back to
//! // broadcasting the configuration access point.
//! let mode = orchestrator.bootstrap().await?;
//! println!("device is now in {mode} mode");
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, ProvisionError>`. Shell command failures,
//! exhausted attempt budgets, and rejected concurrent transitions each have
//! their own variant. Nothing in this crate is fatal to the process: the
//! worst outcome is remaining in provisioning mode, which is the intended
//! safe fallback.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade. To see log
//! output, add a logging implementation like `env_logger`:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

mod constants;

// Public API modules
pub mod access_point;
pub mod command;
pub mod definer;
pub mod models;
pub mod orchestrator;
pub mod platform;
pub mod scan;
pub mod status;

// Re-exported public API
pub use access_point::AccessPointController;
pub use command::{CommandRunner, ShellRunner};
pub use definer::NetworkDefiner;
pub use models::{Credentials, DeviceMode, Event, ProvisionError, Timings};
pub use orchestrator::Orchestrator;
pub use platform::{Platform, PlatformCommandSet};
pub use scan::Scanner;
pub use status::StatusProbe;

/// A specialized `Result` type for provisioning operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;
