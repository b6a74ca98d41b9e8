//! Shell command execution.
//!
//! Every network primitive in this crate is a shell command template run
//! through a [`CommandRunner`]. The trait seam exists so tests can substitute
//! a scripted runner and so alternative transports remain possible without
//! touching the components above it.

use async_trait::async_trait;
use log::debug;
use std::process::Stdio;
use tokio::process::Command;

use crate::Result;
use crate::models::ProvisionError;

/// Executes a platform shell command and normalizes success/failure.
///
/// User-supplied values (SSID, passphrase) reach commands exclusively through
/// the `env` bindings, never spliced into the command text, so a hostile
/// network name cannot become shell syntax.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `command` through the shell with the given extra environment
    /// bindings and returns trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::CommandFailed`] if the process exits
    /// non-zero **or** writes any bytes to stderr, and
    /// [`ProvisionError::Io`] if it cannot be spawned.
    async fn run(&self, command: &str, env: &[(&str, &str)]) -> Result<String>;
}

/// The production [`CommandRunner`]: spawns `sh -c <command>`.
///
/// Exactly one child process per call; no retry at this layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, env: &[(&str, &str)]) -> Result<String> {
        debug!("running command: {command}");

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).stdin(Stdio::null());
        for (key, value) in env {
            cmd.env(key, value);
        }

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProvisionError::CommandFailed {
                command: command.to_string(),
                detail: format!("exit status {}: {}", output.status, stderr.trim()),
            });
        }

        // Some of the underlying tools exit zero but still report problems on
        // stderr; treat any error output as failure.
        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProvisionError::CommandFailed {
                command: command.to_string(),
                detail: format!("output to stderr: {}", stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stdout_is_trimmed() {
        let out = ShellRunner::new()
            .run("printf '  COMPLETED\\n'", &[])
            .await
            .unwrap();
        assert_eq!(out, "COMPLETED");
    }

    #[tokio::test]
    async fn nonzero_exit_fails() {
        let err = ShellRunner::new().run("exit 3", &[]).await.unwrap_err();
        assert!(matches!(err, ProvisionError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn stderr_output_fails_even_on_zero_exit() {
        let err = ShellRunner::new()
            .run("echo chatter >&2", &[])
            .await
            .unwrap_err();
        match err {
            ProvisionError::CommandFailed { detail, .. } => {
                assert!(detail.contains("chatter"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn env_bindings_reach_the_command() {
        let out = ShellRunner::new()
            .run("printf '%s' \"$SSID\"", &[("SSID", "Cafe; rm -rf /")])
            .await
            .unwrap();
        assert_eq!(out, "Cafe; rm -rf /");
    }
}
