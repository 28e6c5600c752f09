//! Host process manager boundary
//!
//! The lifecycle subsystem never restarts the host itself; it asks an
//! external process manager for a zero/low-downtime reload. Reload failure
//! is non-fatal everywhere: the package is already installed on disk, only
//! the live process needs a manual bump.

use async_trait::async_trait;
use packhost_core::types::ReloadOutcome;
use tokio::process::Command;
use tracing::debug;

/// Control API of the external host process manager
#[async_trait]
pub trait ProcessManager: Send + Sync {
    /// Request a reload of the host process
    ///
    /// Never returns an error; failures are reported through the outcome so
    /// callers treat them uniformly as non-fatal.
    async fn reload(&self, app_name: Option<&str>) -> ReloadOutcome;

    /// Whether the process manager is reachable at all
    fn is_available(&self) -> bool;
}

/// Process manager shelling out to a pm2-style control binary
pub struct CommandProcessManager {
    binary: String,
}

impl CommandProcessManager {
    /// Create a manager driving the given control binary (e.g. "pm2")
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl ProcessManager for CommandProcessManager {
    async fn reload(&self, app_name: Option<&str>) -> ReloadOutcome {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("reload");
        cmd.arg(app_name.unwrap_or("all"));

        debug!("Requesting host reload via {} ({:?})", self.binary, app_name);

        match cmd.output().await {
            Ok(output) if output.status.success() => ReloadOutcome {
                success: true,
                message: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            },
            Ok(output) => ReloadOutcome {
                success: false,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            Err(e) => ReloadOutcome {
                success: false,
                message: format!("failed to invoke {}: {}", self.binary, e),
            },
        }
    }

    fn is_available(&self) -> bool {
        which_in_path(&self.binary)
    }
}

fn which_in_path(binary: &str) -> bool {
    let Ok(path_var) = std::env::var("PATH") else {
        return false;
    };

    std::env::split_paths(&path_var).any(|dir| dir.join(binary).is_file())
}
