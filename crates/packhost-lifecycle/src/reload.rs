//! Debounced host reload scheduling
//!
//! Any number of lifecycle operations completing within the debounce window
//! coalesce into a single process-manager reload. Arming while a reload is
//! already pending cancels and restarts the timer (the window extends, it
//! never stacks). The pending slot is cleared before the reload is invoked,
//! so there is never more than one live timer and a late `arm()` starts a
//! fresh cycle instead of aborting an in-flight reload.

use crate::process::ProcessManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default debounce window between the last operation and the reload
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(3000);

/// One scheduled timer; the generation ties the task to its slot entry so a
/// stale task cannot clear a successor's handle.
struct PendingReload {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Coalesces reload requests behind a single debounce timer
///
/// One instance is shared (via `Arc`) by every lifecycle operation; the
/// pending timer handle is the only intentionally shared mutable state in
/// the subsystem.
pub struct ReloadScheduler {
    process: Arc<dyn ProcessManager>,
    app_name: Option<String>,
    window: Duration,
    pending: Arc<Mutex<Option<PendingReload>>>,
    generation: AtomicU64,
}

impl ReloadScheduler {
    /// Create a scheduler with the default 3000 ms window
    pub fn new(process: Arc<dyn ProcessManager>, app_name: Option<String>) -> Self {
        Self::with_window(process, app_name, DEFAULT_DEBOUNCE)
    }

    /// Create a scheduler with an explicit debounce window
    pub fn with_window(
        process: Arc<dyn ProcessManager>,
        app_name: Option<String>,
        window: Duration,
    ) -> Self {
        Self {
            process,
            app_name,
            window,
            pending: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
        }
    }

    /// Request a host reload after the debounce window
    ///
    /// If a reload is already pending the timer restarts; N operations
    /// within one window produce exactly one reload.
    pub async fn arm(&self) {
        let mut pending = self.pending.lock().await;

        if let Some(prior) = pending.take() {
            debug!("Reload already pending, extending debounce window");
            prior.handle.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let process = Arc::clone(&self.process);
        let app_name = self.app_name.clone();
        let window = self.window;
        let slot = Arc::clone(&self.pending);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;

            // Clear the slot first so an arm() racing with the fire starts a
            // new cycle rather than aborting this reload mid-flight. Only
            // this timer's own entry is cleared: a racing arm() or flush()
            // may have replaced or taken it already.
            {
                let mut slot = slot.lock().await;
                if slot.as_ref().is_some_and(|p| p.generation == generation) {
                    *slot = None;
                }
            }

            let outcome = process.reload(app_name.as_deref()).await;
            if outcome.success {
                info!("Host process reloaded: {}", outcome.message);
            } else {
                // Non-fatal: extensions are already on disk, the process
                // just needs a manual bump.
                warn!("Host process reload failed: {}", outcome.message);
            }
        });

        *pending = Some(PendingReload { generation, handle });
    }

    /// Whether a reload is currently pending
    pub async fn is_pending(&self) -> bool {
        self.pending.lock().await.is_some()
    }

    /// Wait for a pending reload, if any, to fire and complete
    ///
    /// Used by short-lived callers that would otherwise exit before the
    /// debounce window elapses.
    pub async fn flush(&self) {
        let pending = self.pending.lock().await.take();
        if let Some(pending) = pending {
            let _ = pending.handle.await;
        }
    }
}
