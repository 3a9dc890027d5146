//! Deferred delete scheduler
//!
//! Each future deletion gets its own task sleeping until the embedded
//! instant, with a child cancellation token of the monitor's shutdown token.
//! Pending deletions live only in memory and do not survive a restart.

use chrono::{DateTime, FixedOffset, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ff_core::naming::parse_timestamp;
use ff_core::{BackupDir, MonitorError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Longest single sleep; the deadline is re-checked against the wall clock
/// after each one
const MAX_SLEEP: Duration = Duration::from_secs(60 * 60);

/// What `schedule` did with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Instant already passed; both files removed, backup path returned
    Deleted(PathBuf),
    /// Timer started for this instant
    Scheduled(DateTime<FixedOffset>),
    /// A timer for this path is already running
    AlreadyScheduled(DateTime<FixedOffset>),
}

struct Pending {
    id: u64,
    at: DateTime<FixedOffset>,
    token: CancellationToken,
}

/// Owns one timer per scheduled deletion
pub struct DeleteScheduler {
    backups: Arc<BackupDir>,
    pending: Arc<DashMap<PathBuf, Pending>>,
    next_id: AtomicU64,
    shutdown: CancellationToken,
    runtime: Handle,
}

impl DeleteScheduler {
    /// Create a scheduler whose timers all stop when `shutdown` is cancelled
    ///
    /// Must be called from within a tokio runtime; timers are spawned on it.
    pub fn new(backups: Arc<BackupDir>, shutdown: CancellationToken) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| MonitorError::Watch(format!("delete scheduler needs a tokio runtime: {e}")))?;
        Ok(Self {
            backups,
            pending: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
            shutdown,
            runtime,
        })
    }

    /// Schedule deletion of `path` and the backup of `target` at `timestamp`
    ///
    /// A timestamp that is not in the future deletes both files before
    /// returning. Otherwise a timer is started and the call returns at once.
    pub fn schedule(
        &self,
        path: &Path,
        timestamp: &str,
        target: impl AsRef<OsStr>,
    ) -> Result<ScheduleOutcome> {
        let at = parse_timestamp(timestamp)?;

        if at.with_timezone(&Utc) <= Utc::now() {
            return self.delete_now(path, target).map(ScheduleOutcome::Deleted);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = self.shutdown.child_token();
        match self.pending.entry(path.to_path_buf()) {
            Entry::Occupied(existing) => {
                let at = existing.get().at;
                debug!("Delete of {} already scheduled for {}", path.display(), at);
                return Ok(ScheduleOutcome::AlreadyScheduled(at));
            }
            Entry::Vacant(slot) => {
                slot.insert(Pending {
                    id,
                    at,
                    token: token.clone(),
                });
            }
        }

        info!("Scheduled delete of {} at {}", path.display(), at);

        let backups = self.backups.clone();
        let pending = self.pending.clone();
        let path = path.to_path_buf();
        let target = target.as_ref().to_os_string();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Scheduled delete of {} cancelled", path.display());
                    pending.remove_if(&path, |_, p| p.id == id);
                    return;
                }
                _ = sleep_until(at) => {}
            }

            pending.remove_if(&path, |_, p| p.id == id);
            info!("Deleting scheduled file: {}", path.display());
            match backups.delete_pair(&path, &target) {
                Ok(backup) => info!("Removed {} and {}", path.display(), backup.display()),
                Err(e) => warn!("Scheduled delete of {} failed: {}", path.display(), e),
            }
        });

        Ok(ScheduleOutcome::Scheduled(at))
    }

    /// Remove `path` and the backup of `target` right away
    pub fn delete_now(&self, path: &Path, target: impl AsRef<OsStr>) -> Result<PathBuf> {
        let backup = self.backups.delete_pair(path, target)?;
        info!("Removed {} and {}", path.display(), backup.display());
        Ok(backup)
    }

    /// Drop the pending deletion for `path`, if any
    pub fn cancel(&self, path: &Path) -> bool {
        match self.pending.remove(path) {
            Some((_, pending)) => {
                pending.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Instant a pending deletion of `path` will fire at
    pub fn pending_at(&self, path: &Path) -> Option<DateTime<FixedOffset>> {
        self.pending.get(path).map(|p| p.at)
    }

    /// Number of timers still waiting
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancel every pending deletion
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.pending.clear();
    }
}

/// Sleep until the wall clock reaches `at`
async fn sleep_until(at: DateTime<FixedOffset>) {
    loop {
        let Ok(remaining) = at.with_timezone(&Utc).signed_duration_since(Utc::now()).to_std() else {
            return;
        };
        if remaining.is_zero() {
            return;
        }
        tokio::time::sleep(remaining.min(MAX_SLEEP)).await;
    }
}
