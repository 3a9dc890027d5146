//! Explicitly constructed state shared by the dispatcher and its timers

use ff_core::{BackupDir, HistorySink, Result, WatchTarget};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::scheduler::DeleteScheduler;

/// Everything event handling needs, built once per monitor
pub struct MonitorContext {
    /// Where observed and performed actions are recorded
    pub history: Arc<dyn HistorySink>,
    /// Backup directory of the watch target
    pub backups: Arc<BackupDir>,
    /// Pending scheduled deletions
    pub scheduler: DeleteScheduler,
}

impl MonitorContext {
    /// Build the context for `target`; timers stop when `shutdown` is cancelled
    pub fn new(
        target: &WatchTarget,
        history: Arc<dyn HistorySink>,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        let backups = Arc::new(BackupDir::new(target.backup_dir(), history.clone()));
        let scheduler = DeleteScheduler::new(backups.clone(), shutdown)?;
        Ok(Self {
            history,
            backups,
            scheduler,
        })
    }
}
