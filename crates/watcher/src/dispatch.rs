//! Per-event classification and routing
//!
//! | kind                   | plain name      | `delete_` name        |
//! |------------------------|-----------------|-----------------------|
//! | Create, Write          | record + backup | schedule / delete now |
//! | Rename (vanished name) | record only     | record, cancel timer  |
//! | Remove                 | record          | record, cancel timer  |
//!
//! Swap files are dropped before any of this. No branch touches a backup on
//! `Remove`; backups only go away through the delete marker.

use chrono::{DateTime, FixedOffset};
use ff_core::naming::{classify, marked_target, NameClass};
use ff_core::{MonitorError, Operation};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::MonitorContext;
use crate::scheduler::ScheduleOutcome;
use crate::{EventKind, FileEvent};

/// What handling one event amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Swap file or path without a file name, nothing recorded
    Ignored,
    /// History record written, no file touched
    Recorded,
    /// Backup copy written to this path
    BackedUp(PathBuf),
    /// Deletion pending until this instant
    Scheduled(DateTime<FixedOffset>),
    /// Original and this backup removed
    Deleted(PathBuf),
    /// Directory, symlink or special file; not backed up
    Skipped,
    /// Action failed and was logged
    Failed,
}

/// Routes file events to the backup copier and the delete scheduler
pub struct Dispatcher {
    ctx: Arc<MonitorContext>,
}

impl Dispatcher {
    /// Create a dispatcher over a shared context
    pub fn new(ctx: Arc<MonitorContext>) -> Self {
        Self { ctx }
    }

    /// Shared context
    pub fn context(&self) -> &MonitorContext {
        &self.ctx
    }

    /// Handle one event. Never fails; errors are logged and reported as
    /// [`Dispatch::Failed`].
    pub fn handle(&self, event: &FileEvent) -> Dispatch {
        let Some(file_name) = event.path.file_name() else {
            debug!("Ignoring event without a file name: {:?}", event);
            return Dispatch::Ignored;
        };

        let name = file_name.to_string_lossy();
        let class = classify(&name);
        match (event.kind, class) {
            (_, NameClass::Swap) => Dispatch::Ignored,

            (EventKind::Create | EventKind::Write | EventKind::Rename, NameClass::Plain) => {
                self.record(&event.path, event.kind.operation());
                // The old half of a rename no longer exists under this name
                if event.kind == EventKind::Rename {
                    return Dispatch::Recorded;
                }
                self.backup(&event.path)
            }

            (EventKind::Rename | EventKind::Remove, _) => {
                self.record(&event.path, event.kind.operation());
                if self.ctx.scheduler.cancel(&event.path) {
                    info!("Cancelled scheduled delete of {}", event.path.display());
                }
                Dispatch::Recorded
            }

            (EventKind::Create | EventKind::Write, NameClass::Scheduled { timestamp, rest }) => {
                let target = marked_target(file_name, rest);
                match self.ctx.scheduler.schedule(&event.path, timestamp, &target) {
                    Ok(ScheduleOutcome::Deleted(backup)) => Dispatch::Deleted(backup),
                    Ok(ScheduleOutcome::Scheduled(at) | ScheduleOutcome::AlreadyScheduled(at)) => {
                        Dispatch::Scheduled(at)
                    }
                    Err(e) => self.failed(&event.path, e),
                }
            }

            (EventKind::Create | EventKind::Write, NameClass::Marked { rest }) => {
                let target = marked_target(file_name, rest);
                match self.ctx.scheduler.delete_now(&event.path, &target) {
                    Ok(backup) => Dispatch::Deleted(backup),
                    Err(e) => self.failed(&event.path, e),
                }
            }
        }
    }

    fn backup(&self, path: &Path) -> Dispatch {
        match self.ctx.backups.copy(path) {
            Ok(dest) => Dispatch::BackedUp(dest),
            Err(MonitorError::NotRegularFile(_)) => {
                debug!("Skipping backup of {}: not a regular file", path.display());
                Dispatch::Skipped
            }
            Err(e) => self.failed(path, e),
        }
    }

    fn record(&self, path: &Path, operation: Operation) {
        if let Err(e) = self.ctx.history.record(path, operation) {
            warn!("Could not record {} for {}: {}", operation, path.display(), e);
        }
    }

    fn failed(&self, path: &Path, error: MonitorError) -> Dispatch {
        warn!("Handling {} failed: {}", path.display(), error);
        Dispatch::Failed
    }
}
