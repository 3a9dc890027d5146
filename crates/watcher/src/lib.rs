//! File system watching for the backup monitor
//!
//! This crate turns change notifications for one hot directory into backup
//! copies, history records and scheduled deletions:
//! - Translation of `notify` events into [`FileEvent`]s
//! - Per-event classification and routing ([`Dispatcher`])
//! - Timer-based deferred deletes ([`DeleteScheduler`])
//! - The long-lived watch loop ([`Monitor`])

pub mod context;
pub mod dispatch;
pub mod monitor;
pub mod scheduler;
pub mod translate;

pub use context::MonitorContext;
pub use dispatch::{Dispatch, Dispatcher};
pub use monitor::{Monitor, MonitorHandle};
pub use scheduler::{DeleteScheduler, ScheduleOutcome};

use ff_core::Operation;
use std::path::PathBuf;

/// File system event, consumed exactly once by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Path that changed
    pub path: PathBuf,
    /// Type of change
    pub kind: EventKind,
}

impl FileEvent {
    /// Create a new event
    pub fn new(path: impl Into<PathBuf>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Type of file system event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// File created, or renamed into place
    Create,
    /// File contents modified
    Write,
    /// File renamed away; the path no longer exists
    Rename,
    /// File deleted
    Remove,
}

impl EventKind {
    /// History operation recorded for an observed event of this kind
    pub fn operation(self) -> Operation {
        match self {
            EventKind::Create => Operation::Create,
            EventKind::Write => Operation::Write,
            EventKind::Rename => Operation::Rename,
            EventKind::Remove => Operation::Remove,
        }
    }
}
