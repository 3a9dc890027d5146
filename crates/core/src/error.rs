//! Error taxonomy shared by the monitor crates

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while bootstrapping or handling a file event
///
/// Only [`MonitorError::Config`] is fatal, and only at startup. Everything
/// else is logged by the dispatcher and the watch loop keeps running.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Missing hot dir, unreadable sidecar, uncreatable backup dir
    #[error("configuration error: {0}")]
    Config(String),

    /// Directories, symlinks and special files are never backed up
    #[error("{} is not a regular file", .0.display())]
    NotRegularFile(PathBuf),

    /// Copy, remove or log-write failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed timestamp embedded in a delete marker
    #[error("invalid timestamp '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Notification backend failure
    #[error("watch error: {0}")]
    Watch(String),
}

impl MonitorError {
    /// Wrap an I/O error with a short description of what was being done
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// True when the underlying cause is a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
