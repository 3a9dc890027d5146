//! Operation names and the sink every component records into

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::Result;

/// Operation column of a history line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// File observed being created
    Create,
    /// File observed being written
    Write,
    /// File observed being renamed away
    Rename,
    /// File observed being removed
    Remove,
    /// Backup copy written
    Backup,
    /// Original and backup removed by a delete marker
    BackupDelete,
}

impl Operation {
    /// Name as written to the log file
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Write => "WRITE",
            Operation::Rename => "RENAME",
            Operation::Remove => "REMOVE",
            Operation::Backup => "BACKUP",
            Operation::BackupDelete => "BACKUP_DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(Operation::Create),
            "WRITE" => Ok(Operation::Write),
            "RENAME" => Ok(Operation::Rename),
            "REMOVE" => Ok(Operation::Remove),
            "BACKUP" => Ok(Operation::Backup),
            "BACKUP_DELETE" => Ok(Operation::BackupDelete),
            other => Err(format!("unknown operation: {other}")),
        }
    }
}

/// Destination for history records
///
/// Implementations must serialize concurrent callers so records never
/// interleave. The journal crate provides the file-backed implementation.
pub trait HistorySink: Send + Sync {
    /// Append one record stamped with the current time
    fn record(&self, path: &Path, operation: Operation) -> Result<()>;
}
