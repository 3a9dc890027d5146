//! History record data structure and line format

use anyhow::{anyhow, Context};
use chrono::{DateTime, FixedOffset};
use ff_core::naming::{parse_timestamp, TIMESTAMP_FORMAT};
use ff_core::Operation;
use std::fmt;

use crate::Result;

/// One immutable history entry
///
/// Serialized as `<timestamp> <path> <OPERATION>`. The path may contain
/// spaces; the timestamp and operation never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    /// When the action happened, with the local offset at that time
    pub timestamp: DateTime<FixedOffset>,
    /// Path the action concerned
    pub path: String,
    /// What happened
    pub operation: Operation,
}

impl HistoryRecord {
    /// Create a new record
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        path: impl Into<String>,
        operation: Operation,
    ) -> Self {
        Self {
            timestamp,
            path: path.into(),
            operation,
        }
    }

    /// Parse one log line (without the trailing newline)
    pub fn parse_line(line: &str) -> Result<Self> {
        let (timestamp, rest) = line
            .split_once(' ')
            .ok_or_else(|| anyhow!("malformed history line: {line:?}"))?;
        let (path, operation) = rest
            .rsplit_once(' ')
            .ok_or_else(|| anyhow!("malformed history line: {line:?}"))?;

        let timestamp = parse_timestamp(timestamp)
            .with_context(|| format!("bad timestamp in history line: {line:?}"))?;
        let operation = operation
            .parse::<Operation>()
            .map_err(|e| anyhow!("{e} in history line: {line:?}"))?;

        Ok(Self::new(timestamp, path, operation))
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.path,
            self.operation
        )
    }
}
