//! File-backed, append-only history log

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Local};
use ff_core::{HistorySink, MonitorError, Operation};
use parking_lot::Mutex;
use regex::Regex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::record::HistoryRecord;
use crate::Result;

/// Default directory holding the history file
pub const DEFAULT_LOG_DIR: &str = ".logs";

/// Name of the history file inside the log directory
pub const LOG_FILENAME: &str = "log.txt";

/// Append-only history log
///
/// Every append and every read happens under one mutex, so the file order is
/// a linearization of all `append` calls and readers never see half a line.
pub struct HistoryLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl HistoryLog {
    /// Open or create the history file inside `log_dir`
    pub fn open(log_dir: &Path) -> Result<Self> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log dir {}", log_dir.display()))?;

        let path = log_dir.join(LOG_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open history file {}", path.display()))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Location of the history file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record
    pub fn append(
        &self,
        timestamp: DateTime<FixedOffset>,
        path: &Path,
        operation: Operation,
    ) -> io::Result<()> {
        let record = HistoryRecord::new(timestamp, path.display().to_string(), operation);
        let line = format!("{record}\n");

        let mut file = self.file.lock();
        file.write_all(line.as_bytes())
    }

    /// Entire history as text
    pub fn dump_all(&self) -> Result<String> {
        let _guard = self.file.lock();
        self.read_locked()
    }

    /// All records that parse; malformed lines are skipped
    pub fn records(&self) -> Result<Vec<HistoryRecord>> {
        let text = self.dump_all()?;
        Ok(parse_records(&text))
    }

    /// Lines whose record satisfies `predicate`, in log order
    pub fn filter<F>(&self, predicate: F) -> Result<String>
    where
        F: Fn(&HistoryRecord) -> bool,
    {
        let text = self.dump_all()?;
        let mut out = String::new();
        for line in text.lines() {
            match HistoryRecord::parse_line(line) {
                Ok(record) if predicate(&record) => {
                    out.push_str(line);
                    out.push('\n');
                }
                Ok(_) => {}
                Err(e) => debug!("Skipping history line: {}", e),
            }
        }
        Ok(out)
    }

    /// Lines whose path matches the regular expression `pattern`
    pub fn filter_by_name(&self, pattern: &str) -> Result<String> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid filename pattern: {pattern}"))?;
        self.filter(|record| regex.is_match(&record.path))
    }

    /// Lines stamped within `[from, to]`, both ends inclusive
    pub fn filter_by_date_range(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<String> {
        self.filter(|record| record.timestamp >= from && record.timestamp <= to)
    }

    fn read_locked(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read history file {}", self.path.display())),
        }
    }
}

impl HistorySink for HistoryLog {
    fn record(&self, path: &Path, operation: Operation) -> ff_core::Result<()> {
        self.append(Local::now().into(), path, operation)
            .map_err(|e| MonitorError::io(format!("failed to append to {}", self.path.display()), e))
    }
}

fn parse_records(text: &str) -> Vec<HistoryRecord> {
    text.lines()
        .filter_map(|line| match HistoryRecord::parse_line(line) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping history line: {}", e);
                None
            }
        })
        .collect()
}
