//! Append-only history of everything the monitor observed or did
//!
//! This crate provides:
//! - History records and their one-line text format
//! - A mutex-guarded, file-backed log implementing `HistorySink`
//! - Predicate filtering (by path pattern, by time range)

pub mod history;
pub mod record;

// Re-exports
pub use history::HistoryLog;
pub use record::HistoryRecord;

/// Result type for journal queries
pub type Result<T> = anyhow::Result<T>;
