//! Filefilter Core - naming rules, backup storage and bootstrap for the monitor
//!
//! This crate provides the leaf pieces of the backup monitor:
//! - Basename classification (swap files, delete markers)
//! - Backup copies and the delete-both action
//! - Watch target bootstrap and the sidecar config file
//! - The history sink seam used to record every action

pub mod backup;
pub mod config;
pub mod error;
pub mod history;
pub mod naming;

// Re-export main types for convenience
pub use backup::BackupDir;
pub use config::{verify_config, WatchTarget};
pub use error::MonitorError;
pub use history::{HistorySink, Operation};
pub use naming::{classify, NameClass};

/// Common result type used throughout ff-core
pub type Result<T> = std::result::Result<T, MonitorError>;
