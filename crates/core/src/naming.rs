//! Basename classification for the hot directory
//!
//! Users drive the monitor through file names:
//! - `<name>.swp` is editor noise and is ignored entirely
//! - `delete_<timestamp>_<name>` schedules deletion of itself and `<name>.bak`
//! - `delete_<name>` (no timestamp) is deleted right away, with `<name>.bak`
//! - everything else is mirrored into the backup directory as `<name>.bak`

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::ffi::{OsStr, OsString};
use std::sync::OnceLock;

use crate::{MonitorError, Result};

/// Prefix marking a file for deletion
pub const DELETE_PREFIX: &str = "delete_";

/// Suffix of editor swap files
pub const SWAP_SUFFIX: &str = ".swp";

/// Suffix appended to every backup copy
pub const BACKUP_SUFFIX: &str = ".bak";

/// Timestamp layout used in delete markers and history lines (`2006-01-02T15:04:05-0700`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

fn scheduled_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Names may contain newlines
        Regex::new(r"(?s)^delete_(\d{4}-[01]?\d-[0-3]?\dT[0-2]\d:[0-5]\d:[0-5]\d[+-]\d{4})_(.*)$")
            .expect("scheduled delete pattern is valid")
    })
}

/// What a basename asks the monitor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameClass<'a> {
    /// Editor swap file, never logged or copied
    Swap,
    /// `delete_<timestamp>_<rest>`
    Scheduled {
        /// Raw timestamp segment, not yet validated
        timestamp: &'a str,
        /// Name of the file whose backup goes away with it
        rest: &'a str,
    },
    /// `delete_<rest>` without a recognizable timestamp
    Marked {
        /// Name of the file whose backup goes away with it
        rest: &'a str,
    },
    /// Ordinary file, backed up on every change
    Plain,
}

/// Classify a bare file name (no directory components)
///
/// Names that are not valid UTF-8 are classified through
/// [`OsStr::to_string_lossy`]; the swap suffix and the marker prefix are
/// ASCII, so the replacement characters never change the outcome.
pub fn classify(basename: &str) -> NameClass<'_> {
    if basename.ends_with(SWAP_SUFFIX) {
        return NameClass::Swap;
    }

    let Some(stripped) = basename.strip_prefix(DELETE_PREFIX) else {
        return NameClass::Plain;
    };

    if let Some(caps) = scheduled_pattern().captures(basename) {
        if let (Some(timestamp), Some(rest)) = (caps.get(1), caps.get(2)) {
            return NameClass::Scheduled {
                timestamp: timestamp.as_str(),
                rest: rest.as_str(),
            };
        }
    }

    NameClass::Marked { rest: stripped }
}

/// Parse the timestamp segment of a delete marker
///
/// The offset is mandatory and numeric (`+0000`, `-0700`).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|source| MonitorError::Parse {
        input: raw.to_string(),
        source,
    })
}

/// The part of `name` that `rest` refers to, byte for byte
///
/// `rest` must be a suffix of `name.to_string_lossy()` as returned by
/// [`classify`]. Everything in front of it is the ASCII marker, so the same
/// byte offset splits the raw name.
pub fn marked_target(name: &OsStr, rest: &str) -> OsString {
    if let Some(name) = name.to_str() {
        return OsString::from(&name[name.len() - rest.len()..]);
    }
    raw_tail(name, name.to_string_lossy().len() - rest.len())
}

#[cfg(unix)]
fn raw_tail(name: &OsStr, offset: usize) -> OsString {
    use std::os::unix::ffi::OsStrExt;

    OsStr::from_bytes(&name.as_bytes()[offset..]).to_os_string()
}

#[cfg(not(unix))]
fn raw_tail(name: &OsStr, offset: usize) -> OsString {
    OsString::from(&name.to_string_lossy()[offset..])
}
