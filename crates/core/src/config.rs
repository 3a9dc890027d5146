//! Watch target bootstrap and the sidecar config file
//!
//! The sidecar is two plain-text lines:
//! ```text
//! hotdir=<path>
//! backupdir=<path>
//! ```
//! It is rewritten in full after every successful bootstrap so a later run
//! without arguments resumes watching the same pair.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{MonitorError, Result};

/// Default sidecar location, relative to the working directory
pub const CONFIG_FILENAME: &str = ".filefilterconf";

/// Default backup directory, relative to the working directory
pub const DEFAULT_BACKUP_DIR: &str = ".backup";

const HOTDIR_KEY: &str = "hotdir=";
const BACKUPDIR_KEY: &str = "backupdir=";

/// The directory pair a monitor works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    hot_dir: PathBuf,
    backup_dir: PathBuf,
}

impl WatchTarget {
    /// Directory under observation
    pub fn hot_dir(&self) -> &Path {
        &self.hot_dir
    }

    /// Directory holding the `.bak` copies
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}

/// Contents of the sidecar file; either key may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarConfig {
    pub hot_dir: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
}

impl SidecarConfig {
    /// Read a sidecar file. Unknown lines are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| MonitorError::io(format!("could not read {}", path.display()), e))?;
        Ok(Self::parse(&contents))
    }

    fn parse(contents: &str) -> Self {
        let mut config = Self::default();
        for line in contents.lines() {
            if let Some(value) = line.strip_prefix(HOTDIR_KEY) {
                config.hot_dir = non_empty(value);
            } else if let Some(value) = line.strip_prefix(BACKUPDIR_KEY) {
                config.backup_dir = non_empty(value);
            }
        }
        config
    }

    /// Overwrite the sidecar with a watch target
    pub fn save(path: &Path, target: &WatchTarget) -> Result<()> {
        let contents = format!(
            "{HOTDIR_KEY}{}\n{BACKUPDIR_KEY}{}\n",
            target.hot_dir.display(),
            target.backup_dir.display()
        );
        fs::write(path, contents)
            .map_err(|e| MonitorError::io(format!("could not write {}", path.display()), e))
    }
}

fn non_empty(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn resolve_dirs(
    hot_dir: Option<&Path>,
    backup_dir: Option<&Path>,
    persisted: Option<SidecarConfig>,
) -> Result<(PathBuf, PathBuf)> {
    let hot_dir = match hot_dir {
        Some(dir) => dir.to_path_buf(),
        None => persisted
            .as_ref()
            .and_then(|config| config.hot_dir.clone())
            .ok_or_else(|| {
                MonitorError::Config(
                    "hot dir not provided and no previous config found; pass --hot <path>".into(),
                )
            })?,
    };

    let backup_dir = backup_dir
        .map(Path::to_path_buf)
        .or_else(|| {
            persisted
                .filter(|config| config.hot_dir.as_deref() == Some(hot_dir.as_path()))
                .and_then(|config| config.backup_dir)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));

    Ok((hot_dir, backup_dir))
}

/// Resolve, validate and persist the directories to watch
///
/// - Hot dir: explicit argument, else the persisted one, else fail
/// - Backup dir: explicit argument, else the persisted one (only when it was
///   paired with the same hot dir), else [`DEFAULT_BACKUP_DIR`]
///
/// The hot dir must exist; the backup dir is created when missing. Every
/// failure is a [`MonitorError::Config`].
pub fn verify_config(
    hot_dir: Option<&Path>,
    backup_dir: Option<&Path>,
    config_file: &Path,
) -> Result<WatchTarget> {
    let persisted = if config_file.exists() {
        match SidecarConfig::load(config_file) {
            Ok(config) => Some(config),
            Err(e) if hot_dir.is_none() => return Err(MonitorError::Config(e.to_string())),
            Err(e) => {
                warn!("Ignoring unreadable config: {}", e);
                None
            }
        }
    } else {
        None
    };

    let (hot_dir, backup_dir) = resolve_dirs(hot_dir, backup_dir, persisted)?;

    if !hot_dir.is_dir() {
        return Err(MonitorError::Config(format!(
            "hot dir {} does not exist",
            hot_dir.display()
        )));
    }

    if !backup_dir.exists() {
        fs::create_dir_all(&backup_dir).map_err(|e| {
            MonitorError::Config(format!(
                "could not create backup dir {}: {}",
                backup_dir.display(),
                e
            ))
        })?;
        info!("Created backup dir {}", backup_dir.display());
    } else if !backup_dir.is_dir() {
        return Err(MonitorError::Config(format!(
            "backup dir {} is not a directory",
            backup_dir.display()
        )));
    }

    let target = WatchTarget {
        hot_dir,
        backup_dir,
    };
    SidecarConfig::save(config_file, &target)
        .map_err(|e| MonitorError::Config(e.to_string()))?;

    Ok(target)
}
