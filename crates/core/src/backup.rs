//! Backup directory storage: mirrored copies and the delete-both action

use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::history::{HistorySink, Operation};
use crate::naming::BACKUP_SUFFIX;
use crate::{MonitorError, Result};

/// The backup directory together with the history it reports into
///
/// Backup names are derived deterministically from source basenames, so no
/// cross-file locking is needed. Each copy lands through a temp file and an
/// atomic rename.
pub struct BackupDir {
    root: PathBuf,
    history: Arc<dyn HistorySink>,
}

impl BackupDir {
    /// Wrap an existing backup directory
    pub fn new(root: impl Into<PathBuf>, history: Arc<dyn HistorySink>) -> Self {
        Self {
            root: root.into(),
            history,
        }
    }

    /// `<root>/<name>.bak`
    pub fn backup_path(&self, name: impl Into<OsString>) -> PathBuf {
        let mut file_name = name.into();
        file_name.push(BACKUP_SUFFIX);
        self.root.join(file_name)
    }

    /// Copy a regular file into the backup directory
    ///
    /// Returns the destination path. A `BACKUP` record naming the destination
    /// is appended only once the copy is in place.
    pub fn copy(&self, source: &Path) -> Result<PathBuf> {
        let metadata = fs::symlink_metadata(source)
            .map_err(|e| MonitorError::io(format!("failed to stat {}", source.display()), e))?;
        if !metadata.file_type().is_file() {
            return Err(MonitorError::NotRegularFile(source.to_path_buf()));
        }

        let name = source
            .file_name()
            .ok_or_else(|| MonitorError::NotRegularFile(source.to_path_buf()))?;
        let dest = self.backup_path(name);

        let mut reader = File::open(source)
            .map_err(|e| MonitorError::io(format!("failed to open {}", source.display()), e))?;
        let mut staged = NamedTempFile::new_in(&self.root).map_err(|e| {
            MonitorError::io(format!("failed to stage backup in {}", self.root.display()), e)
        })?;

        let bytes = io::copy(&mut reader, staged.as_file_mut())
            .map_err(|e| MonitorError::io(format!("failed to copy {}", source.display()), e))?;
        // The staging file starts out owner-only
        staged
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| {
                MonitorError::io(format!("failed to set mode on backup of {}", source.display()), e)
            })?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| MonitorError::io(format!("failed to sync backup of {}", source.display()), e))?;
        staged
            .persist(&dest)
            .map_err(|e| MonitorError::io(format!("failed to publish {}", dest.display()), e.error))?;

        debug!("Backed up {} ({} bytes) to {}", source.display(), bytes, dest.display());
        self.history.record(&dest, Operation::Backup)?;
        Ok(dest)
    }

    /// Remove `original` and the backup of `target_name`
    ///
    /// Both removals must succeed. A failure on the second one leaves the
    /// first in place; nothing is rolled back. Returns the removed backup path.
    pub fn delete_pair(&self, original: &Path, target_name: impl AsRef<OsStr>) -> Result<PathBuf> {
        fs::remove_file(original)
            .map_err(|e| MonitorError::io(format!("failed to remove {}", original.display()), e))?;

        let backup = self.backup_path(target_name.as_ref());
        fs::remove_file(&backup)
            .map_err(|e| MonitorError::io(format!("failed to remove {}", backup.display()), e))?;

        self.history.record(&backup, Operation::BackupDelete)?;
        Ok(backup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MemoryHistory {
        records: Mutex<Vec<(PathBuf, Operation)>>,
    }

    impl HistorySink for MemoryHistory {
        fn record(&self, path: &Path, operation: Operation) -> Result<()> {
            self.records.lock().unwrap().push((path.to_path_buf(), operation));
            Ok(())
        }
    }

    fn setup() -> (TempDir, PathBuf, Arc<MemoryHistory>, BackupDir) {
        let temp_dir = TempDir::new().unwrap();
        let backup_root = temp_dir.path().join("backup");
        fs::create_dir(&backup_root).unwrap();
        let history = Arc::new(MemoryHistory::default());
        let backups = BackupDir::new(&backup_root, history.clone());
        (temp_dir, backup_root, history, backups)
    }

    #[test]
    fn test_copy_regular_file() {
        let (temp_dir, backup_root, history, backups) = setup();
        let source = temp_dir.path().join("report.txt");
        fs::write(&source, b"A").unwrap();

        let dest = backups.copy(&source).unwrap();

        assert_eq!(dest, backup_root.join("report.txt.bak"));
        assert_eq!(fs::read(&dest).unwrap(), b"A");
        let records = history.records.lock().unwrap();
        assert_eq!(records.as_slice(), &[(dest.clone(), Operation::Backup)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_keeps_source_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (temp_dir, _backup_root, _history, backups) = setup();
        let source = temp_dir.path().join("script.sh");
        fs::write(&source, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o754)).unwrap();

        let dest = backups.copy(&source).unwrap();

        let mode = fs::metadata(&dest).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o754);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_delete_pair_non_utf8_target() {
        use std::os::unix::ffi::OsStrExt;

        let (temp_dir, backup_root, _history, backups) = setup();
        let original = temp_dir.path().join(OsStr::from_bytes(b"delete_caf\xe9.txt"));
        fs::write(&original, b"").unwrap();
        let backup = backup_root.join(OsStr::from_bytes(b"caf\xe9.txt.bak"));
        fs::write(&backup, b"A").unwrap();

        let removed = backups
            .delete_pair(&original, OsStr::from_bytes(b"caf\xe9.txt"))
            .unwrap();

        assert_eq!(removed, backup);
        assert!(!original.exists());
        assert!(!backup.exists());
    }

    #[test]
    fn test_copy_overwrites_previous_backup() {
        let (temp_dir, _backup_root, _history, backups) = setup();
        let source = temp_dir.path().join("notes.md");
        fs::write(&source, b"first version").unwrap();
        backups.copy(&source).unwrap();

        fs::write(&source, b"second").unwrap();
        let dest = backups.copy(&source).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"second");
    }

    #[test]
    fn test_copy_leaves_no_staging_files() {
        let (temp_dir, backup_root, _history, backups) = setup();
        let source = temp_dir.path().join("a.bin");
        fs::write(&source, vec![7u8; 64 * 1024]).unwrap();

        backups.copy(&source).unwrap();

        let names: Vec<_> = fs::read_dir(&backup_root)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("a.bin.bak")]);
    }

    #[test]
    fn test_copy_rejects_directory() {
        let (temp_dir, _backup_root, history, backups) = setup();
        let dir = temp_dir.path().join("subdir");
        fs::create_dir(&dir).unwrap();

        let err = backups.copy(&dir).unwrap_err();

        assert!(matches!(err, MonitorError::NotRegularFile(_)));
        assert!(history.records.lock().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_rejects_symlink() {
        let (temp_dir, _backup_root, _history, backups) = setup();
        let target = temp_dir.path().join("target.txt");
        fs::write(&target, b"x").unwrap();
        let link = temp_dir.path().join("link.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(matches!(
            backups.copy(&link),
            Err(MonitorError::NotRegularFile(_))
        ));
    }

    #[test]
    fn test_copy_missing_source_is_io_error() {
        let (temp_dir, _backup_root, history, backups) = setup();

        let err = backups.copy(&temp_dir.path().join("gone.txt")).unwrap_err();

        assert!(err.is_not_found());
        assert!(history.records.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delete_pair() {
        let (temp_dir, backup_root, history, backups) = setup();
        let original = temp_dir.path().join("delete_report.txt");
        fs::write(&original, b"bye").unwrap();
        let backup = backup_root.join("report.txt.bak");
        fs::write(&backup, b"A").unwrap();

        let removed = backups.delete_pair(&original, "report.txt").unwrap();

        assert_eq!(removed, backup);
        assert!(!original.exists());
        assert!(!backup.exists());
        let records = history.records.lock().unwrap();
        assert_eq!(records.as_slice(), &[(backup.clone(), Operation::BackupDelete)]);
    }

    #[test]
    fn test_delete_pair_partial_failure_is_not_rolled_back() {
        let (temp_dir, _backup_root, history, backups) = setup();
        let original = temp_dir.path().join("delete_report.txt");
        fs::write(&original, b"bye").unwrap();

        let err = backups.delete_pair(&original, "report.txt").unwrap_err();

        assert!(err.is_not_found());
        assert!(!original.exists());
        assert!(history.records.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delete_pair_twice_fails_cleanly() {
        let (temp_dir, backup_root, _history, backups) = setup();
        let original = temp_dir.path().join("delete_x.txt");
        fs::write(&original, b"").unwrap();
        fs::write(backup_root.join("x.txt.bak"), b"").unwrap();

        backups.delete_pair(&original, "x.txt").unwrap();
        assert!(backups.delete_pair(&original, "x.txt").is_err());
    }
}
