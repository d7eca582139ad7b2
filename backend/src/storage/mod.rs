//! Storage module for the EventDesk backend
//!
//! Two-factor records live in a single JSON object file keyed by account
//! name, in line with the flat-file storage the rest of the site uses.
//!
//! Key features:
//! - Atomic writes through a temp file in the same directory
//! - Owner-only permissions on unix
//! - Writes serialised across processes with an OS lock on a sidecar file

pub mod file_lock;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::StorageError;
use file_lock::{FileLock, DEFAULT_LOCK_TIMEOUT};
use eventdesk_shared::{SharedResult, TwoFactorRecord, TwoFactorStore};

/// On-disk layout of the record file
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct RecordFile {
    accounts: BTreeMap<String, TwoFactorRecord>,
}

/// Two-factor record store backed by a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl JsonFileStore {
    /// Create a store for `path`; the file is created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// How long a save waits for a concurrent writer
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Account names with a stored record
    pub fn accounts(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.read_file()?.accounts.into_keys().collect())
    }

    fn display_path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    fn read_file(&self) -> Result<RecordFile, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Record file {:?} does not exist yet", self.path);
                return Ok(RecordFile::default());
            }
            Err(e) => {
                return Err(StorageError::Read {
                    path: self.display_path(),
                    reason: e.to_string(),
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(RecordFile::default());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Corrupted {
            path: self.display_path(),
            reason: e.to_string(),
        })
    }

    fn write_file(&self, file: &RecordFile) -> Result<(), StorageError> {
        let write_err = |reason: String| StorageError::Write {
            path: self.display_path(),
            reason,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| write_err(e.to_string()))?;

        let mut json = serde_json::to_string_pretty(file).map_err(|e| write_err(e.to_string()))?;
        json.push('\n');

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| write_err(e.to_string()))?;
        temp.write_all(json.as_bytes())
            .map_err(|e| write_err(e.to_string()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| write_err(e.to_string()))?;

        // NamedTempFile is created 0600 on unix, which persist keeps
        temp.persist(&self.path)
            .map_err(|e| write_err(e.error.to_string()))?;

        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut RecordFile) -> T) -> Result<T, StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::Write {
                path: self.display_path(),
                reason: e.to_string(),
            })?;
        }

        // Held across the read so no other writer's save is lost
        let _lock = FileLock::acquire(&FileLock::lock_path_for(&self.path), self.lock_timeout)?;

        let mut file = self.read_file()?;
        let result = f(&mut file);
        self.write_file(&file)?;
        Ok(result)
    }
}

impl TwoFactorStore for JsonFileStore {
    fn load(&self, account: &str) -> SharedResult<Option<TwoFactorRecord>> {
        Ok(self.read_file()?.accounts.remove(account))
    }

    fn save(&self, account: &str, record: TwoFactorRecord) -> SharedResult<()> {
        self.modify(|file| {
            file.accounts.insert(account.to_string(), record);
        })?;
        info!("Saved two-factor record for {} to {:?}", account, self.path);
        Ok(())
    }

    fn remove(&self, account: &str) -> SharedResult<bool> {
        let removed = self.modify(|file| file.accounts.remove(account).is_some())?;
        if removed {
            info!("Removed two-factor record for {} from {:?}", account, self.path);
        }
        Ok(removed)
    }
}
