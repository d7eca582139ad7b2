//! Cross-process locking for the record file
//!
//! Every CLI invocation opens its own store, so an in-process mutex cannot
//! serialise two `enable` runs. Writers instead hold an exclusive OS lock on
//! a sidecar `<records>.lock` file for the whole read-modify-write.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::StorageError;

/// How long a writer waits for another process before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

const RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// Exclusive lock held until dropped
#[derive(Debug)]
pub struct FileLock {
    // The OS releases the lock when this handle closes
    _file: File,
    path: PathBuf,
}

impl FileLock {
    /// Lock file used to guard `records_path`
    pub fn lock_path_for(records_path: &Path) -> PathBuf {
        let mut name = records_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        records_path.with_file_name(name)
    }

    /// Acquire the lock at `path`, creating the file if needed
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, StorageError> {
        let lock_err = |reason: String| StorageError::Lock {
            path: path.to_string_lossy().to_string(),
            reason,
        };

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| lock_err(e.to_string()))?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    debug!("Acquired record file lock: {:?}", path);
                    return Ok(Self {
                        _file: file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() >= timeout {
                        return Err(lock_err(format!(
                            "timed out after {}s waiting for another writer",
                            timeout.as_secs()
                        )));
                    }
                    std::thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => return Err(lock_err(e.to_string())),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        debug!("Released record file lock: {:?}", self.path);
    }
}

/// Non-blocking exclusive lock; `WouldBlock` when another handle holds it
#[cfg(unix)]
fn try_lock(file: &File) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(windows)]
fn try_lock(file: &File) -> std::io::Result<()> {
    use std::os::windows::io::AsRawHandle;
    use windows::Win32::Foundation::{ERROR_LOCK_VIOLATION, HANDLE};
    use windows::Win32::Storage::FileSystem::{
        LockFileEx, LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY,
    };
    use windows::Win32::System::IO::OVERLAPPED;

    let handle = HANDLE(file.as_raw_handle() as isize);
    let mut overlapped = OVERLAPPED::default();
    let result = unsafe {
        LockFileEx(
            handle,
            LOCKFILE_EXCLUSIVE_LOCK | LOCKFILE_FAIL_IMMEDIATELY,
            0,
            u32::MAX,
            u32::MAX,
            &mut overlapped,
        )
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.code() == ERROR_LOCK_VIOLATION.to_hresult() => {
            Err(std::io::ErrorKind::WouldBlock.into())
        }
        Err(e) => Err(std::io::Error::other(e.to_string())),
    }
}
