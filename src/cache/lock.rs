//! Per-entry writer locks
//!
//! Two writers caching the same `{tool, version, arch}` would interleave the
//! delete/recreate/copy steps, so writers take an exclusive advisory lock on
//! `<root>/.locks/<tool>/<version>/<arch>.lock` first. Lock files live outside
//! the tool directories and never show up as tools, versions or entries.
//!
//! `flock` locks belong to the open file description, so the lock excludes
//! other threads of this process as well as other processes.

use crate::cache::key::CacheKey;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Directory under the cache root holding lock files
pub const LOCK_DIR: &str = ".locks";

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const CONTENTION_NOTICE: Duration = Duration::from_millis(500);

/// Exclusive lock on one cache entry, released on drop
#[derive(Debug)]
pub struct EntryLock {
    path: PathBuf,
    file: Option<File>,
}

impl EntryLock {
    /// Lock file path for a key
    pub fn lock_path(root: &Path, key: &CacheKey) -> PathBuf {
        root.join(LOCK_DIR)
            .join(&key.tool)
            .join(&key.version)
            .join(format!("{}.lock", key.arch))
    }

    /// Acquire the lock for `key`, waiting up to `timeout`
    pub fn acquire(root: &Path, key: &CacheKey, timeout: Duration) -> io::Result<Self> {
        let path = Self::lock_path(root, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let start = Instant::now();
        let mut warned = false;
        loop {
            match try_lock_exclusive(&path) {
                Ok(file) => {
                    if warned {
                        debug!(
                            "Lock acquired after {:.1}s: {}",
                            start.elapsed().as_secs_f64(),
                            path.display()
                        );
                    }
                    return Ok(Self {
                        path,
                        file: Some(file),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if !warned && start.elapsed() > CONTENTION_NOTICE {
                        warn!("Waiting for another writer of {}", key);
                        warned = true;
                    }
                }
                Err(e) => return Err(e),
            }

            if start.elapsed() >= timeout {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("timed out after {:?} waiting for {}", timeout, path.display()),
                ));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Path of the held lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for EntryLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            release(file, &self.path);
        }
    }
}

#[cfg(unix)]
fn try_lock_exclusive(path: &Path) -> io::Result<File> {
    use std::os::unix::io::AsRawFd;

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    // SAFETY: the descriptor is owned by `file` and valid for this call.
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(file);
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Err(io::Error::new(io::ErrorKind::WouldBlock, "lock held"))
    } else {
        Err(err)
    }
}

#[cfg(unix)]
fn release(file: File, _path: &Path) {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is owned by `file` and valid for this call.
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(not(unix))]
fn try_lock_exclusive(path: &Path) -> io::Result<File> {
    // Without flock, an exclusively created file stands in for the lock and
    // is removed on release.
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "lock held"))
        }
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn release(file: File, path: &Path) {
    drop(file);
    let _ = fs::remove_file(path);
}
