//! Advisory locks and atomic replacement for state files.
//!
//! Every JSON state file `<name>.json` has a sibling `<name>.json.lock`.
//! Writers hold the lock while they swap in a fully written temp file, so a
//! reader never sees a half-written document. Two `rollout` processes
//! racing on the same file end up last-writer-wins.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// How long a writer waits for a state file lock
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// `WouldBlock` everywhere; Windows also reports sharing/lock violations.
fn held_elsewhere(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || (cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33)))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

/// Exclusive hold on a `.lock` file; released when dropped
#[derive(Debug)]
pub struct StateLock {
    handle: File,
    path: PathBuf,
}

impl StateLock {
    fn open(path: &Path) -> Result<File> {
        ensure_parent(path)?;
        let handle = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        Ok(handle)
    }

    /// Poll for the lock until `timeout_ms` runs out
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        let handle = Self::open(path)?;

        while let Err(err) = handle.try_lock_exclusive() {
            if !held_elsewhere(&err) {
                return Err(Error::Io(err));
            }
            if Instant::now() >= deadline {
                return Err(Error::LockFailed(path.to_path_buf()));
            }
            tracing::debug!(lock = %path.display(), "waiting for state lock");
            thread::sleep(POLL_INTERVAL);
        }

        Ok(Self {
            handle,
            path: path.to_path_buf(),
        })
    }

    /// Single attempt; `None` when another process holds it
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let handle = Self::open(path)?;
        match handle.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self {
                handle,
                path: path.to_path_buf(),
            })),
            Err(err) if held_elsewhere(&err) => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = self.handle.unlock();
    }
}

/// `overrides.json` -> `overrides.json.lock`
pub fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

/// `overrides.json` -> `overrides.json.<pid>.tmp`, beside the target
fn staging_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}.tmp", std::process::id()));
    PathBuf::from(name)
}

/// Stage `data` next to `path`, fsync, then rename over the target.
/// Takes no lock; exports use it directly.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let staging = staging_path_for(path);
    let written = File::create(&staging).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&staging);
        return Err(Error::Io(err));
    }

    fs::rename(&staging, path)?;
    Ok(())
}

/// `write_atomic` while holding the file's `.lock`
pub fn write_atomic_locked(path: impl AsRef<Path>, data: &[u8], timeout_ms: u64) -> Result<()> {
    let path = path.as_ref();
    let _guard = StateLock::acquire(lock_path_for(path), timeout_ms)?;
    write_atomic(path, data)
}
