//! Pass lock - keeps two passes from running at the same time
//!
//! A scheduled daemon and a cron-driven `check` can share one data
//! directory; the lock file in that directory serializes their passes.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::result::{Error, Result};

pub const LOCK_FILE_NAME: &str = "idlecheck.lock";

/// Exclusive lock held for the duration of a pass; released on drop
#[derive(Debug)]
pub struct PassLock {
    file: File,
    path: PathBuf,
}

impl PassLock {
    /// Try to take the lock in `dir` without waiting.
    ///
    /// Returns `Ok(None)` when another process holds it.
    pub fn try_acquire(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::Lock(format!("Cannot open {}: {}", path.display(), e)))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(Error::Lock(format!("Cannot lock {}: {}", path.display(), e))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PassLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
