// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A per-instance advisory file lock in the job-state root. Prevents two
//! local processes from racing on the same instance's queue; peer
//! instances elsewhere coordinate only through filename conventions
//! (spec §5).

use fs2::FileExt;
use oms_core::{Error, ErrorKind};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub struct InstanceLock {
    _file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Acquires the exclusive lock. Must be called before any other
    /// filesystem mutation in the job-state root, so a second local
    /// instance fails fast instead of racing on queue files.
    pub fn acquire(root: &Path) -> Result<Self, Error> {
        std::fs::create_dir_all(root)
            .map_err(|e| Error::io(format!("create job-state root {}", root.display()), e))?;
        let path = root.join("oms.lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)
            .map_err(|e| Error::io(format!("open lock file {}", path.display()), e))?;
        file.try_lock_exclusive().map_err(|_| {
            Error::new(
                ErrorKind::Internal,
                format!("another instance already holds the lock at {}", path.display()),
            )
        })?;
        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self._file);
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
