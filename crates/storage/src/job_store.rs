// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads and writes the job-state files under `queue/`, `active/` and
//! `history/` (spec §6). This is the only cross-process coordination
//! medium between peer service instances (spec §5).

use crate::atomic::atomic_write;
use crate::filename::{JobFileName, JobStateDir};
use oms_core::{ComputeUse, Error, ErrorKind, RunJob, RunStatus};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The full contents of a job-state file: the submitted job plus whatever
/// the current directory adds (compute uses while active, final status in
/// history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(flatten)]
    pub job: RunJob,
    #[serde(default)]
    pub compute_uses: Vec<ComputeUse>,
    #[serde(default)]
    pub final_status: Option<RunStatus>,
}

impl JobRecord {
    pub fn queued(job: RunJob) -> Self {
        Self {
            job,
            compute_uses: Vec::new(),
            final_status: None,
        }
    }
}

pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        for dir in [JobStateDir::Queue, JobStateDir::Active, JobStateDir::History] {
            fs::create_dir_all(root.join(dir.dir_name()))
                .map_err(|e| Error::io(format!("create {}", dir.dir_name()), e))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn write(&self, dir: JobStateDir, name: &JobFileName, record: &JobRecord) -> Result<(), Error> {
        let path = name.path_in(&self.root, dir);
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| Error::new(ErrorKind::Internal, format!("serialize job record: {e}")))?;
        atomic_write(&path, &bytes)
    }

    pub fn read(&self, dir: JobStateDir, name: &JobFileName) -> Result<JobRecord, Error> {
        let path = name.path_in(&self.root, dir);
        let bytes = fs::read(&path).map_err(|e| Error::io(format!("read {}", path.display()), e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::new(ErrorKind::Internal, format!("parse {}: {e}", path.display())))
    }

    /// Moves a job-state file between directories, renaming it to encode
    /// the destination's filename convention. Atomic within a filesystem.
    pub fn move_file(
        &self,
        from_dir: JobStateDir,
        from_name: &JobFileName,
        to_dir: JobStateDir,
        to_name: &JobFileName,
        record: &JobRecord,
    ) -> Result<(), Error> {
        self.write(to_dir, to_name, record)?;
        let from_path = from_name.path_in(&self.root, from_dir);
        let _ = fs::remove_file(&from_path);
        Ok(())
    }

    pub fn delete(&self, dir: JobStateDir, name: &JobFileName) -> Result<(), Error> {
        let path = name.path_in(&self.root, dir);
        fs::remove_file(&path).map_err(|e| Error::io(format!("delete {}", path.display()), e))
    }

    /// Lists every recognized job-state filename in `dir`, in lexical
    /// (= chronological) order. Unparseable entries are skipped.
    pub fn list(&self, dir: JobStateDir) -> Result<Vec<JobFileName>, Error> {
        let path = self.root.join(dir.dir_name());
        let mut entries = Vec::new();
        let read_dir = fs::read_dir(&path).map_err(|e| Error::io(format!("list {}", path.display()), e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| Error::io(format!("read entry in {}", path.display()), e))?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(parsed) = JobFileName::parse(file_name, dir) {
                entries.push(parsed);
            }
        }
        entries.sort_by(|a, b| a.submit_stamp.cmp(&b.submit_stamp));
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "job_store_tests.rs"]
mod tests;
