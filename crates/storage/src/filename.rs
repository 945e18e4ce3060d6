// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state file directory layout and naming convention (spec §6):
//!
//! ```text
//! queue/   <modelDigest>-<submitStampMs>-<runStamp>.json
//! active/  <modelDigest>-<submitStampMs>-<runStamp>-<pid>.json
//! history/ <modelDigest>-<submitStampMs>-<runStamp>-<finalStatus>.json
//! ```
//!
//! Filenames are the sort key: fixed-width `submitStampMs` keeps lexical
//! order equal to chronological order (spec §4.1 Admit: FIFO by lexical
//! filename order).

use oms_core::{ModelDigest, RunStamp, RunStatus, SubmitStamp};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStateDir {
    Queue,
    Active,
    History,
}

impl JobStateDir {
    pub fn dir_name(&self) -> &'static str {
        match self {
            JobStateDir::Queue => "queue",
            JobStateDir::Active => "active",
            JobStateDir::History => "history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFileName {
    pub model_digest: ModelDigest,
    pub submit_stamp: SubmitStamp,
    pub run_stamp: RunStamp,
    /// Set only for files in `active/`.
    pub pid: Option<u32>,
    /// Set only for files in `history/` — per spec §9.1's resolution,
    /// history filenames DO encode the final status.
    pub final_status: Option<RunStatus>,
}

impl JobFileName {
    pub fn queued(model_digest: ModelDigest, submit_stamp: SubmitStamp, run_stamp: RunStamp) -> Self {
        Self {
            model_digest,
            submit_stamp,
            run_stamp,
            pid: None,
            final_status: None,
        }
    }

    pub fn active(&self, pid: u32) -> Self {
        Self {
            model_digest: self.model_digest.clone(),
            submit_stamp: self.submit_stamp,
            run_stamp: self.run_stamp.clone(),
            pid: Some(pid),
            final_status: None,
        }
    }

    pub fn finalized(&self, status: RunStatus) -> Self {
        Self {
            model_digest: self.model_digest.clone(),
            submit_stamp: self.submit_stamp,
            run_stamp: self.run_stamp.clone(),
            pid: None,
            final_status: Some(status),
        }
    }

    pub fn file_name(&self) -> String {
        let base = format!(
            "{}-{}-{}",
            self.model_digest,
            self.submit_stamp.as_fixed_width(),
            self.run_stamp
        );
        match (self.pid, self.final_status) {
            (Some(pid), _) => format!("{base}-{pid}.json"),
            (None, Some(status)) => format!("{base}-{}.json", status.as_file_token()),
            (None, None) => format!("{base}.json"),
        }
    }

    pub fn path_in(&self, root: &Path, dir: JobStateDir) -> PathBuf {
        root.join(dir.dir_name()).join(self.file_name())
    }

    /// Parses a filename back into its components. Returns `None` for
    /// names that don't match the convention (ignored during directory
    /// scans rather than treated as a fatal error).
    pub fn parse(file_name: &str, dir: JobStateDir) -> Option<Self> {
        let stem = file_name.strip_suffix(".json")?;
        let parts: Vec<&str> = stem.splitn(3, '-').collect();
        if parts.len() < 3 {
            return None;
        }
        let model_digest = ModelDigest::new(parts[0]);
        let submit_stamp = SubmitStamp::new(parts[1].parse::<i64>().ok()?);
        let rest = parts[2];

        match dir {
            JobStateDir::Queue => Some(Self {
                model_digest,
                submit_stamp,
                run_stamp: RunStamp::new(rest),
                pid: None,
                final_status: None,
            }),
            JobStateDir::Active => {
                let (run_stamp, pid) = rest.rsplit_once('-')?;
                Some(Self {
                    model_digest,
                    submit_stamp,
                    run_stamp: RunStamp::new(run_stamp),
                    pid: Some(pid.parse().ok()?),
                    final_status: None,
                })
            }
            JobStateDir::History => {
                let (run_stamp, status_token) = rest.rsplit_once('-')?;
                Some(Self {
                    model_digest,
                    submit_stamp,
                    run_stamp: RunStamp::new(run_stamp),
                    pid: None,
                    final_status: RunStatus::from_file_token(status_token),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "filename_tests.rs"]
mod tests;
