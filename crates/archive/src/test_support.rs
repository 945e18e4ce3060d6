// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `FakeArchiveDb`: the in-crate test double for the run/workset-listing
//! port, gated behind `test-support` so production builds never link
//! this in (mirrors `oms_catalog::test_support::FakeModelDb`).

use crate::archive_db::{ArchiveDb, RunRecord, WorksetRecord};
use crate::error::ArchiveError;
use oms_core::ModelDigest;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct FakeArchiveDb {
    runs: Mutex<HashMap<ModelDigest, Vec<RunRecord>>>,
    worksets: Mutex<HashMap<ModelDigest, Vec<WorksetRecord>>>,
}

impl FakeArchiveDb {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_runs(&self, digest: &str, runs: Vec<RunRecord>) {
        self.runs.lock().insert(ModelDigest::new(digest), runs);
    }

    pub fn set_worksets(&self, digest: &str, worksets: Vec<WorksetRecord>) {
        self.worksets.lock().insert(ModelDigest::new(digest), worksets);
    }
}

impl ArchiveDb for FakeArchiveDb {
    fn list_runs(&self, digest: &ModelDigest) -> Result<Vec<RunRecord>, ArchiveError> {
        Ok(self.runs.lock().get(digest).cloned().unwrap_or_default())
    }

    fn list_worksets(&self, digest: &ModelDigest) -> Result<Vec<WorksetRecord>, ArchiveError> {
        Ok(self.worksets.lock().get(digest).cloned().unwrap_or_default())
    }
}
