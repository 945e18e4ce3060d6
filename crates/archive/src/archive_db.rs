// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The opaque run/workset-listing port the Archive Scanner consumes
//! against each model's embedded database (spec §4.4, §6 `ModelDB` port).
//! Mirrors `oms_catalog::ModelDb`'s dual-implementation shape: a
//! production adapter lives outside this crate (out of scope per spec
//! §1), `test_support::FakeArchiveDb` is the in-crate test double.

use crate::error::ArchiveError;
use oms_core::ModelDigest;
use chrono::{DateTime, Utc};

/// One run recorded against a model, as the scanner needs to see it.
/// `run_id` is the monotonically increasing id used to find the baseline
/// (lowest-id) run, independent of `run_stamp` (the user-facing name used
/// in keep-lists and in the archive state file's `Run`/`RunAlert` lists).
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub run_id: i64,
    pub run_stamp: String,
    pub update_date_time: DateTime<Utc>,
}

/// One workset recorded against a model.
#[derive(Debug, Clone, PartialEq)]
pub struct WorksetRecord {
    pub set_id: i64,
    pub name: String,
    pub is_default: bool,
    pub is_readonly: bool,
    pub update_date_time: DateTime<Utc>,
}

/// Port the Archive Scanner consumes against a model's embedded DB.
pub trait ArchiveDb: Send + Sync {
    fn list_runs(&self, digest: &ModelDigest) -> Result<Vec<RunRecord>, ArchiveError>;
    fn list_worksets(&self, digest: &ModelDigest) -> Result<Vec<WorksetRecord>, ArchiveError>;
}
