// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reference `ArchiveDb` adapter this binary runs against, mirroring
//! `JsonModelDb`: `oms_archive::ArchiveDb` is an opaque port over each
//! model's run/workset listing in its embedded database (out of scope per
//! spec §1), backed here by one JSON file keyed by model digest rather
//! than a real SQL engine.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use oms_archive::archive_db::{ArchiveDb, RunRecord, WorksetRecord};
use oms_archive::ArchiveError;
use oms_core::ModelDigest;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct RunJson {
    run_id: i64,
    run_stamp: String,
    update_date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
struct WorksetJson {
    set_id: i64,
    name: String,
    #[serde(default)]
    is_default: bool,
    #[serde(default)]
    is_readonly: bool,
    update_date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ModelArchiveJson {
    #[serde(default)]
    runs: Vec<RunJson>,
    #[serde(default)]
    worksets: Vec<WorksetJson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ArchiveDbFile {
    #[serde(default)]
    models: HashMap<String, ModelArchiveJson>,
}

pub struct JsonArchiveDb {
    path: PathBuf,
}

impl JsonArchiveDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<ArchiveDbFile, ArchiveError> {
        if !self.path.exists() {
            return Ok(ArchiveDbFile::default());
        }
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| ArchiveError::Db(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_str(&text).map_err(|e| ArchiveError::Db(format!("parse {}: {e}", self.path.display())))
    }
}

impl ArchiveDb for JsonArchiveDb {
    fn list_runs(&self, digest: &ModelDigest) -> Result<Vec<RunRecord>, ArchiveError> {
        let file = self.load()?;
        let Some(model) = file.models.get(digest.as_str()) else {
            return Ok(Vec::new());
        };
        Ok(model
            .runs
            .iter()
            .map(|r| RunRecord {
                run_id: r.run_id,
                run_stamp: r.run_stamp.clone(),
                update_date_time: r.update_date_time,
            })
            .collect())
    }

    fn list_worksets(&self, digest: &ModelDigest) -> Result<Vec<WorksetRecord>, ArchiveError> {
        let file = self.load()?;
        let Some(model) = file.models.get(digest.as_str()) else {
            return Ok(Vec::new());
        };
        Ok(model
            .worksets
            .iter()
            .map(|w| WorksetRecord {
                set_id: w.set_id,
                name: w.name.clone(),
                is_default: w.is_default,
                is_readonly: w.is_readonly,
                update_date_time: w.update_date_time,
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "json_archive_db_tests.rs"]
mod tests;
