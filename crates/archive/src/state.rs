// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `archive-state.json` (spec §6): the aggregate archive/alert lists for
//! every scanned model, persisted atomically with `.bak` rotation of a
//! corrupt prior file on load, matching this workspace's snapshot-file
//! idiom (`oms_storage::atomic`).

use chrono::{DateTime, Utc};
use oms_core::{Error, ModelDigest};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelArchiveState {
    pub model_digest: ModelDigest,
    pub model_name: String,
    pub run: Vec<String>,
    pub set: Vec<String>,
    pub run_alert: Vec<String>,
    pub set_alert: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchiveState {
    pub is_archive: bool,
    pub archive_days: i64,
    pub alert_days: i64,
    pub archive_date_time: DateTime<Utc>,
    pub alert_date_time: DateTime<Utc>,
    pub update_date_time: DateTime<Utc>,
    pub model: Vec<ModelArchiveState>,
}

impl ArchiveState {
    /// Serializes and writes atomically; the caller (`ArchiveScanner`)
    /// tracks consecutive failures and self-disables per spec §4.4.
    pub fn persist(&self, path: &Path) -> Result<(), Error> {
        let bytes = serde_json::to_vec_pretty(self).map_err(|e| Error::io(format!("serialize {}", path.display()), std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        oms_storage::atomic_write(path, &bytes)
    }

    /// Reads and parses a prior `archive-state.json`, if any. A file that
    /// exists but fails to parse is rotated aside via `.bak` rather than
    /// silently discarded or left to fail every subsequent scan.
    pub fn load(path: &Path) -> Result<Option<Self>, Error> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(format!("read {}", path.display()), e))?;
        match serde_json::from_str(&text) {
            Ok(state) => Ok(Some(state)),
            Err(_) => {
                oms_storage::atomic::rotate_bak(path, 3)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
