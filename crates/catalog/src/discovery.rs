// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup/`RefreshModels` discovery: scan the models root for `*.sqlite`
//! (or equivalent) DB files alongside executables sharing the base name
//! (spec §4.3).

use crate::error::CatalogError;
use crate::model_db::{model_from_dic_row, ModelDb};
use oms_core::{Model, ModelDigest};
use std::path::Path;

/// Digests added/removed by a `RefreshModels` call relative to the
/// catalog's previous registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshDiff {
    pub added: Vec<ModelDigest>,
    pub removed: Vec<ModelDigest>,
}

const DB_EXTENSIONS: [&str; 2] = ["sqlite", "db"];

/// Scans `scan_root` for `<name>.sqlite` (or `.db`) files, pairs each with
/// an executable of the same base name in the same directory, and reads
/// just `model_dic` from each (spec §4.3). Entries missing their paired
/// executable are skipped rather than treated as an error — a partially
/// installed model shouldn't fail the whole scan.
pub fn scan_models_dir(scan_root: &Path, db: &dyn ModelDb) -> Result<Vec<Model>, CatalogError> {
    let mut models = Vec::new();
    if !scan_root.exists() {
        return Ok(models);
    }

    let entries = std::fs::read_dir(scan_root).map_err(|e| CatalogError::Scan {
        path: scan_root.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| CatalogError::Scan {
            path: scan_root.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !DB_EXTENSIONS.contains(&ext) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let exe_path = scan_root.join(stem);
        if !exe_path.exists() {
            tracing::debug!(model = stem, "skipping db without paired executable");
            continue;
        }

        let row = db.read_model_dic(&path)?;
        models.push(model_from_dic_row(row, exe_path, path.clone(), scan_root.to_path_buf()));
    }

    Ok(models)
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
