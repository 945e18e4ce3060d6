// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The opaque `ModelDB` port (spec §6): the narrow set of operations the
//! core consumes against each model's embedded relational database. The
//! schema and SQL themselves are out of scope (spec §1) — this trait is
//! the seam a concrete embedded-DB adapter implements.

use crate::error::CatalogError;
use oms_core::{Model, ModelDigest, ModelMeta, ModelTextMeta};
use std::path::Path;

/// A model found on disk during discovery, before it's wrapped into the
/// full `Model` record (spec §4.3 "reads only `model_dic`").
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDicRow {
    pub digest: ModelDigest,
    pub name: String,
    pub version: String,
    pub default_lang: String,
}

/// Port the Model Catalog consumes against a model's embedded DB. One
/// production implementation lives outside this crate (out of scope per
/// spec §1); `test_support::FakeModelDb` is the in-crate test double.
pub trait ModelDb: Send + Sync {
    /// Opens `db_path` and reads just `model_dic` (spec §4.3 discovery).
    fn read_model_dic(&self, db_path: &Path) -> Result<ModelDicRow, CatalogError>;

    /// Loads full language-neutral metadata on first demand (spec §4.3).
    fn load_meta(&self, digest: &ModelDigest) -> Result<ModelMeta, CatalogError>;

    /// Loads per-language text metadata, independent of `load_meta`.
    fn load_text(&self, digest: &ModelDigest) -> Result<ModelTextMeta, CatalogError>;
}

/// Convenience used by discovery to assemble a full `Model` from a
/// `model_dic` row plus the paths the scan already knows about.
pub fn model_from_dic_row(row: ModelDicRow, exe_path: std::path::PathBuf, db_path: std::path::PathBuf, bin_dir: std::path::PathBuf) -> Model {
    Model {
        digest: row.digest,
        name: row.name,
        version: row.version,
        default_lang: row.default_lang,
        exe_path,
        db_path,
        bin_dir,
    }
}
