// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reference `ModelDb` adapter this binary actually runs against.
//! `oms_catalog::ModelDb` is an opaque port over "each model's embedded
//! relational database" — the schema and SQL are explicitly out of scope
//! (spec §1). This adapter reads the same information from plain JSON
//! sidecar files instead of a real SQL engine: `discovery::scan_models_dir`
//! already accepts a bare `.db` extension as "sqlite or equivalent" (spec
//! §4.3), so a `<model>.db` file here just holds the `model_dic` row as
//! JSON, and per-digest metadata/text live under `meta/<digest>.json` and
//! `text/<digest>.json`. A real embedded-DB adapter is a straight drop-in
//! replacement behind the same trait.

use std::path::{Path, PathBuf};

use oms_catalog::model_db::{ModelDb, ModelDicRow};
use oms_catalog::CatalogError;
use oms_core::{ModelDigest, ModelMeta, ModelTextMeta};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ModelDicJson {
    digest: String,
    name: String,
    version: String,
    default_lang: String,
}

pub struct JsonModelDb {
    meta_dir: PathBuf,
    text_dir: PathBuf,
}

impl JsonModelDb {
    pub fn new(meta_dir: impl Into<PathBuf>, text_dir: impl Into<PathBuf>) -> Self {
        Self {
            meta_dir: meta_dir.into(),
            text_dir: text_dir.into(),
        }
    }

    fn read_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Result<T, CatalogError> {
        if !path.exists() {
            return Ok(T::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| CatalogError::Scan {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| CatalogError::Db(format!("{}: {e}", path.display())))
    }
}

impl ModelDb for JsonModelDb {
    fn read_model_dic(&self, db_path: &Path) -> Result<ModelDicRow, CatalogError> {
        let text = std::fs::read_to_string(db_path).map_err(|e| CatalogError::Scan {
            path: db_path.to_path_buf(),
            source: e,
        })?;
        let row: ModelDicJson =
            serde_json::from_str(&text).map_err(|e| CatalogError::Db(format!("{}: {e}", db_path.display())))?;
        Ok(ModelDicRow {
            digest: ModelDigest::new(row.digest),
            name: row.name,
            version: row.version,
            default_lang: row.default_lang,
        })
    }

    fn load_meta(&self, digest: &ModelDigest) -> Result<ModelMeta, CatalogError> {
        let path = self.meta_dir.join(format!("{digest}.json"));
        Self::read_json(&path)
    }

    fn load_text(&self, digest: &ModelDigest) -> Result<ModelTextMeta, CatalogError> {
        let path = self.text_dir.join(format!("{digest}.json"));
        Self::read_json(&path)
    }
}

#[cfg(test)]
#[path = "json_model_db_tests.rs"]
mod tests;
