// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `FakeModelDb`: the in-crate test double for the `ModelDB` port, the
//! same production-vs-test-double shape as `oms_core::id`'s
//! `WallClockStampGen`/`SequentialStampGen` pair. Gated behind
//! `test-support` so production builds never link this in.

use crate::error::CatalogError;
use crate::model_db::{ModelDb, ModelDicRow};
use oms_core::{ModelDigest, ModelMeta, ModelTextMeta, TextRow};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

#[derive(Default)]
pub struct FakeModelDb {
    dics: Mutex<HashMap<String, ModelDicRow>>,
    metas: Mutex<HashMap<ModelDigest, ModelMeta>>,
    texts: Mutex<HashMap<ModelDigest, ModelTextMeta>>,
}

impl FakeModelDb {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers a model keyed by the stem of its `db_path` (`read_model_dic`
    /// is looked up by path in `scan_models_dir`, which always passes the
    /// `.sqlite`/`.db` file it found — this double keys on the file stem so
    /// tests don't need to fabricate a real sqlite file).
    pub fn with_model(digest: &str, name: &str, default_lang: &str) -> Self {
        let db = Self::default();
        db.register(digest, name, default_lang);
        db
    }

    pub fn register(&self, digest: &str, name: &str, default_lang: &str) {
        self.dics.lock().insert(
            name.to_string(),
            ModelDicRow {
                digest: ModelDigest::new(digest),
                name: name.to_string(),
                version: "1.0".to_string(),
                default_lang: default_lang.to_string(),
            },
        );
    }

    pub fn set_text(&self, digest: &str, rows: Vec<TextRow>) {
        let mut text = ModelTextMeta::default();
        text.type_text = rows;
        self.texts.lock().insert(ModelDigest::new(digest), text);
    }

    pub fn set_meta(&self, digest: &str, meta: ModelMeta) {
        self.metas.lock().insert(ModelDigest::new(digest), meta);
    }
}

impl ModelDb for FakeModelDb {
    fn read_model_dic(&self, db_path: &Path) -> Result<ModelDicRow, CatalogError> {
        let stem = db_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CatalogError::Db(format!("no file stem in {}", db_path.display())))?;
        self.dics
            .lock()
            .get(stem)
            .cloned()
            .ok_or_else(|| CatalogError::Db(format!("no model_dic row registered for {stem}")))
    }

    fn load_meta(&self, digest: &ModelDigest) -> Result<ModelMeta, CatalogError> {
        Ok(self.metas.lock().get(digest).cloned().unwrap_or_default())
    }

    fn load_text(&self, digest: &ModelDigest) -> Result<ModelTextMeta, CatalogError> {
        Ok(self.texts.lock().get(digest).cloned().unwrap_or_default())
    }
}
