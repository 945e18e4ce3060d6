// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The Model Catalog: a process-wide registry of known models and a cache
//! of their metadata/text, protected by a single mutex (spec §4.3).

pub mod discovery;
pub mod error;
pub mod lang;
pub mod merge_walk;
pub mod model_db;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::CatalogError;
pub use model_db::ModelDb;

use oms_core::{Model, ModelBasic, ModelDigest, ModelMeta, ModelTextMeta};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

struct CatalogState {
    models: HashMap<ModelDigest, Model>,
    meta_cache: HashMap<ModelDigest, ModelMeta>,
    text_cache: HashMap<ModelDigest, ModelTextMeta>,
}

impl CatalogState {
    fn new() -> Self {
        Self {
            models: HashMap::new(),
            meta_cache: HashMap::new(),
            text_cache: HashMap::new(),
        }
    }
}

/// Handle to the process-wide catalog. Cheap to clone (it's an `Arc`
/// around a single mutex); every public method acquires the mutex for the
/// duration of the operation only, matching spec §5's "no nested locking
/// across Catalog and Controller".
#[derive(Clone)]
pub struct Catalog {
    state: Arc<Mutex<CatalogState>>,
    db: Arc<dyn ModelDb>,
}

impl Catalog {
    pub fn new(db: Arc<dyn ModelDb>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CatalogState::new())),
            db,
        }
    }

    /// Scans `scan_root` for model executable/DB pairs and registers any
    /// new ones, returning the digests that were added or removed
    /// relative to the previous registration (spec §4.3 `RefreshModels`).
    pub fn refresh_models(&self, scan_root: &std::path::Path) -> Result<discovery::RefreshDiff, CatalogError> {
        let discovered = discovery::scan_models_dir(scan_root, self.db.as_ref())?;
        let mut state = self.state.lock();

        let before: std::collections::HashSet<ModelDigest> = state.models.keys().cloned().collect();
        let after: std::collections::HashSet<ModelDigest> = discovered.iter().map(|m| m.digest.clone()).collect();

        let added: Vec<ModelDigest> = after.difference(&before).cloned().collect();
        let removed: Vec<ModelDigest> = before.difference(&after).cloned().collect();

        for digest in &removed {
            state.models.remove(digest);
            state.meta_cache.remove(digest);
            state.text_cache.remove(digest);
        }
        for model in discovered {
            state.models.insert(model.digest.clone(), model);
        }

        Ok(discovery::RefreshDiff { added, removed })
    }

    /// Drops every registered model and its cached metadata/text.
    pub fn close_models(&self) {
        let mut state = self.state.lock();
        state.models.clear();
        state.meta_cache.clear();
        state.text_cache.clear();
    }

    /// Looks up a model by digest or by name (first match wins on name
    /// collision, matching spec §3's "multiple models may share a name").
    pub fn model_by(&self, digest_or_name: &str) -> Option<Model> {
        let state = self.state.lock();
        if let Some(model) = state.models.get(&ModelDigest::new(digest_or_name)) {
            return Some(model.clone());
        }
        state.models.values().find(|m| m.name == digest_or_name).cloned()
    }

    pub fn all_models(&self) -> Vec<ModelBasic> {
        let state = self.state.lock();
        state.models.values().map(ModelBasic::from).collect()
    }

    /// Loads full metadata on first demand; cached under the lock
    /// thereafter (spec §4.3 invariant: `isMetaFull[m]` implies
    /// `meta[m]` non-empty).
    pub fn load_meta(&self, digest: &ModelDigest) -> Result<ModelMeta, CatalogError> {
        let mut state = self.state.lock();
        if let Some(meta) = state.meta_cache.get(digest) {
            return Ok(meta.clone());
        }
        if !state.models.contains_key(digest) {
            return Err(CatalogError::ModelNotFound(digest.clone()));
        }
        let meta = self.db.load_meta(digest)?;
        state.meta_cache.insert(digest.clone(), meta.clone());
        Ok(meta)
    }

    /// Loads text metadata; independent of (and may be requested without)
    /// `load_meta` per spec §3 ("text is a superset read that may be
    /// requested independently").
    pub fn load_text(&self, digest: &ModelDigest) -> Result<ModelTextMeta, CatalogError> {
        let mut state = self.state.lock();
        if let Some(text) = state.text_cache.get(digest) {
            return Ok(text.clone());
        }
        if !state.models.contains_key(digest) {
            return Err(CatalogError::ModelNotFound(digest.clone()));
        }
        let text = self.db.load_text(digest)?;
        state.text_cache.insert(digest.clone(), text.clone());
        Ok(text)
    }

    /// BCP-47-style language matching against the model's declared
    /// language list and default language (spec §4.3).
    pub fn match_language(&self, digest: &ModelDigest, preferred: &[String]) -> Result<(String, String), CatalogError> {
        let default_tag = {
            let state = self.state.lock();
            let model = state.models.get(digest).ok_or_else(|| CatalogError::ModelNotFound(digest.clone()))?;
            model.default_lang.clone()
        };

        let text = self.load_text(digest)?;
        let mut available: Vec<String> = text
            .type_text
            .iter()
            .chain(text.param_text.iter())
            .chain(text.table_text.iter())
            .chain(text.entity_text.iter())
            .chain(text.group_text.iter())
            .map(|row| row.lang.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        if available.is_empty() {
            available.push(default_tag.clone());
        }

        let matched = lang::match_language(preferred, &available, &default_tag);
        Ok((matched, default_tag))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
