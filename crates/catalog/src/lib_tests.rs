// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::FakeModelDb;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn catalog_with(db: FakeModelDb) -> Catalog {
    Catalog::new(Arc::new(db))
}

#[test]
fn refresh_models_registers_discovered_models() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("RiskPaths.sqlite"), b"").unwrap();
    fs::write(dir.path().join("RiskPaths"), b"").unwrap();

    let catalog = catalog_with(FakeModelDb::with_model("d1", "RiskPaths", "EN"));
    let diff = catalog.refresh_models(dir.path()).unwrap();

    assert_eq!(diff.added, vec![ModelDigest::new("d1")]);
    assert!(diff.removed.is_empty());
    assert!(catalog.model_by("d1").is_some());
    assert!(catalog.model_by("RiskPaths").is_some());
}

#[test]
fn refresh_models_reports_removed_digests() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("RiskPaths.sqlite"), b"").unwrap();
    fs::write(dir.path().join("RiskPaths"), b"").unwrap();

    let catalog = catalog_with(FakeModelDb::with_model("d1", "RiskPaths", "EN"));
    catalog.refresh_models(dir.path()).unwrap();

    fs::remove_file(dir.path().join("RiskPaths.sqlite")).unwrap();
    let diff = catalog.refresh_models(dir.path()).unwrap();
    assert_eq!(diff.removed, vec![ModelDigest::new("d1")]);
    assert!(catalog.model_by("d1").is_none());
}

#[test]
fn close_models_clears_everything() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("RiskPaths.sqlite"), b"").unwrap();
    fs::write(dir.path().join("RiskPaths"), b"").unwrap();

    let catalog = catalog_with(FakeModelDb::with_model("d1", "RiskPaths", "EN"));
    catalog.refresh_models(dir.path()).unwrap();
    catalog.close_models();

    assert!(catalog.model_by("d1").is_none());
    assert!(catalog.all_models().is_empty());
}

#[test]
fn load_meta_fails_for_unregistered_model() {
    let catalog = catalog_with(FakeModelDb::empty());
    let err = catalog.load_meta(&ModelDigest::new("missing")).unwrap_err();
    assert!(matches!(err, CatalogError::ModelNotFound(_)));
}

#[test]
fn load_meta_caches_after_first_call() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("RiskPaths.sqlite"), b"").unwrap();
    fs::write(dir.path().join("RiskPaths"), b"").unwrap();
    let db = FakeModelDb::with_model("d1", "RiskPaths", "EN");
    db.set_meta("d1", ModelMeta::default());
    let catalog = catalog_with(db);
    catalog.refresh_models(dir.path()).unwrap();

    let first = catalog.load_meta(&ModelDigest::new("d1")).unwrap();
    let second = catalog.load_meta(&ModelDigest::new("d1")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn match_language_uses_default_when_no_text_rows() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("RiskPaths.sqlite"), b"").unwrap();
    fs::write(dir.path().join("RiskPaths"), b"").unwrap();
    let catalog = catalog_with(FakeModelDb::with_model("d1", "RiskPaths", "EN"));
    catalog.refresh_models(dir.path()).unwrap();

    let (matched, default) = catalog.match_language(&ModelDigest::new("d1"), &["fr".to_string()]).unwrap();
    assert_eq!(matched, "EN");
    assert_eq!(default, "EN");
}
