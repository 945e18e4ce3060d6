use super::*;
use tempfile::TempDir;

#[test]
fn missing_file_yields_empty_lists() {
    let tmp = TempDir::new().unwrap();
    let db = JsonArchiveDb::new(tmp.path().join("archive-db.json"));
    let digest = ModelDigest::new("abc123");

    assert!(db.list_runs(&digest).unwrap().is_empty());
    assert!(db.list_worksets(&digest).unwrap().is_empty());
}

#[test]
fn reads_runs_and_worksets_for_known_digest() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("archive-db.json");
    std::fs::write(
        &path,
        r#"{
            "models": {
                "abc123": {
                    "runs": [
                        {"run_id": 1, "run_stamp": "baseline", "update_date_time": "2026-01-01T00:00:00Z"},
                        {"run_id": 2, "run_stamp": "later", "update_date_time": "2026-02-01T00:00:00Z"}
                    ],
                    "worksets": [
                        {"set_id": 1, "name": "Default", "is_default": true, "is_readonly": false, "update_date_time": "2026-01-01T00:00:00Z"}
                    ]
                }
            }
        }"#,
    )
    .unwrap();
    let db = JsonArchiveDb::new(path);
    let digest = ModelDigest::new("abc123");

    let runs = db.list_runs(&digest).unwrap();
    let worksets = db.list_worksets(&digest).unwrap();

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_stamp, "baseline");
    assert_eq!(worksets.len(), 1);
    assert!(worksets[0].is_default);
}

#[test]
fn unknown_digest_yields_empty_lists() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("archive-db.json");
    std::fs::write(&path, r#"{"models": {}}"#).unwrap();
    let db = JsonArchiveDb::new(path);

    let runs = db.list_runs(&ModelDigest::new("nope")).unwrap();

    assert!(runs.is_empty());
}
