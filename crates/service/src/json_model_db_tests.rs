use super::*;
use oms_core::ModelMeta;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn reads_model_dic_row_from_json() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("Model1.db");
    write(
        tmp.path(),
        "Model1.db",
        r#"{"digest":"abc123","name":"Model1","version":"1.0","default_lang":"en-US"}"#,
    );
    let db = JsonModelDb::new(tmp.path().join("meta"), tmp.path().join("text"));

    let row = db.read_model_dic(&db_path).unwrap();

    assert_eq!(row.digest, ModelDigest::new("abc123"));
    assert_eq!(row.name, "Model1");
    assert_eq!(row.version, "1.0");
    assert_eq!(row.default_lang, "en-US");
}

#[test]
fn read_model_dic_rejects_malformed_json() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("Model1.db");
    write(tmp.path(), "Model1.db", "not json");
    let db = JsonModelDb::new(tmp.path().join("meta"), tmp.path().join("text"));

    let err = db.read_model_dic(&db_path).unwrap_err();

    assert!(matches!(err, CatalogError::Db(_)));
}

#[test]
fn missing_meta_file_yields_default() {
    let tmp = TempDir::new().unwrap();
    let db = JsonModelDb::new(tmp.path().join("meta"), tmp.path().join("text"));

    let meta = db.load_meta(&ModelDigest::new("abc123")).unwrap();

    assert_eq!(meta, ModelMeta::default());
}

#[test]
fn loads_meta_when_present() {
    let tmp = TempDir::new().unwrap();
    let meta_dir = tmp.path().join("meta");
    std::fs::create_dir_all(&meta_dir).unwrap();
    write(&meta_dir, "abc123.json", r#"{"types":[],"params":[],"tables":[],"entities":[],"groups":[]}"#);
    let db = JsonModelDb::new(meta_dir, tmp.path().join("text"));

    let meta = db.load_meta(&ModelDigest::new("abc123")).unwrap();

    assert_eq!(meta, ModelMeta::default());
}
