use super::*;
use oms_config::Config;
use tempfile::TempDir;

fn test_config(tmp: &TempDir) -> Arc<Config> {
    let home = tmp.path().join("home");
    Arc::new(Config {
        home_dir: home.clone(),
        models_dir: home.join("models"),
        log_dir: home.join("log"),
        download_dir: home.join("download"),
        upload_dir: home.join("upload"),
        archive: oms_config::ArchiveConfig {
            enabled: false,
            ..oms_config::ArchiveConfig::default()
        },
        ..Config::default()
    })
}

#[tokio::test]
async fn startup_creates_directories_and_binds_socket() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);

    let handles = startup(Arc::clone(&config)).await.unwrap();

    assert!(handles.paths.socket_path.exists());
    assert!(handles.paths.models_meta_dir.is_dir());
    assert!(handles.paths.models_text_dir.is_dir());
    assert_eq!(handles.controller.queue_snapshot().len(), 0);
    assert_eq!(handles.catalog.all_models().len(), 0);

    crate::lifecycle::shutdown(&handles.paths);
    assert!(!handles.paths.socket_path.exists());
}

#[tokio::test]
async fn second_startup_against_same_home_fails_to_lock() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);

    let first = startup(Arc::clone(&config)).await.unwrap();
    let second = startup(Arc::clone(&config)).await;

    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
    drop(first);
}
