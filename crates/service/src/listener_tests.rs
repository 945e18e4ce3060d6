use super::*;
use oms_catalog::test_support::FakeModelDb;
use oms_config::Config;
use oms_core::SequentialStampGen;
use oms_storage::JobStore;
use std::time::Duration;
use tempfile::TempDir;

fn make_ctx(dir: &std::path::Path, job_control: bool) -> ListenCtx {
    let models_dir = dir.join("models");
    std::fs::create_dir_all(&models_dir).unwrap();
    let exe_path = models_dir.join("RiskPaths");
    std::fs::write(&exe_path, "#!/bin/sh\nexit 0\n").unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&exe_path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&exe_path, perms).unwrap();
    }
    std::fs::write(models_dir.join("RiskPaths.db"), b"").unwrap();

    let db = FakeModelDb::with_model("digest1", "RiskPaths", "EN");
    let catalog = Catalog::new(Arc::new(db));
    catalog.refresh_models(&models_dir).unwrap();

    let config = Arc::new(Config {
        job_control,
        global_cpu: 8,
        models_dir: models_dir.clone(),
        ..Config::default()
    });
    let job_store = Arc::new(JobStore::new(dir.join("jobs")).unwrap());
    let (executor, _rx) = oms_executor::Executor::new(16, Duration::from_millis(200));
    let stamp_gen: Arc<dyn oms_core::StampGen> = Arc::new(SequentialStampGen::new(1));
    let compute_nodes = vec![oms_core::ComputeNode {
        host: "localhost".to_string(),
        total_cpu: 8,
        total_mem: 0,
        reachable: true,
    }];
    let controller = Controller::new(Arc::clone(&config), catalog.clone(), job_store, executor, stamp_gen, compute_nodes);

    ListenCtx {
        controller,
        catalog,
        config,
        models_scan_root: models_dir,
        shutdown: Arc::new(tokio::sync::Notify::new()),
    }
}

#[tokio::test]
async fn ping_returns_pong() {
    let tmp = TempDir::new().unwrap();
    let ctx = make_ctx(tmp.path(), true);

    let response = dispatch(&ctx, Request::Ping).await;

    assert_eq!(response, Response::Pong);
}

#[tokio::test]
async fn submit_with_job_control_off_runs_immediately() {
    let tmp = TempDir::new().unwrap();
    let ctx = make_ctx(tmp.path(), false);

    let response = submit(
        &ctx,
        "RiskPaths".to_string(),
        1,
        1,
        false,
        std::collections::HashMap::new(),
        oms_core::RunOptions::default(),
        0,
        None,
        None,
    )
    .await;

    match response {
        Response::Submitted { run_state, .. } => assert!(run_state.is_some()),
        other => panic!("expected Submitted, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_with_job_control_on_queues_job() {
    let tmp = TempDir::new().unwrap();
    let ctx = make_ctx(tmp.path(), true);

    let response = submit(
        &ctx,
        "RiskPaths".to_string(),
        1,
        1,
        false,
        std::collections::HashMap::new(),
        oms_core::RunOptions::default(),
        0,
        None,
        None,
    )
    .await;

    match response {
        Response::Submitted { run_state, .. } => assert!(run_state.is_none()),
        other => panic!("expected Submitted, got {other:?}"),
    }

    let queue = ctx.controller.queue_snapshot();
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn submit_unknown_model_returns_error() {
    let tmp = TempDir::new().unwrap();
    let ctx = make_ctx(tmp.path(), true);

    let response = submit(
        &ctx,
        "DoesNotExist".to_string(),
        1,
        1,
        false,
        std::collections::HashMap::new(),
        oms_core::RunOptions::default(),
        0,
        None,
        None,
    )
    .await;

    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn stop_unknown_job_reports_not_found() {
    let tmp = TempDir::new().unwrap();
    let ctx = make_ctx(tmp.path(), true);

    let response = dispatch(
        &ctx,
        Request::Stop {
            model: "RiskPaths".to_string(),
            submit_stamp: 999,
        },
    )
    .await;

    match response {
        Response::Stopped { found, .. } => assert!(!found),
        other => panic!("expected Stopped, got {other:?}"),
    }
}

#[tokio::test]
async fn query_all_models_lists_discovered_model() {
    let tmp = TempDir::new().unwrap();
    let ctx = make_ctx(tmp.path(), true);

    let response = dispatch(&ctx, Request::Query(Query::AllModels)).await;

    match response {
        Response::Models(models) => {
            assert_eq!(models.len(), 1);
            assert_eq!(models[0].name, "RiskPaths");
        }
        other => panic!("expected Models, got {other:?}"),
    }
}
