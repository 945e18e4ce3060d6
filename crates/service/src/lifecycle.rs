// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: acquire the instance lock, wire `Catalog` / `JobStore` /
//! `Executor` / `Controller` / `ArchiveScanner` together from `Config`, and
//! bind the Unix socket. Grounded on this workspace's daemon startup
//! sequence, trimmed to what a single-writer job controller needs (no WAL,
//! no snapshot/checkpoint machinery — job state already lives durably in
//! the queue/active/history files spec §5 describes).

use std::path::PathBuf;
use std::sync::Arc;

use oms_catalog::Catalog;
use oms_config::Config;
use oms_core::{ComputeNode, Error as CoreError, SystemClock, WallClockStampGen};
use oms_executor::{Completion, Executor};
use oms_scheduler::Controller;
use oms_storage::{InstanceLock, JobStore};
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::json_archive_db::JsonArchiveDb;
use crate::json_model_db::JsonModelDb;
use crate::paths::ServicePaths;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another instance is already running: {0}")]
    LockFailed(#[source] CoreError),
    #[error("failed to bind socket at {path}: {source}")]
    BindFailed { path: PathBuf, source: std::io::Error },
    #[error("catalog error: {0}")]
    Catalog(#[from] oms_catalog::CatalogError),
    #[error("storage error: {0}")]
    Storage(#[source] CoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything `main` needs to spawn the listener, controller and archive
/// scanner tasks.
pub struct ServiceHandles {
    pub paths: ServicePaths,
    pub socket: UnixListener,
    pub controller: Controller,
    pub catalog: Catalog,
    pub completion_rx: mpsc::Receiver<Completion>,
    pub archive_scanner: Arc<oms_archive::ArchiveScanner>,
    _lock: InstanceLock,
}

/// Runs the full startup sequence: lock, directories, catalog scan, socket
/// bind. Returns everything needed to spawn the long-running tasks.
pub async fn startup(config: Arc<Config>) -> Result<ServiceHandles, LifecycleError> {
    let paths = ServicePaths::from_config(&config);

    let lock = InstanceLock::acquire(&paths.jobs_dir).map_err(LifecycleError::LockFailed)?;

    std::fs::create_dir_all(&paths.models_meta_dir)?;
    std::fs::create_dir_all(&paths.models_text_dir)?;
    std::fs::create_dir_all(&config.log_dir)?;
    std::fs::create_dir_all(&config.download_dir)?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let model_db = Arc::new(JsonModelDb::new(paths.models_meta_dir.clone(), paths.models_text_dir.clone()));
    let catalog = Catalog::new(model_db);
    match catalog.refresh_models(&config.models_dir) {
        Ok(diff) => info!(added = diff.added.len(), removed = diff.removed.len(), "model catalog scanned"),
        Err(e) => warn!(error = %e, "initial model scan failed; starting with an empty catalog"),
    }

    let job_store = Arc::new(JobStore::new(&paths.jobs_dir).map_err(LifecycleError::Storage)?);

    let (executor, completion_rx) = Executor::new(256, std::time::Duration::from_secs(10));

    let stamp_gen = Arc::new(WallClockStampGen);
    let compute_nodes = vec![ComputeNode {
        host: "localhost".to_string(),
        total_cpu: config.global_cpu,
        total_mem: config.global_mem,
        reachable: true,
    }];

    let controller = Controller::new(
        Arc::clone(&config),
        catalog.clone(),
        Arc::clone(&job_store),
        executor,
        stamp_gen,
        compute_nodes,
    );

    let archive_db = Arc::new(JsonArchiveDb::new(paths.archive_db_path.clone()));
    let clock = Arc::new(SystemClock);
    let archive_scanner = Arc::new(
        oms_archive::ArchiveScanner::new(
            Arc::clone(&config),
            catalog.clone(),
            archive_db,
            clock,
            paths.archive_state_path.clone(),
        )
        .with_max_consecutive_failures(5),
    );

    if paths.socket_path.exists() {
        let _ = std::fs::remove_file(&paths.socket_path);
    }
    let socket = UnixListener::bind(&paths.socket_path).map_err(|source| LifecycleError::BindFailed {
        path: paths.socket_path.clone(),
        source,
    })?;

    std::fs::write(&paths.pid_path, std::process::id().to_string())?;

    Ok(ServiceHandles {
        paths,
        socket,
        controller,
        catalog,
        completion_rx,
        archive_scanner,
        _lock: lock,
    })
}

/// Best-effort cleanup of socket/pid files on shutdown. The instance lock
/// releases itself via `Drop`.
pub fn shutdown(paths: &ServicePaths) {
    if paths.socket_path.exists() {
        if let Err(e) = std::fs::remove_file(&paths.socket_path) {
            warn!(error = %e, "failed to remove socket file");
        }
    }
    if paths.pid_path.exists() {
        if let Err(e) = std::fs::remove_file(&paths.pid_path) {
            warn!(error = %e, "failed to remove pid file");
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
