// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! omsd — the model-hosting service. Background process the `oms` CLI
//! talks to over a Unix socket; owns the Job Controller tick loop and the
//! Archive Scanner.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;
use std::time::Duration;

use oms_config::Config;
use oms_service::lifecycle::{self, LifecycleError, ServiceHandles};
use oms_service::listener::{ListenCtx, Listener};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;
const STARTUP_MARKER_PREFIX: &str = "--- omsd: starting (pid: ";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("omsd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("omsd {}", env!("CARGO_PKG_VERSION"));
                println!("Model hosting service — background process controlling model runs.");
                println!();
                println!("USAGE:");
                println!("    omsd");
                println!();
                println!("omsd is typically started by the `oms` CLI and should not be invoked");
                println!("directly. It listens on a Unix socket for commands from `oms`.");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("usage: omsd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Arc::new(Config::load()?);
    let log_path = config.log_dir.join("omsd.log");

    rotate_log_if_needed(&log_path);
    write_startup_marker(&log_path)?;
    let log_guard = setup_logging(&log_path)?;

    info!("starting omsd");

    let ServiceHandles {
        paths,
        socket,
        controller,
        catalog,
        completion_rx,
        archive_scanner,
        ..
    } = match lifecycle::startup(Arc::clone(&config)).await {
        Ok(h) => h,
        Err(LifecycleError::LockFailed(e)) => {
            eprintln!("omsd is already running: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            write_startup_error(&log_path, &e);
            error!(error = %e, "failed to start omsd");
            drop(log_guard);
            return Err(e.into());
        }
    };

    let shutdown_notify = Arc::new(Notify::new());

    let ctx = Arc::new(ListenCtx {
        controller: controller.clone(),
        catalog,
        config: Arc::clone(&config),
        models_scan_root: config.models_dir.clone(),
        shutdown: Arc::clone(&shutdown_notify),
    });
    let listener = Listener::new(socket, ctx);
    tokio::spawn(listener.run());

    let archive_shutdown = Arc::clone(&shutdown_notify);
    tokio::spawn(Arc::clone(&archive_scanner).run(Duration::from_secs(3600), archive_shutdown));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(socket = %paths.socket_path.display(), "omsd ready");
    println!("READY");

    let controller_run = controller.clone();
    let controller_shutdown = Arc::clone(&shutdown_notify);
    let controller_task = tokio::spawn(async move {
        controller_run.run(completion_rx, controller_shutdown).await;
    });

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    shutdown_notify.notify_waiters();
    let _ = controller_task.await;

    lifecycle::shutdown(&paths);
    info!("omsd stopped");
    Ok(())
}

fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }
    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn write_startup_marker(log_path: &std::path::Path) -> std::io::Result<()> {
    use std::io::Write;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(log_path)?;
    writeln!(file, "{}{}) ---\n", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

fn write_startup_error(log_path: &std::path::Path, error: &LifecycleError) {
    use std::io::Write;
    let Ok(mut file) = std::fs::OpenOptions::new().create(true).append(true).open(log_path) else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start omsd: {error}");
}

fn setup_logging(log_path: &std::path::Path) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let parent = log_path.parent().unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(parent)?;
    let file_name = log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("omsd.log"));
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
