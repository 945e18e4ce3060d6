// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Run Executor (spec §4.2): owns the lifetime of exactly one child
//! process per active job — argv resolution, console log, pipe-pumping
//! reader tasks, completion classification and `Kill()`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use oms_core::{ComputeUse, HostIni, RunJob, RunState, RunStatus, SubmitStamp};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::argv::{build_argv, mpi_wrap};
use crate::console_log::{console_log_path, contains_error_sentinel, tail_lines, ConsoleLog};
use crate::error::ExecutorError;

/// Everything the Executor needs to start one job (spec §4.2 `Start()`).
/// Hosting directories/MPI settings are resolved by the caller (the
/// Controller, reading `oms-config`) and passed in explicitly — the
/// executor crate has no config dependency of its own.
pub struct SpawnRequest {
    pub job: RunJob,
    pub model_exe: PathBuf,
    pub bin_dir: PathBuf,
    pub log_dir: PathBuf,
    pub mpi_exe: String,
    pub mpi_args: Vec<String>,
    pub host_ini: HostIni,
    pub compute_uses: Vec<ComputeUse>,
    /// Open Question (b): if set, the sentinel file's contents (read after
    /// exit, relative to `bin_dir`) decide success/exit/error instead of
    /// the exit-code-plus-log-scan rule.
    pub completion_sentinel: Option<String>,
    pub log_scan_lines: usize,
}

/// Posted on the bounded completion channel when a child exits (spec §4.2).
#[derive(Debug, Clone)]
pub struct Completion {
    pub submit_stamp: SubmitStamp,
    pub final_status: RunStatus,
    pub exit_code: Option<i32>,
}

struct RunningChild {
    pid: u32,
    kill_requested: Arc<AtomicBool>,
}

/// Owns every live child process. Cheap to clone (it's an `Arc` around a
/// mutex of lightweight handles); reader/waiter tasks run independently
/// and report back only through the completion channel, never touching
/// Controller state directly (spec §9).
#[derive(Clone)]
pub struct Executor {
    children: Arc<Mutex<HashMap<SubmitStamp, RunningChild>>>,
    completion_tx: mpsc::Sender<Completion>,
    kill_grace: Duration,
}

impl Executor {
    /// `channel_capacity` backpressures a full channel instead of dropping
    /// completions (spec §5.1). `kill_grace` is the grace period between
    /// the terminate signal and the hard kill (spec §5).
    pub fn new(channel_capacity: usize, kill_grace: Duration) -> (Self, mpsc::Receiver<Completion>) {
        let (tx, rx) = mpsc::channel(channel_capacity);
        (
            Self {
                children: Arc::new(Mutex::new(HashMap::new())),
                completion_tx: tx,
                kill_grace,
            },
            rx,
        )
    }

    /// Starts the child process for `req` and returns the initial
    /// `RunState{Status: progress}` on spawn success (spec §4.2 step 5).
    /// No pipes are opened on spawn failure.
    pub async fn start(&self, req: SpawnRequest) -> Result<RunState, ExecutorError> {
        let submit_stamp = req.job.submit_stamp;
        let run_stamp = req.job.run_stamp.clone();

        let mut mpi_args = req.mpi_args.clone();
        if mpi_wrap(req.job.np, &req.mpi_exe) && !req.host_ini.lines.is_empty() {
            let path = req.log_dir.join(format!("{run_stamp}.hostfile"));
            if let Some(parent) = path.parent() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
            let _ = tokio::fs::write(&path, req.host_ini.render()).await;
            mpi_args.push("--hostfile".to_string());
            mpi_args.push(path.display().to_string());
        }

        let argv = build_argv(&req.job, &req.model_exe, &req.mpi_exe, &mpi_args);
        let program = argv.first().cloned().ok_or_else(|| {
            ExecutorError::Spawn(std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"))
        })?;

        let log_path = console_log_path(&req.log_dir, &req.job.model_name, run_stamp.as_str());
        let console_log = ConsoleLog::create(log_path.clone(), &argv, run_stamp.as_str()).await?;

        let mut cmd = Command::new(&program);
        cmd.args(&argv[1..])
            .current_dir(&req.bin_dir)
            .envs(req.job.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(ExecutorError::Spawn)?;
        let pid = child.id().unwrap_or(0);

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let kill_requested = Arc::new(AtomicBool::new(false));
        self.children.lock().insert(
            submit_stamp,
            RunningChild {
                pid,
                kill_requested: Arc::clone(&kill_requested),
            },
        );

        let stdout_task = spawn_reader(stdout, console_log.clone());
        let stderr_task = spawn_reader(stderr, console_log.clone());

        let children = Arc::clone(&self.children);
        let tx = self.completion_tx.clone();
        let completion_sentinel = req.completion_sentinel.clone();
        let log_scan_lines = req.log_scan_lines;
        let bin_dir = req.bin_dir.clone();

        tokio::spawn(async move {
            let _ = stdout_task.await;
            let _ = stderr_task.await;
            let exit_status = child.wait().await;
            children.lock().remove(&submit_stamp);

            let exit_code = exit_status.as_ref().ok().and_then(|s| s.code());
            let was_killed = kill_requested.load(Ordering::SeqCst);

            let final_status = if was_killed {
                RunStatus::Kill
            } else {
                classify(exit_code, &log_path, &bin_dir, completion_sentinel.as_deref(), log_scan_lines).await
            };

            console_log
                .append_trailer(final_status.as_file_token(), exit_code)
                .await;

            let _ = tx
                .send(Completion {
                    submit_stamp,
                    final_status,
                    exit_code,
                })
                .await;
        });

        Ok(RunState {
            model_digest: req.job.model_digest.clone(),
            model_name: req.job.model_name.clone(),
            run_stamp: req.job.run_stamp.clone(),
            submit_stamp,
            update_date_time: chrono::Utc::now(),
            status: RunStatus::Progress,
            is_final: false,
            compute_uses: req.compute_uses,
            exit_code: None,
        })
    }

    /// Sends the terminate signal to the child for `submit_stamp`; if it
    /// hasn't exited after the configured grace period, sends a hard kill
    /// (spec §5). Returns `false` if no child is currently running for
    /// that stamp.
    pub fn kill(&self, submit_stamp: SubmitStamp) -> bool {
        let pid = {
            let children = self.children.lock();
            let Some(entry) = children.get(&submit_stamp) else {
                return false;
            };
            entry.kill_requested.store(true, Ordering::SeqCst);
            entry.pid
        };

        send_signal(pid, "-15");

        let children = Arc::clone(&self.children);
        let grace = self.kill_grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if children.lock().contains_key(&submit_stamp) {
                send_signal(pid, "-9");
            }
        });

        true
    }

    pub fn is_running(&self, submit_stamp: &SubmitStamp) -> bool {
        self.children.lock().contains_key(submit_stamp)
    }

    /// The OS pid of the running child for `submit_stamp`, if any. Used
    /// only to render the informational `-<pid>` suffix in the `active/`
    /// job-state filename (spec §6) — not part of the liveness contract.
    pub fn pid(&self, submit_stamp: &SubmitStamp) -> Option<u32> {
        self.children.lock().get(submit_stamp).map(|c| c.pid)
    }
}

/// Sends `signal` (`kill(1)` syntax, e.g. `"-15"`) to `pid`, matching this
/// workspace's own daemon-stop idiom of shelling out to `kill` rather than
/// linking a signal-handling crate for one call site.
fn send_signal(pid: u32, signal: &str) -> bool {
    std::process::Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn spawn_reader<R>(pipe: Option<R>, console_log: ConsoleLog) -> tokio::task::JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(pipe) = pipe else { return };
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            console_log.append_line(&line).await;
        }
    })
}

/// Exit-code-plus-log-scan classification (spec §4.2), with the sentinel
/// file override from Open Question (b) checked first when configured.
async fn classify(
    exit_code: Option<i32>,
    log_path: &std::path::Path,
    bin_dir: &std::path::Path,
    completion_sentinel: Option<&str>,
    log_scan_lines: usize,
) -> RunStatus {
    if let Some(sentinel_name) = completion_sentinel {
        let sentinel_path = bin_dir.join(sentinel_name);
        if let Ok(contents) = tokio::fs::read_to_string(&sentinel_path).await {
            let token = contents.trim().to_ascii_lowercase();
            if let Some(status) = RunStatus::from_file_token(&token) {
                return status;
            }
        }
    }

    match exit_code {
        Some(0) => RunStatus::Success,
        Some(_) => {
            let tail = tail_lines(log_path, log_scan_lines).await;
            if contains_error_sentinel(&tail) {
                RunStatus::Error
            } else {
                RunStatus::Exit
            }
        }
        None => RunStatus::Error,
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
