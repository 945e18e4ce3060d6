// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job Controller (spec §4.1): the single writer of scheduler state.
//! Every public operation acquires `state` for the duration of its
//! in-memory mutation only; filesystem and Executor calls happen outside
//! the lock so a slow disk or a slow spawn never blocks a query.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use oms_catalog::Catalog;
use oms_config::Config;
use oms_core::{
    ComputeNode, Error, ErrorKind, ModelDigest, Result, RunJob, RunOptions, RunStamp, RunState,
    RunStatus, Resources, StampGen, SubmitStamp,
};
use oms_executor::{console_log_path, Executor, SpawnRequest};
use oms_storage::{JobFileName, JobRecord, JobStateDir, JobStore};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};
use tracing::{error, info, warn};

use crate::state::{reconcile, ActiveJob, ControllerState, QueuedJob};

/// Everything a caller supplies for a new run; the Controller assigns
/// `SubmitStamp`/`RunStamp` itself (spec §4.1 `AddJobToQueue`).
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub model_digest: ModelDigest,
    pub threads: u32,
    pub np: u32,
    pub is_not_on_root: bool,
    pub env: HashMap<String, String>,
    pub options: RunOptions,
    pub requested: Resources,
    pub user: Option<String>,
    /// User-suggested run identifier; cleaned and used verbatim if given,
    /// otherwise a timestamp-derived one is assigned (spec §4.1: `RunStamp
    /// = helper.CleanPath(user or timestamp)`).
    pub run_stamp_hint: Option<String>,
}

/// Result of `StopModelRun` (spec §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopOutcome {
    pub found: bool,
    pub submit_stamp: Option<SubmitStamp>,
    pub job_file: Option<PathBuf>,
    pub is_running: bool,
}

/// Reads the last N lines of a run's console log, or from an arbitrary
/// start line (spec §4.1 query surface: pageable by `{startLine, count}`).
fn read_log_range(path: &std::path::Path, start_line: usize, count: i64) -> Vec<String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let all: Vec<&str> = contents.lines().collect();
    let start = start_line.min(all.len());
    let end = if count <= 0 {
        all.len()
    } else {
        (start + count as usize).min(all.len())
    };
    all[start..end].iter().map(|s| s.to_string()).collect()
}

/// Sanitizes a user-suggested run identifier so it is safe to embed in a
/// job-state filename: path separators and other filename-hostile
/// characters become `_`.
fn clean_run_stamp(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
        .collect();
    cleaned.trim_matches('_').to_string()
}

fn timestamp_run_stamp(submit_stamp: SubmitStamp) -> String {
    format!("run-{}", submit_stamp.as_fixed_width())
}

/// The Job Controller handle. Cheap to clone; every clone shares the same
/// state mutex, job store and executor.
#[derive(Clone)]
pub struct Controller {
    state: Arc<Mutex<ControllerState>>,
    config: Arc<Config>,
    catalog: Catalog,
    job_store: Arc<JobStore>,
    executor: Executor,
    stamp_gen: Arc<dyn StampGen>,
    compute_nodes: Vec<ComputeNode>,
}

impl Controller {
    pub fn new(
        config: Arc<Config>,
        catalog: Catalog,
        job_store: Arc<JobStore>,
        executor: Executor,
        stamp_gen: Arc<dyn StampGen>,
        compute_nodes: Vec<ComputeNode>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ControllerState::new())),
            config,
            catalog,
            job_store,
            executor,
            stamp_gen,
            compute_nodes,
        }
    }

    fn build_job(&self, req: JobRequest, submit_stamp: SubmitStamp, run_stamp: RunStamp, model_name: String) -> RunJob {
        let mut job = RunJob {
            submit_stamp,
            run_stamp,
            model_digest: req.model_digest,
            model_name,
            threads: req.threads,
            np: req.np,
            is_not_on_root: req.is_not_on_root,
            env: req.env,
            options: req.options,
            requested: req.requested,
            computed: Resources::default(),
            user: req.user,
        };
        job.compute_resources();
        job
    }

    fn validate_resources(&self, job: &RunJob) -> Result<()> {
        if job.computed.cpu == 0 {
            return Err(Error::new(ErrorKind::InvalidResources, "computed CPU is zero"));
        }
        if self.config.global_cpu > 0 && job.computed.cpu > self.config.global_cpu {
            return Err(Error::new(
                ErrorKind::InvalidResources,
                format!("requested CPU {} exceeds global budget {}", job.computed.cpu, self.config.global_cpu),
            ));
        }
        Ok(())
    }

    /// Validates the model exists, assigns stamps, persists the queue
    /// state file and enqueues in memory (spec §4.1 `AddJobToQueue`).
    pub fn add_job_to_queue(&self, req: JobRequest) -> Result<RunStamp> {
        let model = self
            .catalog
            .model_by(req.model_digest.as_str())
            .ok_or_else(|| Error::new(ErrorKind::ModelNotFound, format!("model {} not found", req.model_digest)))?;

        let submit_stamp = self.stamp_gen.next_stamp();
        let run_stamp_raw = req
            .run_stamp_hint
            .clone()
            .unwrap_or_else(|| timestamp_run_stamp(submit_stamp));
        let run_stamp = RunStamp::new(clean_run_stamp(&run_stamp_raw));

        let job = self.build_job(req, submit_stamp, run_stamp.clone(), model.name.clone());
        self.validate_resources(&job)?;

        let mut state = self.state.lock();
        if state.queue.iter().any(|q| q.file_name.submit_stamp == submit_stamp)
            || state.active.contains_key(&submit_stamp)
            || state.history.contains_key(&submit_stamp)
        {
            return Err(Error::new(ErrorKind::DuplicateStamp, "submit stamp already in use"));
        }
        if state.queue.len() >= self.config.queue_max_len {
            return Err(Error::new(ErrorKind::QueueFull, "queue is at its configured maximum length"));
        }
        drop(state);

        let file_name = JobFileName::queued(job.model_digest.clone(), submit_stamp, job.run_stamp.clone());
        self.job_store
            .write(JobStateDir::Queue, &file_name, &JobRecord::queued(job.clone()))?;

        self.state.lock().queue.push(QueuedJob {
            job,
            file_name,
            owned: true,
        });

        Ok(run_stamp)
    }

    /// Bypasses the queue entirely — used when `JobControl=off` (spec
    /// §4.1 `RunImmediate`). No admission or per-node allocation is
    /// attempted; the job's own computed CPU is recorded as a single
    /// local `ComputeUse` for bookkeeping.
    pub async fn run_immediate(&self, req: JobRequest) -> Result<RunState> {
        let model = self
            .catalog
            .model_by(req.model_digest.as_str())
            .ok_or_else(|| Error::new(ErrorKind::ModelNotFound, format!("model {} not found", req.model_digest)))?;

        let submit_stamp = self.stamp_gen.next_stamp();
        let run_stamp_raw = req
            .run_stamp_hint
            .clone()
            .unwrap_or_else(|| timestamp_run_stamp(submit_stamp));
        let run_stamp = RunStamp::new(clean_run_stamp(&run_stamp_raw));

        let job = self.build_job(req, submit_stamp, run_stamp, model.name.clone());
        self.validate_resources(&job)?;

        let compute_use = oms_core::ComputeUse {
            host: "localhost".to_string(),
            cpu: job.computed.cpu,
            mem: job.computed.mem,
        };

        let run_state = self.spawn_job(job, vec![compute_use], true).await?;
        Ok(run_state)
    }

    /// Spawns `job` via the Executor and, if `track` is set, records it in
    /// the active map under a provisional filename that is rewritten once
    /// the real pid is known (mirrors spec §4.2 step 5's "spawn success
    /// returns progress" without requiring the pid up front).
    async fn spawn_job(&self, job: RunJob, compute_uses: Vec<oms_core::ComputeUse>, track: bool) -> Result<RunState> {
        let model = self
            .catalog
            .model_by(job.model_digest.as_str())
            .ok_or_else(|| Error::new(ErrorKind::ModelNotFound, "model vanished from catalog before dispatch"))?;

        let host_ini = oms_core::HostIni::from_compute_uses(&compute_uses);
        let req = SpawnRequest {
            job: job.clone(),
            model_exe: model.exe_path.clone(),
            bin_dir: model.bin_dir.clone(),
            log_dir: self.config.log_dir.clone(),
            mpi_exe: self.config.mpi.exe.clone(),
            mpi_args: self.config.mpi.args.clone(),
            host_ini,
            compute_uses: compute_uses.clone(),
            completion_sentinel: self.config.executor.completion_sentinel.clone(),
            log_scan_lines: self.config.executor.log_scan_lines,
        };

        let run_state = self.executor.start(req).await?;

        if track {
            let file_name = JobFileName::queued(job.model_digest.clone(), job.submit_stamp, job.run_stamp.clone());
            let pid = self.executor.pid(&job.submit_stamp).unwrap_or(0);
            let active_name = file_name.active(pid);
            let record = JobRecord {
                job: job.clone(),
                compute_uses: compute_uses.clone(),
                final_status: None,
            };
            if let Err(e) = self.job_store.write(JobStateDir::Active, &active_name, &record) {
                warn!(error = %e, "failed to persist active state file for immediate run");
            }
            self.state.lock().active.insert(
                job.submit_stamp,
                ActiveJob {
                    job,
                    file_name: active_name,
                    compute_uses,
                    state: run_state.clone(),
                    owned: true,
                    kill_requested: false,
                },
            );
        }

        Ok(run_state)
    }

    /// Cooperative cancellation (spec §4.1 `StopModelRun`): kills the
    /// active child if the stamp is running, otherwise removes it from
    /// the queue as a pre-dispatch cancel. Idempotent — a second call
    /// after the job has reached history returns `found: false`.
    pub fn stop_model_run(&self, model_digest: &ModelDigest, stamp: SubmitStamp) -> Result<StopOutcome> {
        let mut state = self.state.lock();

        if let Some(active) = state.active.get_mut(&stamp) {
            if &active.job.model_digest != model_digest {
                return Ok(StopOutcome {
                    found: false,
                    submit_stamp: None,
                    job_file: None,
                    is_running: false,
                });
            }
            let job_file = active.file_name.path_in(self.job_store.root(), JobStateDir::Active);
            if !active.kill_requested {
                active.kill_requested = true;
                self.executor.kill(stamp);
            }
            return Ok(StopOutcome {
                found: true,
                submit_stamp: Some(stamp),
                job_file: Some(job_file),
                is_running: true,
            });
        }

        if let Some(idx) = state
            .queue
            .iter()
            .position(|q| q.owned && q.file_name.submit_stamp == stamp && q.job.model_digest == *model_digest)
        {
            let queued = state.queue.remove(idx);
            drop(state);

            let final_status = RunStatus::Kill;
            let hist_name = queued.file_name.finalized(final_status);
            let record = JobRecord {
                job: queued.job.clone(),
                compute_uses: Vec::new(),
                final_status: Some(final_status),
            };
            if let Err(e) = self
                .job_store
                .move_file(JobStateDir::Queue, &queued.file_name, JobStateDir::History, &hist_name, &record)
            {
                error!(error = %e, "failed to move cancelled queue entry to history");
            }

            let run_state = RunState {
                model_digest: queued.job.model_digest.clone(),
                model_name: queued.job.model_name.clone(),
                run_stamp: queued.job.run_stamp.clone(),
                submit_stamp: stamp,
                update_date_time: chrono::Utc::now(),
                status: final_status,
                is_final: true,
                compute_uses: Vec::new(),
                exit_code: None,
            };
            let job_file = hist_name.path_in(self.job_store.root(), JobStateDir::History);
            self.state.lock().history.insert(stamp, crate::state::HistoryEntry {
                state: run_state,
                file_name: hist_name,
            });

            return Ok(StopOutcome {
                found: true,
                submit_stamp: Some(stamp),
                job_file: Some(job_file),
                is_running: false,
            });
        }

        Ok(StopOutcome {
            found: false,
            submit_stamp: None,
            job_file: None,
            is_running: false,
        })
    }

    /// O(n) repositioning under the queue lock (spec §4.1
    /// `MoveJobInQueue`). `position` is clamped to the queue's length.
    pub fn move_job_in_queue(&self, stamp: SubmitStamp, position: usize) -> Result<()> {
        let mut state = self.state.lock();
        let idx = state
            .queue
            .iter()
            .position(|q| q.file_name.submit_stamp == stamp)
            .ok_or_else(|| Error::new(ErrorKind::RunNotFound, "submit stamp not found in queue"))?;
        let entry = state.queue.remove(idx);
        let clamped = position.min(state.queue.len());
        state.queue.insert(clamped, entry);
        Ok(())
    }

    pub fn delete_job_history(&self, stamp: SubmitStamp) -> Result<()> {
        let mut state = self.state.lock();
        let entry = state
            .history
            .remove(&stamp)
            .ok_or_else(|| Error::new(ErrorKind::RunNotFound, "submit stamp not found in history"))?;
        drop(state);
        self.job_store.delete(JobStateDir::History, &entry.file_name)
    }

    pub fn queue_snapshot(&self) -> Vec<RunJob> {
        self.state.lock().queue.iter().map(|q| q.job.clone()).collect()
    }

    pub fn active_snapshot(&self) -> Vec<RunState> {
        self.state.lock().active.values().map(|a| a.state.clone()).collect()
    }

    pub fn history_snapshot(&self) -> Vec<RunState> {
        self.state.lock().history.values().map(|h| h.state.clone()).collect()
    }

    /// Pageable console log read (spec §4.1 query surface): `count <= 0`
    /// means "all from `start_line` to EOF".
    pub fn tail_log(&self, model_name: &str, run_stamp: &RunStamp, start_line: usize, count: i64) -> Vec<String> {
        let path = console_log_path(&self.config.log_dir, model_name, run_stamp.as_str());
        read_log_range(&path, start_line, count)
    }

    /// One reconcile → admit → dispatch cycle (spec §4.1). Called on every
    /// tick of `run`'s main loop.
    pub async fn tick(&self) {
        if let Err(e) = {
            let mut state = self.state.lock();
            reconcile(&mut state, &self.job_store)
        } {
            warn!(error = %e, "reconcile failed, in-memory state left as-is this tick");
        }

        self.admit_and_dispatch().await;
    }

    async fn admit_and_dispatch(&self) {
        loop {
            let candidate = {
                let state = self.state.lock();
                let owned_active = state.owned_active_cpu();
                let peer_active = state.peer_active_cpu();
                let available = self.config.global_cpu.saturating_sub(owned_active + peer_active);

                state
                    .queue
                    .iter()
                    .find(|q| {
                        q.owned
                            && q.job.computed.cpu <= available
                            && self
                                .config
                                .per_user_cpu
                                .map(|limit| {
                                    let used = q.job.user.as_deref().map(|u| state.owned_active_cpu_for_user(u)).unwrap_or(0);
                                    used + q.job.computed.cpu <= limit
                                })
                                .unwrap_or(true)
                    })
                    .map(|q| q.job.submit_stamp)
            };

            let Some(stamp) = candidate else {
                break;
            };

            if !self.dispatch_one(stamp).await {
                // Couldn't fit (e.g. compute-node allocation failed);
                // leave it queued and don't retry it again this tick.
                break;
            }
        }
    }

    /// Dispatches the queued job at `stamp`: allocates compute, moves its
    /// state file to `active/`, and calls the Executor (spec §4.1
    /// Dispatch). Returns `false` if the job could not be dispatched this
    /// tick, in which case it remains queued untouched.
    async fn dispatch_one(&self, stamp: SubmitStamp) -> bool {
        let queued = {
            let mut state = self.state.lock();
            let Some(idx) = state.queue.iter().position(|q| q.file_name.submit_stamp == stamp) else {
                return false;
            };
            state.queue.remove(idx)
        };

        let Some(compute_uses) = oms_core::allocate_compute_uses(&self.compute_nodes, queued.job.computed.cpu) else {
            // Put it back at the head so FIFO order is preserved.
            let mut state = self.state.lock();
            state.queue.insert(0, queued);
            return false;
        };

        let host_ini = oms_core::HostIni::from_compute_uses(&compute_uses);
        let pending_name = queued.file_name.active(0);
        let pending_record = JobRecord {
            job: queued.job.clone(),
            compute_uses: compute_uses.clone(),
            final_status: None,
        };
        if let Err(e) = self.job_store.move_file(
            JobStateDir::Queue,
            &queued.file_name,
            JobStateDir::Active,
            &pending_name,
            &pending_record,
        ) {
            error!(error = %e, "failed to move job state file to active, leaving job queued");
            let mut state = self.state.lock();
            state.queue.insert(0, queued);
            return false;
        }

        let model = match self.catalog.model_by(queued.job.model_digest.as_str()) {
            Some(m) => m,
            None => {
                self.rollback_dispatch_failure(queued, pending_name, compute_uses, "model no longer registered");
                return true;
            }
        };

        let req = SpawnRequest {
            job: queued.job.clone(),
            model_exe: model.exe_path.clone(),
            bin_dir: model.bin_dir.clone(),
            log_dir: self.config.log_dir.clone(),
            mpi_exe: self.config.mpi.exe.clone(),
            mpi_args: self.config.mpi.args.clone(),
            host_ini,
            compute_uses: compute_uses.clone(),
            completion_sentinel: self.config.executor.completion_sentinel.clone(),
            log_scan_lines: self.config.executor.log_scan_lines,
        };

        match self.executor.start(req).await {
            Ok(run_state) => {
                let pid = self.executor.pid(&queued.job.submit_stamp).unwrap_or(0);
                let active_name = queued.file_name.active(pid);
                let record = JobRecord {
                    job: queued.job.clone(),
                    compute_uses: compute_uses.clone(),
                    final_status: None,
                };
                if let Err(e) =
                    self.job_store
                        .move_file(JobStateDir::Active, &pending_name, JobStateDir::Active, &active_name, &record)
                {
                    warn!(error = %e, "failed to rename active state file to its real pid");
                }
                self.state.lock().active.insert(
                    queued.job.submit_stamp,
                    ActiveJob {
                        job: queued.job,
                        file_name: active_name,
                        compute_uses,
                        state: run_state,
                        owned: true,
                        kill_requested: false,
                    },
                );
                info!("dispatched job");
            }
            Err(e) => {
                self.rollback_dispatch_failure(queued, pending_name, compute_uses, &e.to_string());
            }
        }

        true
    }

    fn rollback_dispatch_failure(
        &self,
        queued: QueuedJob,
        pending_name: JobFileName,
        _compute_uses: Vec<oms_core::ComputeUse>,
        reason: &str,
    ) {
        error!(reason, "dispatch failed after moving job to active, rolling back to history as error");
        let hist_name = pending_name.finalized(RunStatus::Error);
        let record = JobRecord {
            job: queued.job.clone(),
            compute_uses: Vec::new(),
            final_status: Some(RunStatus::Error),
        };
        if let Err(e) =
            self.job_store
                .move_file(JobStateDir::Active, &pending_name, JobStateDir::History, &hist_name, &record)
        {
            error!(error = %e, "failed to roll back active state file to history after dispatch error");
        }
        let run_state = RunState {
            model_digest: queued.job.model_digest.clone(),
            model_name: queued.job.model_name.clone(),
            run_stamp: queued.job.run_stamp.clone(),
            submit_stamp: queued.job.submit_stamp,
            update_date_time: chrono::Utc::now(),
            status: RunStatus::Error,
            is_final: true,
            compute_uses: Vec::new(),
            exit_code: None,
        };
        self.state.lock().history.insert(
            queued.job.submit_stamp,
            crate::state::HistoryEntry {
                state: run_state,
                file_name: hist_name,
            },
        );
    }

    /// Applies a completion event from the Executor: moves the job from
    /// `active/` to `history/`, releasing its compute uses (spec §4.1
    /// Harvest).
    fn harvest(&self, completion: oms_executor::Completion) {
        let active = {
            let mut state = self.state.lock();
            state.active.remove(&completion.submit_stamp)
        };
        let Some(active) = active else {
            warn!(submit_stamp = completion.submit_stamp.0, "completion for unknown active job, ignoring");
            return;
        };

        let hist_name = active.file_name.finalized(completion.final_status);
        let record = JobRecord {
            job: active.job.clone(),
            compute_uses: active.compute_uses.clone(),
            final_status: Some(completion.final_status),
        };
        if let Err(e) =
            self.job_store
                .move_file(JobStateDir::Active, &active.file_name, JobStateDir::History, &hist_name, &record)
        {
            error!(error = %e, "failed to move completed job to history");
        }

        let run_state = RunState {
            model_digest: active.job.model_digest,
            model_name: active.job.model_name,
            run_stamp: active.job.run_stamp,
            submit_stamp: completion.submit_stamp,
            update_date_time: chrono::Utc::now(),
            status: completion.final_status,
            is_final: true,
            compute_uses: active.compute_uses,
            exit_code: completion.exit_code,
        };
        self.state.lock().history.insert(
            completion.submit_stamp,
            crate::state::HistoryEntry {
                state: run_state,
                file_name: hist_name,
            },
        );
    }

    /// The Controller's main loop (spec §5): a timer drives
    /// reconcile/admit/dispatch, a bounded channel delivers Executor
    /// completions, and a `Notify` delivers shutdown. Exits once
    /// `shutdown` fires and, after the configured drain window, any still
    /// -active jobs have been hard-killed.
    pub async fn run(&self, mut completion_rx: mpsc::Receiver<oms_executor::Completion>, shutdown: Arc<Notify>) {
        let mut timer = tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.tick().await;
                }
                completion = completion_rx.recv() => {
                    match completion {
                        Some(c) => self.harvest(c),
                        None => break,
                    }
                }
                _ = shutdown.notified() => {
                    info!("shutdown requested, draining active jobs");
                    self.drain(&mut completion_rx).await;
                    break;
                }
            }
        }
    }

    async fn drain(&self, completion_rx: &mut mpsc::Receiver<oms_executor::Completion>) {
        let drain_deadline =
            tokio::time::Instant::now() + Duration::from_secs(self.config.shutdown_drain_seconds);

        loop {
            if self.state.lock().active.is_empty() {
                return;
            }
            tokio::select! {
                completion = completion_rx.recv() => {
                    match completion {
                        Some(c) => self.harvest(c),
                        None => return,
                    }
                }
                _ = tokio::time::sleep_until(drain_deadline) => {
                    break;
                }
            }
        }

        let survivors: Vec<SubmitStamp> = self.state.lock().active.keys().cloned().collect();
        for stamp in survivors {
            self.executor.kill(stamp);
        }
        // Give killed children a moment to post their completions so
        // history reflects `kill` instead of leaving them stranded active.
        let hard_deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if self.state.lock().active.is_empty() {
                return;
            }
            tokio::select! {
                completion = completion_rx.recv() => {
                    match completion {
                        Some(c) => self.harvest(c),
                        None => return,
                    }
                }
                _ = tokio::time::sleep_until(hard_deadline) => {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
