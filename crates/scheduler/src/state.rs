// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory mirror of the job-state directory (spec §4.1, §5): queue,
//! active and history maps keyed by `SubmitStamp`. Every mutation here is
//! made under the Controller's single mutex; nothing in this module
//! performs its own locking.

use std::collections::{HashMap, HashSet};

use oms_core::{ComputeUse, RunJob, RunState, RunStatus, SubmitStamp};
use oms_storage::{JobFileName, JobRecord, JobStateDir, JobStore};

/// A queued job. `owned` is false for a job adopted from a peer instance's
/// queue file — this instance tracks it for queries but never dispatches
/// it (spec §4.1 Reconcile).
pub(crate) struct QueuedJob {
    pub job: RunJob,
    pub file_name: JobFileName,
    pub owned: bool,
}

pub(crate) struct ActiveJob {
    pub job: RunJob,
    pub file_name: JobFileName,
    pub compute_uses: Vec<ComputeUse>,
    pub state: RunState,
    pub owned: bool,
    /// Set once `StopModelRun` has sent the terminate signal, so a second
    /// call is a no-op until harvest clears the entry (idempotency).
    pub kill_requested: bool,
}

pub(crate) struct HistoryEntry {
    pub state: RunState,
    pub file_name: JobFileName,
}

#[derive(Default)]
pub struct ControllerState {
    pub(crate) queue: Vec<QueuedJob>,
    pub(crate) active: HashMap<SubmitStamp, ActiveJob>,
    pub(crate) history: HashMap<SubmitStamp, HistoryEntry>,
}

impl ControllerState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sum of CPU committed to active jobs this instance itself dispatched
    /// (spec invariant 2: `Σ active CPU ≤ GlobalCpu`).
    pub(crate) fn owned_active_cpu(&self) -> u32 {
        self.active.values().filter(|a| a.owned).map(|a| a.job.computed.cpu).sum()
    }

    /// Sum of CPU committed to jobs adopted from peer instances — these
    /// still consume the shared global budget even though this instance
    /// never dispatched them (spec §4.1 Admit: `available = globalCPU −
    /// Σ active CPU − Σ peer active CPU`).
    pub(crate) fn peer_active_cpu(&self) -> u32 {
        self.active.values().filter(|a| !a.owned).map(|a| a.job.computed.cpu).sum()
    }

    pub(crate) fn owned_active_cpu_for_user(&self, user: &str) -> u32 {
        self.active
            .values()
            .filter(|a| a.owned && a.job.user.as_deref() == Some(user))
            .map(|a| a.job.computed.cpu)
            .sum()
    }
}

/// Reconciles the in-memory maps against the job-state directories on
/// disk: files unknown in memory are adopted, in-memory entries whose
/// file has disappeared are dropped (spec §4.1 Reconcile). Entries this
/// instance already owns are left untouched — their file is presumed
/// present because this instance is the one that wrote it.
pub(crate) fn reconcile(state: &mut ControllerState, job_store: &JobStore) -> oms_core::Result<()> {
    reconcile_queue(state, job_store)?;
    reconcile_active(state, job_store)?;
    reconcile_history(state, job_store)?;
    Ok(())
}

fn reconcile_queue(state: &mut ControllerState, job_store: &JobStore) -> oms_core::Result<()> {
    let disk = job_store.list(JobStateDir::Queue)?;
    let disk_stamps: HashSet<SubmitStamp> = disk.iter().map(|f| f.submit_stamp).collect();

    state.queue.retain(|q| disk_stamps.contains(&q.file_name.submit_stamp));

    let known: HashSet<SubmitStamp> = state.queue.iter().map(|q| q.file_name.submit_stamp).collect();
    let mut adopted = Vec::new();
    for file_name in &disk {
        if known.contains(&file_name.submit_stamp) {
            continue;
        }
        if let Ok(record) = job_store.read(JobStateDir::Queue, file_name) {
            adopted.push(QueuedJob {
                job: record.job,
                file_name: file_name.clone(),
                owned: false,
            });
        }
    }
    // Newly adopted peer entries are appended in their own disk order;
    // this instance's own queue order (which `MoveJobInQueue` may have
    // explicitly reordered) is left untouched rather than re-sorted.
    adopted.sort_by_key(|q| q.file_name.submit_stamp);
    state.queue.extend(adopted);
    Ok(())
}

fn reconcile_active(state: &mut ControllerState, job_store: &JobStore) -> oms_core::Result<()> {
    let disk = job_store.list(JobStateDir::Active)?;
    let disk_stamps: HashSet<SubmitStamp> = disk.iter().map(|f| f.submit_stamp).collect();

    state.active.retain(|stamp, _| disk_stamps.contains(stamp));

    for file_name in &disk {
        if state.active.contains_key(&file_name.submit_stamp) {
            continue;
        }
        if let Ok(record) = job_store.read(JobStateDir::Active, file_name) {
            let run_state = RunState {
                model_digest: record.job.model_digest.clone(),
                model_name: record.job.model_name.clone(),
                run_stamp: record.job.run_stamp.clone(),
                submit_stamp: record.job.submit_stamp,
                update_date_time: chrono::Utc::now(),
                status: RunStatus::Progress,
                is_final: false,
                compute_uses: record.compute_uses.clone(),
                exit_code: None,
            };
            state.active.insert(
                file_name.submit_stamp,
                ActiveJob {
                    job: record.job,
                    file_name: file_name.clone(),
                    compute_uses: record.compute_uses,
                    state: run_state,
                    owned: false,
                    kill_requested: false,
                },
            );
        }
    }
    Ok(())
}

fn reconcile_history(state: &mut ControllerState, job_store: &JobStore) -> oms_core::Result<()> {
    let disk = job_store.list(JobStateDir::History)?;
    for file_name in &disk {
        if state.history.contains_key(&file_name.submit_stamp) {
            continue;
        }
        if let Ok(record) = job_store.read(JobStateDir::History, file_name) {
            let status = record.final_status.or(file_name.final_status).unwrap_or(RunStatus::Error);
            let run_state = RunState {
                model_digest: record.job.model_digest.clone(),
                model_name: record.job.model_name.clone(),
                run_stamp: record.job.run_stamp.clone(),
                submit_stamp: record.job.submit_stamp,
                update_date_time: chrono::Utc::now(),
                status,
                is_final: true,
                compute_uses: record.compute_uses,
                exit_code: None,
            };
            state.history.insert(
                file_name.submit_stamp,
                HistoryEntry {
                    state: run_state,
                    file_name: file_name.clone(),
                },
            );
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
