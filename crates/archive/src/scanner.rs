// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Archive Scanner (spec §4.4): once per long interval, selects runs
//! and worksets older than the archive cutoff for archiving, and runs and
//! worksets updated within the alert cutoff's window for alerting (see
//! `SPEC_FULL.md` §9.1(c)), applying the baseline-run/default-workset/
//! read-write/keep-list exclusions, and persists the aggregate result.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use oms_catalog::Catalog;
use oms_config::Config;
use oms_core::{Clock, ModelBasic};
use tokio::sync::Notify;
use tracing::{error, info, instrument, warn};

use crate::archive_db::{ArchiveDb, RunRecord, WorksetRecord};
use crate::error::ArchiveError;
use crate::state::{ArchiveState, ModelArchiveState};

const KEEP_ALL_RUNS: &str = "KEEP-ALL-RUNS";
const KEEP_ALL_SETS: &str = "KEEP-ALL-SETS";
/// Default per spec §4.4: "On more than N consecutive write failures,
/// disable archiving and exit."
const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Runs the periodic scan and owns the self-disable state. Background
/// tasks never surface errors to callers (spec §7) — `scan_and_persist`
/// logs and swallows every failure itself.
pub struct ArchiveScanner {
    config: Arc<Config>,
    catalog: Catalog,
    db: Arc<dyn ArchiveDb>,
    clock: Arc<dyn Clock>,
    state_path: PathBuf,
    max_consecutive_failures: u32,
    consecutive_failures: AtomicU32,
    disabled: AtomicBool,
}

impl ArchiveScanner {
    pub fn new(config: Arc<Config>, catalog: Catalog, db: Arc<dyn ArchiveDb>, clock: Arc<dyn Clock>, state_path: PathBuf) -> Self {
        Self {
            config,
            catalog,
            db,
            clock,
            state_path,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            consecutive_failures: AtomicU32::new(0),
            disabled: AtomicBool::new(false),
        }
    }

    pub fn with_max_consecutive_failures(mut self, n: u32) -> Self {
        self.max_consecutive_failures = n;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Computes the full archive/alert selection for every model
    /// currently registered in the catalog, without touching disk.
    #[instrument(skip(self))]
    pub fn scan(&self) -> Result<ArchiveState, ArchiveError> {
        let now = self.clock.now();
        let archive_cutoff = now - ChronoDuration::days(self.config.archive.days.max(0));
        let alert_cutoff = now - ChronoDuration::days(self.config.archive.alert_days.max(0));

        let keep_all_runs = self.config.archive.keep_runs.iter().any(|k| k == KEEP_ALL_RUNS);
        let keep_all_sets = self.config.archive.keep_sets.iter().any(|k| k == KEEP_ALL_SETS);
        let keep_runs: std::collections::HashSet<&str> = self.config.archive.keep_runs.iter().map(String::as_str).collect();
        let keep_sets: std::collections::HashSet<&str> = self.config.archive.keep_sets.iter().map(String::as_str).collect();

        let models: Vec<ModelBasic> = self.catalog.all_models();
        let mut model_states = Vec::with_capacity(models.len());

        for model in &models {
            let runs = self.db.list_runs(&model.digest)?;
            let worksets = self.db.list_worksets(&model.digest)?;

            let run = if keep_all_runs {
                Vec::new()
            } else {
                select_runs(&runs, archive_cutoff, &keep_runs, Window::OlderThan)
            };
            let run_alert = if keep_all_runs {
                Vec::new()
            } else {
                select_runs(&runs, alert_cutoff, &keep_runs, Window::WithinLast)
            };
            let set = if keep_all_sets {
                Vec::new()
            } else {
                select_worksets(&worksets, archive_cutoff, &keep_sets, Window::OlderThan)
            };
            let set_alert = if keep_all_sets {
                Vec::new()
            } else {
                select_worksets(&worksets, alert_cutoff, &keep_sets, Window::WithinLast)
            };

            model_states.push(ModelArchiveState {
                model_digest: model.digest.clone(),
                model_name: model.name.clone(),
                run,
                set,
                run_alert,
                set_alert,
            });
        }

        Ok(ArchiveState {
            is_archive: self.config.archive.enabled,
            archive_days: self.config.archive.days,
            alert_days: self.config.archive.alert_days,
            archive_date_time: archive_cutoff,
            alert_date_time: alert_cutoff,
            update_date_time: now,
            model: model_states,
        })
    }

    /// Runs one scan and persists its result, tracking consecutive
    /// failures and self-disabling once the limit is reached (spec
    /// §4.4.1). Never returns an error — failures are logged at `error`.
    #[instrument(skip(self))]
    pub fn scan_and_persist(&self) {
        if self.is_disabled() {
            return;
        }
        let state = match self.scan() {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "archive scan failed");
                self.record_failure();
                return;
            }
        };
        match state.persist(&self.state_path) {
            Ok(()) => {
                self.consecutive_failures.store(0, Ordering::SeqCst);
                info!(models = state.model.len(), "archive state persisted");
            }
            Err(err) => {
                warn!(error = %err, "failed to persist archive state");
                self.record_failure();
            }
        }
    }

    fn record_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= self.max_consecutive_failures {
            self.disabled.store(true, Ordering::SeqCst);
            error!(failures, "archive scanner disabled after repeated failures");
        }
    }

    /// The periodic background task (spec §4.4.1): runs independently of
    /// the Controller tick loop, stopping either on `shutdown` or once
    /// `scan_and_persist` has self-disabled.
    pub async fn run(self: Arc<Self>, interval: std::time::Duration, shutdown: Arc<Notify>) {
        if !self.config.archive.enabled {
            return;
        }
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.is_disabled() {
                        break;
                    }
                    self.scan_and_persist();
                }
                _ = shutdown.notified() => break,
            }
        }
    }
}

/// Which side of `cutoff` a selection keeps. `Run`/`Set` (the archive
/// candidates) keep entities *older than* the cutoff; `RunAlert`/
/// `SetAlert` keep entities updated *within* the last `AlertDays` instead
/// — see `SPEC_FULL.md` §9.1(c) for why the alert list uses the opposite
/// side of its cutoff from the archive list.
#[derive(Clone, Copy)]
enum Window {
    OlderThan,
    WithinLast,
}

impl Window {
    fn matches(self, update_date_time: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
        match self {
            Window::OlderThan => update_date_time < cutoff,
            Window::WithinLast => update_date_time >= cutoff,
        }
    }
}

fn select_runs(runs: &[RunRecord], cutoff: DateTime<Utc>, keep: &std::collections::HashSet<&str>, window: Window) -> Vec<String> {
    let Some(baseline_id) = runs.iter().map(|r| r.run_id).min() else {
        return Vec::new();
    };
    runs.iter()
        .filter(|r| r.run_id != baseline_id)
        .filter(|r| window.matches(r.update_date_time, cutoff))
        .filter(|r| !keep.contains(r.run_stamp.as_str()))
        .map(|r| r.run_stamp.clone())
        .collect()
}

fn select_worksets(
    worksets: &[WorksetRecord],
    cutoff: DateTime<Utc>,
    keep: &std::collections::HashSet<&str>,
    window: Window,
) -> Vec<String> {
    worksets
        .iter()
        .filter(|w| !w.is_default)
        .filter(|w| w.is_readonly)
        .filter(|w| window.matches(w.update_date_time, cutoff))
        .filter(|w| !keep.contains(w.name.as_str()))
        .map(|w| w.name.clone())
        .collect()
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
