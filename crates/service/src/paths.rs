// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem layout derived from `oms_config::Config::home_dir`. Kept
//! separate from `oms-config` itself because these are service-process
//! concerns (socket, pid, daemon log) rather than scheduling/admission
//! knobs a peer instance or the CLI would ever need to override per spec
//! §6's environment contract.

use oms_config::Config;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServicePaths {
    pub jobs_dir: PathBuf,
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
    pub daemon_log_path: PathBuf,
    pub archive_state_path: PathBuf,
    pub models_meta_dir: PathBuf,
    pub models_text_dir: PathBuf,
    pub archive_db_path: PathBuf,
}

impl ServicePaths {
    pub fn from_config(config: &Config) -> Self {
        Self {
            jobs_dir: config.home_dir.join("jobs"),
            socket_path: config.home_dir.join("oms.sock"),
            pid_path: config.home_dir.join("omsd.pid"),
            daemon_log_path: config.home_dir.join("omsd.log"),
            archive_state_path: config.home_dir.join("archive-state.json"),
            models_meta_dir: config.models_dir.join("meta"),
            models_text_dir: config.models_dir.join("text"),
            archive_db_path: config.home_dir.join("archive-db.json"),
        }
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
