// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process-wide configuration (spec §6's environment contract). Resolved
//! once at startup via a fallback chain — explicit `OMS_*` env var, then a
//! TOML config file, then a hardcoded default — and passed down by
//! explicit dependency injection (spec §9); there is no module-global
//! config singleton.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub enabled: bool,
    pub days: i64,
    pub alert_days: i64,
    pub keep_runs: Vec<String>,
    pub keep_sets: Vec<String>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            days: 30,
            alert_days: 14,
            keep_runs: Vec::new(),
            keep_sets: Vec::new(),
        }
    }
}

/// `exe` empty means MPI is not enabled for this instance — the Executor
/// (spec §4.2 step 1) wraps a job's argv with the launcher only when
/// `Np > 0` *and* `exe` is set; an operator opts in by setting
/// `OMS_MPI_EXE` (or the `Mpi.Exe` config key) to a real launcher path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpiConfig {
    pub exe: String,
    pub args: Vec<String>,
}

impl Default for MpiConfig {
    fn default() -> Self {
        Self {
            exe: String::new(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Override for Open Question (b): if set and present after exit, the
    /// sentinel file's contents decide success/exit/error instead of the
    /// exit-code-plus-log-scan rule.
    pub completion_sentinel: Option<String>,
    pub log_scan_lines: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            completion_sentinel: None,
            log_scan_lines: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub models_dir: PathBuf,
    pub job_control: bool,
    pub global_cpu: u32,
    pub global_mem: u64,
    pub per_user_cpu: Option<u32>,
    pub mpi: MpiConfig,
    pub archive: ArchiveConfig,
    pub log_dir: PathBuf,
    pub download_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub home_dir: PathBuf,
    pub double_fmt: String,
    pub executor: ExecutorConfig,
    pub queue_max_len: usize,
    pub tick_interval_ms: u64,
    pub shutdown_drain_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        let home_dir = default_home_dir();
        Self {
            models_dir: home_dir.join("models"),
            job_control: true,
            global_cpu: 8,
            global_mem: 0,
            per_user_cpu: None,
            mpi: MpiConfig::default(),
            archive: ArchiveConfig::default(),
            log_dir: home_dir.join("log"),
            download_dir: home_dir.join("download"),
            upload_dir: home_dir.join("upload"),
            home_dir,
            double_fmt: "%.15g".to_string(),
            executor: ExecutorConfig::default(),
            queue_max_len: 1000,
            tick_interval_ms: 1000,
            shutdown_drain_seconds: 30,
        }
    }
}

fn default_home_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".local/state/oms"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/oms"))
}

impl Config {
    /// Resolution chain: `OMS_CONFIG_FILE` env var (or the default path)
    /// provides a base, individual `OMS_*` env vars override specific
    /// fields on top of it.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("OMS_CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_file_path());

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OMS_HOME_DIR") {
            let home = PathBuf::from(v);
            self.models_dir = home.join("models");
            self.log_dir = home.join("log");
            self.download_dir = home.join("download");
            self.upload_dir = home.join("upload");
            self.home_dir = home;
        }
        if let Ok(v) = std::env::var("OMS_MODELS_DIR") {
            self.models_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("OMS_JOB_CONTROL") {
            self.job_control = v.eq_ignore_ascii_case("on");
        }
        if let Ok(v) = std::env::var("OMS_GLOBAL_CPU") {
            if let Ok(n) = v.parse() {
                self.global_cpu = n;
            }
        }
        if let Ok(v) = std::env::var("OMS_GLOBAL_MEM") {
            if let Ok(n) = v.parse() {
                self.global_mem = n;
            }
        }
        if let Ok(v) = std::env::var("OMS_PER_USER_CPU") {
            self.per_user_cpu = v.parse().ok();
        }
        if let Ok(v) = std::env::var("OMS_MPI_EXE") {
            self.mpi.exe = v;
        }
        if let Ok(v) = std::env::var("OMS_LOG_DIR") {
            self.log_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("OMS_ARCHIVE_ENABLED") {
            self.archive.enabled = v.eq_ignore_ascii_case("true") || v == "1";
        }
        if let Ok(v) = std::env::var("OMS_ARCHIVE_DAYS") {
            if let Ok(n) = v.parse() {
                self.archive.days = n;
            }
        }
        if let Ok(v) = std::env::var("OMS_ARCHIVE_ALERT_DAYS") {
            if let Ok(n) = v.parse() {
                self.archive.alert_days = n;
            }
        }
        if let Ok(v) = std::env::var("OMS_TICK_INTERVAL_MS") {
            if let Ok(n) = v.parse() {
                self.tick_interval_ms = n;
            }
        }
    }
}

fn default_config_file_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("oms").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("/etc/oms/config.toml"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
