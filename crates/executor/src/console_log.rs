// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run console log: `models/log/<modelName>.<runStamp>.console.log`
//! with a fixed header block (spec §4.2 step 3). Writes from both pipe
//! readers serialize through one `tokio::sync::Mutex`-guarded file handle
//! so lines interleave safely without cross-file ordering guarantees
//! (spec §5).

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::ExecutorError;

pub fn console_log_path(log_dir: &Path, model_name: &str, run_stamp: &str) -> PathBuf {
    log_dir.join(format!("{model_name}.{run_stamp}.console.log"))
}

/// A console log file shared by the two pipe-pumping reader tasks for one
/// run.
#[derive(Clone)]
pub struct ConsoleLog {
    file: Arc<Mutex<File>>,
    path: PathBuf,
}

impl ConsoleLog {
    pub async fn create(path: PathBuf, argv: &[String], run_stamp: &str) -> Result<Self, ExecutorError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ExecutorError::ConsoleLog { path: path.clone(), source: e })?;
        }
        let mut file = File::create(&path)
            .await
            .map_err(|e| ExecutorError::ConsoleLog { path: path.clone(), source: e })?;

        let header = format!(
            "--- run {run_stamp} started {} ---\ncommand line: {}\n\n",
            Utc::now().to_rfc3339(),
            argv.join(" "),
        );
        file.write_all(header.as_bytes())
            .await
            .map_err(|e| ExecutorError::ConsoleLog { path: path.clone(), source: e })?;

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append_line(&self, line: &str) {
        let mut file = self.file.lock().await;
        let _ = file.write_all(line.as_bytes()).await;
        let _ = file.write_all(b"\n").await;
    }

    pub async fn append_trailer(&self, status: &str, exit_code: Option<i32>) {
        let mut file = self.file.lock().await;
        let trailer = match exit_code {
            Some(code) => format!("\n--- run finished: {status} (exit code {code}) ---\n"),
            None => format!("\n--- run finished: {status} ---\n"),
        };
        let _ = file.write_all(trailer.as_bytes()).await;
    }
}

/// Reads the last `n` lines of `path` for error-sentinel classification
/// (spec §4.2: "a fixed scan of the last N lines of the log").
pub async fn tail_lines(path: &Path, n: usize) -> Vec<String> {
    let Ok(contents) = tokio::fs::read_to_string(path).await else {
        return Vec::new();
    };
    let all: Vec<&str> = contents.lines().collect();
    let start = all.len().saturating_sub(n);
    all[start..].iter().map(|s| s.to_string()).collect()
}

/// True if any of `lines` starts with the literal token `Error` at line
/// start, case-insensitively (spec §4.2).
pub fn contains_error_sentinel(lines: &[String]) -> bool {
    lines.iter().any(|line| line.trim_start().to_ascii_lowercase().starts_with("error"))
}

#[cfg(test)]
#[path = "console_log_tests.rs"]
mod tests;
