// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use oms_core::{Error, ErrorKind};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ExecutorError {
    #[error("failed to spawn child process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to create console log {path}: {source}")]
    ConsoleLog {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no running child for submit stamp {0}")]
    NotRunning(String),
}

impl From<ExecutorError> for Error {
    fn from(err: ExecutorError) -> Self {
        match &err {
            ExecutorError::Spawn(_) => Error::new(ErrorKind::Spawn, err.to_string()),
            ExecutorError::ConsoleLog { .. } => Error::new(ErrorKind::Io, err.to_string()),
            ExecutorError::NotRunning(_) => Error::new(ErrorKind::RunNotFound, err.to_string()),
        }
    }
}
