// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stable error-kind catalogue (see spec §7). `ErrorKind` is the
//! surface every downstream crate's own error type converts into; callers
//! match on `kind()` rather than on crate-specific error enums.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("model not found")]
    ModelNotFound,
    #[error("run not found")]
    RunNotFound,
    #[error("workset not found")]
    WorksetNotFound,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("invalid resources")]
    InvalidResources,
    #[error("quota exceeded")]
    QuotaExceeded,
    #[error("queue full")]
    QueueFull,
    #[error("duplicate submit stamp")]
    DuplicateStamp,
    #[error("workset is read-only")]
    WorksetReadOnly,
    #[error("run has not completed")]
    RunNotCompleted,
    #[error("I/O error")]
    Io,
    #[error("failed to spawn child process")]
    Spawn,
    #[error("internal invariant violation")]
    Internal,
}

/// A user-visible failure: a stable short code plus a single-line human
/// message. The detailed cause (`#[source]`) is logged, never surfaced.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, message, source)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
