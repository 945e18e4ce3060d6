// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archive-scanner-local error type, converting into `oms_core::Error` at
//! the crate boundary per the catalogue in spec §7.

use oms_core::{Error, ErrorKind, ModelDigest};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ArchiveError {
    #[error("model {0} not found")]
    ModelNotFound(ModelDigest),
    #[error("archive database error: {0}")]
    Db(String),
    #[error("failed to persist archive state: {0}")]
    Persist(#[from] oms_core::Error),
}

impl From<ArchiveError> for Error {
    fn from(err: ArchiveError) -> Self {
        match &err {
            ArchiveError::ModelNotFound(_) => Error::new(ErrorKind::ModelNotFound, err.to_string()),
            ArchiveError::Db(_) => Error::new(ErrorKind::Internal, err.to_string()),
            ArchiveError::Persist(inner) => Error::new(inner.kind(), err.to_string()),
        }
    }
}
