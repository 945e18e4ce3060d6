// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog-local error type, converting into `oms_core::Error` at the
//! crate boundary per the catalogue in spec §7.

use oms_core::{Error, ErrorKind, ModelDigest};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("model {0} not found")]
    ModelNotFound(ModelDigest),
    #[error("model database error: {0}")]
    Db(String),
    #[error("failed to scan models directory {path}: {source}")]
    Scan {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        match &err {
            CatalogError::ModelNotFound(_) => Error::new(ErrorKind::ModelNotFound, err.to_string()),
            CatalogError::Db(_) => Error::new(ErrorKind::Internal, err.to_string()),
            CatalogError::Scan { .. } => Error::new(ErrorKind::Io, err.to_string()),
        }
    }
}
