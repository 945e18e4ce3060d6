// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The Archive Scanner (spec §4.4): periodically selects runs and
//! worksets older than the configured cutoffs for archiving/alerting,
//! applying the baseline/default/read-write/keep-list exclusions, and
//! persists `archive-state.json` atomically.

pub mod archive_db;
pub mod error;
pub mod scanner;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use archive_db::{ArchiveDb, RunRecord, WorksetRecord};
pub use error::ArchiveError;
pub use scanner::ArchiveScanner;
pub use state::{ArchiveState, ModelArchiveState};
