// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Wires `oms-config`/`oms-catalog`/`oms-storage`/`oms-executor`/
//! `oms-scheduler`/`oms-archive` into the `omsd` binary: startup sequence,
//! the Unix-socket IPC protocol the `oms` CLI speaks, and the reference
//! `ModelDb`/`ArchiveDb` adapters that make the binary runnable without a
//! real embedded-SQL backend (spec §1 keeps the schema itself out of
//! scope; something concrete still has to sit behind the port to produce
//! a working service).

pub mod json_archive_db;
pub mod json_model_db;
pub mod lifecycle;
pub mod listener;
pub mod paths;
pub mod protocol;

pub use json_archive_db::JsonArchiveDb;
pub use json_model_db::JsonModelDb;
pub use lifecycle::{LifecycleError, ServiceHandles};
pub use paths::ServicePaths;
pub use protocol::{Query, Request, Response};
