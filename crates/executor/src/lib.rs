// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The Run Executor (spec §4.2): spawns exactly one child process per
//! active job, captures its console output, and classifies its terminal
//! status. Owns no job-queue state of its own — the Controller (`oms
//! -scheduler`) drives it through `Executor::start`/`Executor::kill` and
//! consumes its completion channel.

pub mod argv;
pub mod console_log;
pub mod error;
pub mod process;

pub use argv::build_argv;
pub use console_log::{console_log_path, contains_error_sentinel, tail_lines, ConsoleLog};
pub use error::ExecutorError;
pub use process::{Completion, Executor, SpawnRequest};
