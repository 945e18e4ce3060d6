// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argv resolution (spec §4.2 step 1): direct invocation or MPI-wrapped,
//! with the job's named run options rendered as `-key value` pairs.

use oms_core::RunJob;
use std::path::Path;

/// True when the job should be launched under the MPI launcher: spec §4.2
/// step 1 says "`Np > 0` and MPI enabled", where "MPI enabled" is read as
/// a launcher actually being configured (`mpi_exe` non-empty).
pub fn mpi_wrap(np: u32, mpi_exe: &str) -> bool {
    np > 0 && !mpi_exe.is_empty()
}

/// Builds the full argv, MPI launcher prefix included when `mpi_wrap`
/// holds. `modelArgs` come from `RunOptions::to_argv_pairs()` — an empty
/// value renders the flag with no trailing value (e.g.
/// `OpenM.NotOnRoot`'s empty-means-true convention from spec §6).
pub fn build_argv(job: &RunJob, model_exe: &Path, mpi_exe: &str, mpi_args: &[String]) -> Vec<String> {
    let mut argv = Vec::new();

    if mpi_wrap(job.np, mpi_exe) {
        argv.push(mpi_exe.to_string());
        argv.extend(mpi_args.iter().cloned());
    }

    argv.push(model_exe.display().to_string());

    for (key, value) in job.options.to_argv_pairs() {
        argv.push(format!("-{key}"));
        if !value.is_empty() {
            argv.push(value);
        }
    }

    argv
}

#[cfg(test)]
#[path = "argv_tests.rs"]
mod tests;
