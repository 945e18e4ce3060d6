// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oms_core::test_support::test_job;
use std::path::PathBuf;

#[test]
fn direct_invocation_has_no_mpi_prefix() {
    let job = test_job(1, "run-1", "d1");
    assert_eq!(job.np, 0);
    let argv = build_argv(&job, &PathBuf::from("/models/RiskPaths"), "mpiexec", &[]);
    assert_eq!(argv[0], "/models/RiskPaths");
}

#[test]
fn np_above_zero_without_mpi_exe_stays_direct() {
    let mut job = test_job(1, "run-1", "d1");
    job.np = 2;
    job.compute_resources();
    let argv = build_argv(&job, &PathBuf::from("/models/RiskPaths"), "", &[]);
    assert_eq!(argv[0], "/models/RiskPaths");
}

#[test]
fn mpi_invocation_prefixes_launcher_and_args() {
    let mut job = test_job(1, "run-1", "d1");
    job.np = 3;
    job.is_not_on_root = true;
    job.compute_resources();

    let argv = build_argv(&job, &PathBuf::from("/models/RiskPaths"), "mpiexec", &["-n".to_string(), "3".to_string()]);
    assert_eq!(argv[0], "mpiexec");
    assert_eq!(argv[1], "-n");
    assert_eq!(argv[2], "3");
    assert_eq!(argv[3], "/models/RiskPaths");
}

#[test]
fn run_options_render_as_dash_prefixed_pairs() {
    let mut job = test_job(1, "run-1", "d1");
    job.options.threads = Some(4);
    job.options.message_language = Some("FR".to_string());
    let argv = build_argv(&job, &PathBuf::from("/models/RiskPaths"), "mpiexec", &[]);
    assert!(argv.windows(2).any(|w| w == ["-OpenM.Threads", "4"]));
    assert!(argv.windows(2).any(|w| w == ["-OpenM.MessageLanguage", "FR"]));
}

#[test]
fn empty_value_renders_flag_with_no_trailing_value() {
    let mut job = test_job(1, "run-1", "d1");
    job.options.not_on_root = Some(true);
    let argv = build_argv(&job, &PathBuf::from("/models/RiskPaths"), "mpiexec", &[]);
    let idx = argv.iter().position(|a| a == "-OpenM.NotOnRoot").unwrap();
    // NotOnRoot's empty value means no trailing argv entry is emitted for it.
    assert!(idx == argv.len() - 1 || argv[idx + 1].starts_with('-'));
}
