// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oms_core::RunStatus;

fn sample() -> JobFileName {
    JobFileName::queued(ModelDigest::new("abc123"), SubmitStamp::new(42), RunStamp::new("run-1"))
}

#[test]
fn queue_file_name_matches_convention() {
    let name = sample();
    assert_eq!(name.file_name(), format!("abc123-{}-run-1.json", SubmitStamp::new(42).as_fixed_width()));
}

#[test]
fn active_file_name_includes_pid() {
    let name = sample().active(4321);
    assert!(name.file_name().ends_with("-4321.json"));
}

#[test]
fn history_file_name_includes_final_status() {
    let name = sample().finalized(RunStatus::Success);
    assert!(name.file_name().ends_with("-success.json"));
}

#[test]
fn fixed_width_stamps_sort_lexically_by_submission_order() {
    let a = JobFileName::queued(ModelDigest::new("d"), SubmitStamp::new(5), RunStamp::new("r1")).file_name();
    let b = JobFileName::queued(ModelDigest::new("d"), SubmitStamp::new(123456789), RunStamp::new("r2")).file_name();
    assert!(a < b);
}

#[test]
fn parse_round_trips_queue_file_name() {
    let name = sample();
    let file_name = name.file_name();
    let parsed = JobFileName::parse(&file_name, JobStateDir::Queue).unwrap();
    assert_eq!(parsed.model_digest, name.model_digest);
    assert_eq!(parsed.submit_stamp, name.submit_stamp);
    assert_eq!(parsed.run_stamp, name.run_stamp);
}

#[test]
fn parse_round_trips_active_file_name() {
    let name = sample().active(999);
    let file_name = name.file_name();
    let parsed = JobFileName::parse(&file_name, JobStateDir::Active).unwrap();
    assert_eq!(parsed.pid, Some(999));
    assert_eq!(parsed.run_stamp, name.run_stamp);
}

#[test]
fn parse_round_trips_history_file_name() {
    let name = sample().finalized(RunStatus::Kill);
    let file_name = name.file_name();
    let parsed = JobFileName::parse(&file_name, JobStateDir::History).unwrap();
    assert_eq!(parsed.final_status, Some(RunStatus::Kill));
}

#[test]
fn parse_rejects_malformed_name() {
    assert!(JobFileName::parse("not-a-valid-name", JobStateDir::Queue).is_none());
    assert!(JobFileName::parse("abc.txt", JobStateDir::Queue).is_none());
}
