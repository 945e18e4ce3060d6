// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn error_display_includes_kind_and_message() {
    let err = Error::new(ErrorKind::ModelNotFound, "digest abc not registered");
    assert_eq!(err.to_string(), "model not found: digest abc not registered");
}

#[test]
fn error_kind_round_trips() {
    let err = Error::new(ErrorKind::QueueFull, "queue at capacity");
    assert_eq!(err.kind(), ErrorKind::QueueFull);
}

#[test]
fn io_error_wraps_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err = Error::io("failed to read job state file", io_err);
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.source.is_some());
}
