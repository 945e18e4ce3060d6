// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_starts_at_epoch() {
    let clock = FakeClock::new();
    assert_eq!(clock.now().timestamp(), 0);
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::new();
    clock.advance(chrono::Duration::days(30));
    assert_eq!(clock.now().timestamp(), 30 * 24 * 3600);
}

#[test]
fn fake_clock_set_is_absolute() {
    let clock = FakeClock::new();
    let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    clock.set(ts);
    assert_eq!(clock.now(), ts);
}
