//! CLI error surfaces: unknown model, unknown subcommand, and queries
//! against a daemon that was never started.

use crate::prelude::*;

#[test]
fn submit_unknown_model_fails_with_not_found() {
    let instance = Instance::new();

    instance
        .oms()
        .args(&["submit", "NoSuchModel"])
        .fails()
        .stderr_has("not found");
}

#[test]
fn unknown_subcommand_is_rejected_by_clap() {
    let instance = Instance::new();

    instance.oms().args(&["frobnicate"]).fails();
}

#[test]
fn query_without_ever_starting_a_daemon_fails_cleanly() {
    let instance = Instance::new();

    // `queue`/`active`/`history` use for_query(), which never auto-starts
    // omsd — against a cold instance this must fail rather than hang.
    instance.oms().args(&["queue"]).fails();
}
