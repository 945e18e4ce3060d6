//! `JobControl=off` admits a submitted job immediately instead of queuing
//! it; its outcome shows up in history once the child process exits
//! (spec §4.1).

use crate::prelude::*;

#[test]
fn submit_without_job_control_runs_immediately_and_succeeds() {
    let instance = Instance::new();
    instance.add_model("RiskPaths", "digest-riskpaths", "exit 0");

    instance
        .oms()
        .env("OMS_JOB_CONTROL", "off")
        .args(&["submit", "RiskPaths"])
        .passes()
        .stdout_has("submitted run");

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            let out = instance.oms().args(&["-o", "json", "history"]).passes();
            out.stdout().contains("RiskPaths")
        }),
        "RiskPaths should reach history once its process exits"
    );

    instance.oms().args(&["-o", "json", "history"]).passes().stdout_has("success");
}

#[test]
fn submit_without_job_control_reports_model_failure() {
    let instance = Instance::new();
    instance.add_model("BadModel", "digest-bad", "exit 7");

    instance
        .oms()
        .env("OMS_JOB_CONTROL", "off")
        .args(&["submit", "BadModel"])
        .passes()
        .stdout_has("submitted run");

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            let out = instance.oms().args(&["-o", "json", "history"]).passes();
            out.stdout().contains("BadModel")
        }),
        "BadModel should reach history once its process exits"
    );

    instance.oms().args(&["-o", "json", "history"]).passes().stdout_has("exit");
}
