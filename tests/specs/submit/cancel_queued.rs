//! `StopModelRun` against a job still sitting in the queue removes it
//! without ever starting it (spec §4.1).

use crate::prelude::*;

#[test]
fn stopping_a_queued_job_removes_it_before_it_runs() {
    let instance = Instance::new();
    let gate = instance.home_path().join("gate");
    instance.add_model("Holder", "digest-holder", &format!("while [ ! -f {} ]; do sleep 0.02; done\nexit 0", gate.display()));
    instance.add_model("NeverRuns", "digest-never", "touch ran-marker; exit 0");

    instance
        .oms()
        .env("OMS_GLOBAL_CPU", "1")
        .env("OMS_TICK_INTERVAL_MS", "20")
        .args(&["submit", "Holder", "--threads", "1"])
        .passes();

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            let out = instance.oms().args(&["-o", "json", "active"]).passes();
            out.stdout().contains("Holder")
        }),
        "Holder should become active and occupy the whole budget"
    );

    instance.oms().args(&["submit", "NeverRuns", "--threads", "1"]).passes();

    // NeverRuns has nowhere to run (Holder owns the only CPU), so it must
    // still be sitting in the queue; grab its submit stamp from there.
    let queue = instance.oms().args(&["-o", "json", "queue"]).passes();
    let jobs: Vec<serde_json::Value> = serde_json::from_str(&queue.stdout()).expect("queue should be valid JSON");
    let job = jobs.iter().find(|j| j["model_name"] == "NeverRuns").expect("NeverRuns should be queued");
    let stamp = job["submit_stamp"].as_i64().expect("submit_stamp should be an integer");

    instance
        .oms()
        .args(&["stop", "NeverRuns", &stamp.to_string()])
        .passes()
        .stdout_has("removed queued job");

    let queue_after = instance.oms().args(&["-o", "json", "queue"]).passes();
    queue_after.stdout_lacks("NeverRuns");

    std::fs::write(&gate, "go").unwrap();
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            let history = instance.oms().args(&["-o", "json", "history"]).passes();
            history.stdout().contains("Holder")
        }),
        "Holder should still complete normally"
    );

    let final_history = instance.oms().args(&["-o", "json", "history"]).passes();
    final_history.stdout_lacks("NeverRuns");
}
