//! `JobControl=on` admits jobs against the global CPU budget: a job that
//! would exceed it waits in the queue until capacity frees up (spec §4.1,
//! §5).

use crate::prelude::*;

#[test]
fn second_job_queues_until_first_frees_the_cpu_budget() {
    let instance = Instance::new();
    // Give the first job a way to block until the test releases it, so
    // the second submission is guaranteed to observe it still occupying
    // the whole CPU budget.
    let gate = instance.home_path().join("gate");
    instance.add_model("Holder", "digest-holder", &format!("while [ ! -f {} ]; do sleep 0.02; done\nexit 0", gate.display()));
    instance.add_model("Quick", "digest-quick", "exit 0");

    instance
        .oms()
        .env("OMS_GLOBAL_CPU", "2")
        .env("OMS_TICK_INTERVAL_MS", "20")
        .args(&["submit", "Holder", "--threads", "2"])
        .passes();

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            let out = instance.oms().args(&["-o", "json", "active"]).passes();
            out.stdout().contains("Holder")
        }),
        "expected to observe Holder become active"
    );

    instance.oms().args(&["submit", "Quick", "--threads", "1"]).passes();

    assert!(
        wait_for(500, || {
            let out = instance.oms().args(&["-o", "json", "queue"]).passes();
            out.stdout().contains("Quick")
        }),
        "Quick should sit in the queue while Holder owns the full CPU budget"
    );

    std::fs::write(&gate, "go").unwrap();

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            let out = instance.oms().args(&["-o", "json", "history"]).passes();
            let stdout = out.stdout();
            stdout.contains("Holder") && stdout.contains("Quick")
        }),
        "both jobs should eventually complete once the budget frees up"
    );
}
