//! `--np > 0` with an MPI launcher configured wraps the model executable
//! with the launcher and a generated hostfile (spec §4.2, §3).

use crate::prelude::*;

#[test]
fn submit_with_np_above_one_launches_through_mpi() {
    let instance = Instance::new();
    instance.add_model("Parallel", "digest-parallel", "exit 0");
    let mpiexec = instance.fake_mpiexec();

    instance
        .oms()
        .env("OMS_JOB_CONTROL", "off")
        .env("OMS_MPI_EXE", mpiexec.to_string_lossy())
        .args(&["submit", "Parallel", "--np", "2", "--threads", "1"])
        .passes()
        .stdout_has("submitted run");

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || {
            let out = instance.oms().args(&["-o", "json", "history"]).passes();
            out.stdout().contains("Parallel")
        }),
        "Parallel should reach history once the MPI-wrapped process exits"
    );

    // Success here proves the fake mpiexec actually found and exec'd the
    // model binary rather than the run failing to launch at all.
    instance.oms().args(&["-o", "json", "history"]).passes().stdout_has("success");
}
