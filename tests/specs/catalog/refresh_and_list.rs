//! Model discovery at startup and on demand via `refresh-models`
//! (spec §4.3).

use crate::prelude::*;

#[test]
fn all_models_lists_models_present_at_startup() {
    let instance = Instance::new();
    instance.add_model("RiskPaths", "digest-riskpaths", "exit 0");

    instance
        .oms()
        .args(&["-o", "json", "all-models"])
        .passes()
        .stdout_has("RiskPaths")
        .stdout_has("digest-riskpaths");
}

#[test]
fn refresh_models_picks_up_a_model_added_after_startup() {
    let instance = Instance::new();
    instance.add_model("RiskPaths", "digest-riskpaths", "exit 0");

    // Establishes the daemon (and its initial scan) before the new model
    // exists on disk.
    instance.oms().args(&["-o", "json", "all-models"]).passes().stdout_lacks("NewModel");

    instance.add_model("NewModel", "digest-newmodel", "exit 0");

    instance
        .oms()
        .args(&["refresh-models"])
        .passes()
        .stdout_has("digest-newmodel");

    instance
        .oms()
        .args(&["-o", "json", "all-models"])
        .passes()
        .stdout_has("NewModel");
}
