// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders for fixtures shared by other crates' tests. Gated behind
//! `test-support` so production builds never link this in.

use crate::id::{ModelDigest, RunStamp, SubmitStamp};
use crate::model::Model;
use crate::resource::Resources;
use crate::run::{RunJob, RunOptions};
use std::collections::HashMap;
use std::path::PathBuf;

pub fn test_model(digest: &str, name: &str) -> Model {
    Model {
        digest: ModelDigest::new(digest),
        name: name.to_string(),
        version: "1.0".to_string(),
        default_lang: "EN".to_string(),
        exe_path: PathBuf::from(format!("/models/{name}")),
        db_path: PathBuf::from(format!("/models/{name}.sqlite")),
        bin_dir: PathBuf::from("/models"),
    }
}

pub fn test_job(submit_stamp: i64, run_stamp: &str, digest: &str) -> RunJob {
    let mut job = RunJob {
        submit_stamp: SubmitStamp::new(submit_stamp),
        run_stamp: RunStamp::new(run_stamp),
        model_digest: ModelDigest::new(digest),
        model_name: "RiskPaths".to_string(),
        threads: 1,
        np: 0,
        is_not_on_root: false,
        env: HashMap::new(),
        options: RunOptions::default(),
        requested: Resources::default(),
        computed: Resources::default(),
        user: None,
    };
    job.compute_resources();
    job
}
