// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submitted jobs and their observable run state (spec §3, §9).

use crate::id::{ModelDigest, RunStamp, SubmitStamp};
use crate::resource::{ComputeUse, Resources};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The model's own CLI flags, forwarded to its argv (spec §6, §9).
/// Concrete fields for the recognized options plus `extra` for opaque
/// pass-through, rather than a bare string map for the whole option set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunOptions {
    /// `OpenM.Threads`
    pub threads: Option<u32>,
    /// `OpenM.NotOnRoot`; an empty value in the wire form means `true`.
    pub not_on_root: Option<bool>,
    /// `OpenM.MessageLanguage`, a BCP-47 tag.
    pub message_language: Option<String>,
    /// Everything else, forwarded verbatim by the executor.
    pub extra: HashMap<String, String>,
}

impl RunOptions {
    /// Renders `(key, value)` pairs, later entries winning on duplicate
    /// keys, with the three recognized options injected if absent and a
    /// value is known (spec §4.2 step 1).
    pub fn to_argv_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self.extra.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

        let has_key = |pairs: &[(String, String)], key: &str| pairs.iter().any(|(k, _)| k == key);

        if !has_key(&pairs, "OpenM.Threads") {
            if let Some(t) = self.threads {
                pairs.push(("OpenM.Threads".to_string(), t.to_string()));
            }
        }
        if !has_key(&pairs, "OpenM.NotOnRoot") {
            if let Some(nr) = self.not_on_root {
                pairs.push(("OpenM.NotOnRoot".to_string(), if nr { String::new() } else { "false".to_string() }));
            }
        }
        if !has_key(&pairs, "OpenM.MessageLanguage") {
            if let Some(ref lang) = self.message_language {
                pairs.push(("OpenM.MessageLanguage".to_string(), lang.clone()));
            }
        }

        // Stable order makes argv (and test assertions on it) deterministic.
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

/// The submitted request (spec §3). Exclusively owned by the Controller
/// from submission until it reaches history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunJob {
    pub submit_stamp: SubmitStamp,
    pub run_stamp: RunStamp,
    pub model_digest: ModelDigest,
    pub model_name: String,
    pub threads: u32,
    pub np: u32,
    pub is_not_on_root: bool,
    pub env: HashMap<String, String>,
    pub options: RunOptions,
    pub requested: Resources,
    pub computed: Resources,
    /// Set by the user who submitted the job; used for per-user quotas.
    pub user: Option<String>,
}

impl RunJob {
    /// Resources computed from §3's formula, with `mem` carried through
    /// from the request unchanged (declared per job, not derived).
    pub fn compute_resources(&mut self) {
        let cpu = crate::resource::compute_cpu(self.np, self.is_not_on_root, self.threads);
        self.computed = Resources {
            cpu,
            mem: self.requested.mem,
        };
    }
}

/// Terminal and non-terminal statuses a `RunJob` can observe (spec §3,
/// §4.1 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Init,
    Progress,
    Wait,
    Success,
    Exit,
    Error,
    Kill,
}

impl RunStatus {
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            RunStatus::Success | RunStatus::Exit | RunStatus::Error | RunStatus::Kill
        )
    }

    /// Parses the token used in history filenames and `archive-state.json`.
    pub fn as_file_token(&self) -> &'static str {
        match self {
            RunStatus::Init => "init",
            RunStatus::Progress => "progress",
            RunStatus::Wait => "wait",
            RunStatus::Success => "success",
            RunStatus::Exit => "exit",
            RunStatus::Error => "error",
            RunStatus::Kill => "kill",
        }
    }

    pub fn from_file_token(token: &str) -> Option<Self> {
        Some(match token {
            "init" => RunStatus::Init,
            "progress" => RunStatus::Progress,
            "wait" => RunStatus::Wait,
            "success" => RunStatus::Success,
            "exit" => RunStatus::Exit,
            "error" => RunStatus::Error,
            "kill" => RunStatus::Kill,
            _ => return None,
        })
    }
}

/// Observable run state, returned by queries and by `Start()` (spec §3,
/// §4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub model_digest: ModelDigest,
    pub model_name: String,
    pub run_stamp: RunStamp,
    pub submit_stamp: SubmitStamp,
    pub update_date_time: chrono::DateTime<chrono::Utc>,
    pub status: RunStatus,
    pub is_final: bool,
    #[serde(default)]
    pub compute_uses: Vec<ComputeUse>,
    #[serde(default)]
    pub exit_code: Option<i32>,
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
