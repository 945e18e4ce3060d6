// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource accounting, compute nodes and the MPI hostfile (spec §3).

use serde::{Deserialize, Serialize};

/// CPU/Mem budget for a job. `mem == 0` means "no limit enforced by core".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Resources {
    pub cpu: u32,
    pub mem: u64,
}

/// CPU = max(Np - (IsNotOnRoot?1:0), 1) * max(Threads,1) (spec §3).
pub fn compute_cpu(np: u32, is_not_on_root: bool, threads: u32) -> u32 {
    let root_deduction = if is_not_on_root { 1 } else { 0 };
    let procs = np.saturating_sub(root_deduction).max(1);
    let threads = threads.max(1);
    procs * threads
}

/// A declared remote host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeNode {
    pub host: String,
    pub total_cpu: u32,
    pub total_mem: u64,
    pub reachable: bool,
}

/// A slice of a `ComputeNode` granted to a specific job. Owned by the job
/// until completion, then released back to the node's free pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeUse {
    pub host: String,
    pub cpu: u32,
    pub mem: u64,
}

/// The MPI hostfile contents to pass to the launcher: one line per
/// `ComputeUse`, `host slots=<cpu>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostIni {
    pub lines: Vec<String>,
}

impl HostIni {
    pub fn from_compute_uses(uses: &[ComputeUse]) -> Self {
        let lines = uses
            .iter()
            .map(|u| format!("{} slots={}", u.host, u.cpu))
            .collect();
        Self { lines }
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Best-fit-decreasing allocation of `required_cpu` across `nodes`,
/// preferring reachable nodes with the most remaining capacity first so
/// fewer, fuller nodes are used (spec §4.1 Dispatch step 1). Returns
/// `None` if the nodes cannot together supply `required_cpu`.
pub fn allocate_compute_uses(nodes: &[ComputeNode], required_cpu: u32) -> Option<Vec<ComputeUse>> {
    if required_cpu == 0 {
        return Some(Vec::new());
    }
    let mut candidates: Vec<&ComputeNode> = nodes.iter().filter(|n| n.reachable).collect();
    candidates.sort_by(|a, b| b.total_cpu.cmp(&a.total_cpu));

    let mut remaining = required_cpu;
    let mut uses = Vec::new();
    for node in candidates {
        if remaining == 0 {
            break;
        }
        let take = node.total_cpu.min(remaining);
        if take == 0 {
            continue;
        }
        uses.push(ComputeUse {
            host: node.host.clone(),
            cpu: take,
            mem: node.total_mem,
        });
        remaining -= take;
    }

    if remaining == 0 {
        Some(uses)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
