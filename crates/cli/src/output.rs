// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering `Response` payloads as either a plain-text table or JSON.

use clap::ValueEnum;
use oms_core::{ModelBasic, RunJob, RunState};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Formats a UTC timestamp as a relative "Ns"/"Nm"/"Nh"/"Nd" age string.
pub fn format_time_ago(when: chrono::DateTime<chrono::Utc>) -> String {
    let elapsed = chrono::Utc::now().signed_duration_since(when);
    let secs = elapsed.num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

fn print_rows(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }
    let header_line: Vec<String> = headers.iter().enumerate().map(|(i, h)| format!("{:width$}", h, width = widths[i])).collect();
    println!("{}", header_line.join("  "));
    for row in rows {
        let line: Vec<String> = row.iter().enumerate().map(|(i, cell)| format!("{:width$}", cell, width = widths[i])).collect();
        println!("{}", line.join("  "));
    }
}

pub fn print_queue(jobs: &[RunJob], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(jobs)?),
        OutputFormat::Text => {
            let rows = jobs
                .iter()
                .map(|j| vec![j.submit_stamp.to_string(), j.run_stamp.to_string(), j.model_digest.to_string(), j.user.clone().unwrap_or_default()])
                .collect();
            print_rows(&["SUBMIT", "RUN", "MODEL", "USER"], rows);
        }
    }
    Ok(())
}

pub fn print_runs(label: &str, runs: &[RunState], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(runs)?),
        OutputFormat::Text => {
            println!("{label}:");
            let rows = runs
                .iter()
                .map(|r| {
                    vec![
                        r.submit_stamp.to_string(),
                        r.run_stamp.to_string(),
                        r.model_digest.to_string(),
                        format!("{:?}", r.status),
                        format_time_ago(r.update_date_time),
                    ]
                })
                .collect();
            print_rows(&["SUBMIT", "RUN", "MODEL", "STATUS", "AGE"], rows);
        }
    }
    Ok(())
}

pub fn print_models(models: &[ModelBasic], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(models)?),
        OutputFormat::Text => {
            let rows = models.iter().map(|m| vec![m.digest.to_string(), m.name.clone(), m.version.clone()]).collect();
            print_rows(&["DIGEST", "NAME", "VERSION"], rows);
        }
    }
    Ok(())
}

pub fn print_logs(lines: &[String], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(lines)?),
        OutputFormat::Text => {
            for line in lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
