// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oms — CLI for the model hosting service.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod daemon_process;
mod env;
mod output;

use std::collections::HashMap;

use anyhow::Result;
use clap::{Parser, Subcommand};
use oms_core::RunOptions;
use oms_service::{Query, Request, Response};

use crate::client::DaemonClient;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "oms", version, about = "Submit and monitor model runs against omsd")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a model run
    Submit {
        /// Model name or digest
        model: String,
        #[arg(long, default_value_t = 1)]
        threads: u32,
        /// MPI process count; 0 (the default) means no MPI launcher is used
        #[arg(long, default_value_t = 0)]
        np: u32,
        #[arg(long)]
        is_not_on_root: bool,
        /// `KEY=VALUE` environment overrides, may be repeated
        #[arg(long = "env", value_parser = parse_key_val)]
        env: Vec<(String, String)>,
        #[arg(long, default_value_t = 0)]
        mem: u64,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        run_stamp: Option<String>,
    },
    /// Stop a queued or running job
    Stop {
        /// Model name or digest the job was submitted against
        model: String,
        submit_stamp: i64,
    },
    /// List queued jobs
    Queue,
    /// List currently running jobs
    Active,
    /// List completed jobs
    History,
    /// Tail a run's console log
    Logs {
        model_name: String,
        run_stamp: String,
        #[arg(long, default_value_t = 0)]
        start_line: usize,
        #[arg(long, default_value_t = 0)]
        count: i64,
    },
    /// Move a queued job to a new position
    MoveQueue { submit_stamp: i64, position: usize },
    /// Delete a finished job's history entry
    DeleteHistory { submit_stamp: i64 },
    /// List all known models
    AllModels,
    /// Rescan the models directory for new or removed models
    RefreshModels,
    /// Stop the background omsd process
    StopDaemon,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("invalid KEY=VALUE: `{s}`"))?;
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Submit {
            model,
            threads,
            np,
            is_not_on_root,
            env,
            mem,
            user,
            run_stamp,
        } => {
            let client = DaemonClient::for_action()?;
            let env: HashMap<String, String> = env.into_iter().collect();
            let response = client
                .send(&Request::Submit {
                    model,
                    threads,
                    np,
                    is_not_on_root,
                    env,
                    options: RunOptions::default(),
                    mem,
                    user,
                    run_stamp,
                })
                .await?;
            match response {
                Response::Submitted { run_stamp, run_state } => {
                    println!("submitted run {run_stamp}");
                    if let Some(state) = run_state {
                        println!("status: {:?}", state.status);
                    }
                }
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::Stop { model, submit_stamp } => {
            let client = DaemonClient::for_action()?;
            match client.send(&Request::Stop { model, submit_stamp }).await? {
                Response::Stopped { found, is_running } => {
                    if !found {
                        println!("no such job");
                    } else if is_running {
                        println!("signalled running job");
                    } else {
                        println!("removed queued job");
                    }
                }
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::Queue => {
            let client = DaemonClient::for_query()?;
            match client.query(Query::Queue).await? {
                Response::Queue(jobs) => output::print_queue(&jobs, cli.output)?,
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::Active => {
            let client = DaemonClient::for_query()?;
            match client.query(Query::Active).await? {
                Response::Active(runs) => output::print_runs("active", &runs, cli.output)?,
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::History => {
            let client = DaemonClient::for_query()?;
            match client.query(Query::History).await? {
                Response::History(runs) => output::print_runs("history", &runs, cli.output)?,
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::Logs {
            model_name,
            run_stamp,
            start_line,
            count,
        } => {
            let client = DaemonClient::for_query()?;
            match client
                .query(Query::Logs {
                    model_name,
                    run_stamp,
                    start_line,
                    count,
                })
                .await?
            {
                Response::Logs(lines) => output::print_logs(&lines, cli.output)?,
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::MoveQueue { submit_stamp, position } => {
            let client = DaemonClient::for_action()?;
            match client.send(&Request::MoveQueue { submit_stamp, position }).await? {
                Response::Moved => println!("moved"),
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::DeleteHistory { submit_stamp } => {
            let client = DaemonClient::for_action()?;
            match client.send(&Request::DeleteHistory { submit_stamp }).await? {
                Response::Deleted => println!("deleted"),
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::AllModels => {
            let client = DaemonClient::for_query()?;
            match client.query(Query::AllModels).await? {
                Response::Models(models) => output::print_models(&models, cli.output)?,
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::RefreshModels => {
            let client = DaemonClient::for_action()?;
            match client.query(Query::RefreshModels).await? {
                Response::Refreshed { added, removed } => {
                    println!("added: {}", added.join(", "));
                    println!("removed: {}", removed.join(", "));
                }
                Response::Error { message, .. } => anyhow::bail!(message),
                other => anyhow::bail!("unexpected response: {other:?}"),
            }
        }
        Commands::StopDaemon => {
            client::stop_daemon();
            println!("stopped");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
