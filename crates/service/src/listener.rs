// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accepts `oms` CLI connections on the service's Unix socket and
//! dispatches each framed request to the Controller/Catalog (spec §1:
//! "the core exposes typed commands and queries; mapping to routes is
//! trivial glue"). One request per connection — the CLI is a short-lived
//! process per invocation, so there is no value in a long-lived session.

use std::sync::Arc;

use oms_catalog::Catalog;
use oms_config::Config;
use oms_core::{ModelDigest, Resources, SubmitStamp};
use oms_scheduler::{Controller, JobRequest};
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, warn};

use crate::protocol::{self, Query, Request, Response};

pub struct ListenCtx {
    pub controller: Controller,
    pub catalog: Catalog,
    pub config: Arc<Config>,
    pub models_scan_root: std::path::PathBuf,
    pub shutdown: Arc<tokio::sync::Notify>,
}

pub struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { socket, ctx }
    }

    pub async fn run(self) {
        loop {
            let (stream, _addr) = match self.socket.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };
            let ctx = Arc::clone(&self.ctx);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, ctx).await {
                    warn!(error = %e, "connection handling failed");
                }
            });
        }
    }
}

async fn handle_connection(mut stream: UnixStream, ctx: Arc<ListenCtx>) -> Result<(), protocol::ProtocolError> {
    let bytes = protocol::read_message(&mut stream).await?;
    let request: Request = protocol::decode(&bytes)?;
    let response = dispatch(&ctx, request).await;
    let out = protocol::encode(&response)?;
    protocol::write_message(&mut stream, &out).await?;
    Ok(())
}

async fn dispatch(ctx: &ListenCtx, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::Submit {
            model,
            threads,
            np,
            is_not_on_root,
            env,
            options,
            mem,
            user,
            run_stamp,
        } => submit(ctx, model, threads, np, is_not_on_root, env, options, mem, user, run_stamp).await,
        Request::Stop { model, submit_stamp } => {
            let digest = ModelDigest::new(model);
            match ctx.controller.stop_model_run(&digest, SubmitStamp::new(submit_stamp)) {
                Ok(outcome) => Response::Stopped {
                    found: outcome.found,
                    is_running: outcome.is_running,
                },
                Err(e) => e.into(),
            }
        }
        Request::MoveQueue { submit_stamp, position } => {
            match ctx.controller.move_job_in_queue(SubmitStamp::new(submit_stamp), position) {
                Ok(()) => Response::Moved,
                Err(e) => e.into(),
            }
        }
        Request::DeleteHistory { submit_stamp } => {
            match ctx.controller.delete_job_history(SubmitStamp::new(submit_stamp)) {
                Ok(()) => Response::Deleted,
                Err(e) => e.into(),
            }
        }
        Request::Query(query) => query_response(ctx, query),
    }
}

#[allow(clippy::too_many_arguments)]
async fn submit(
    ctx: &ListenCtx,
    model: String,
    threads: u32,
    np: u32,
    is_not_on_root: bool,
    env: std::collections::HashMap<String, String>,
    options: oms_core::RunOptions,
    mem: u64,
    user: Option<String>,
    run_stamp_hint: Option<String>,
) -> Response {
    let Some(resolved) = ctx.catalog.model_by(&model) else {
        return oms_core::Error::new(oms_core::ErrorKind::ModelNotFound, format!("model {model} not found")).into();
    };

    let req = JobRequest {
        model_digest: resolved.digest,
        threads,
        np,
        is_not_on_root,
        env,
        options,
        requested: Resources { cpu: 0, mem },
        user,
        run_stamp_hint,
    };

    if ctx.config.job_control {
        match ctx.controller.add_job_to_queue(req) {
            Ok(run_stamp) => Response::Submitted {
                run_stamp: run_stamp.as_str().to_string(),
                run_state: None,
            },
            Err(e) => e.into(),
        }
    } else {
        match ctx.controller.run_immediate(req).await {
            Ok(state) => Response::Submitted {
                run_stamp: state.run_stamp.as_str().to_string(),
                run_state: Some(state),
            },
            Err(e) => e.into(),
        }
    }
}

fn query_response(ctx: &ListenCtx, query: Query) -> Response {
    match query {
        Query::Queue => Response::Queue(ctx.controller.queue_snapshot()),
        Query::Active => Response::Active(ctx.controller.active_snapshot()),
        Query::History => Response::History(ctx.controller.history_snapshot()),
        Query::Logs {
            model_name,
            run_stamp,
            start_line,
            count,
        } => {
            let run_stamp = oms_core::RunStamp::new(run_stamp);
            Response::Logs(ctx.controller.tail_log(&model_name, &run_stamp, start_line, count))
        }
        Query::AllModels => Response::Models(ctx.catalog.all_models()),
        Query::RefreshModels => match ctx.catalog.refresh_models(&ctx.models_scan_root) {
            Ok(diff) => Response::Refreshed {
                added: diff.added.iter().map(|d| d.as_str().to_string()).collect(),
                removed: diff.removed.iter().map(|d| d.as_str().to_string()).collect(),
            },
            Err(e) => oms_core::Error::from(e).into(),
        },
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
