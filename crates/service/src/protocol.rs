// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `oms` (CLI) and `omsd` (service). Spec §1 treats
//! the transport and wire mapping as "trivial glue" outside the core's
//! scope; this module is exactly that glue — a length-prefixed JSON frame
//! over a Unix socket, one request per connection, carrying the typed
//! commands/queries spec §4.1 names.
//!
//! Wire format: 4-byte big-endian length prefix + JSON payload (matches
//! this workspace's existing daemon/CLI framing convention).

use std::collections::HashMap;

use oms_core::{ModelBasic, RunJob, RunOptions, RunState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Caps a single frame so a misbehaving peer can't exhaust memory.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Submit {
        model: String,
        threads: u32,
        np: u32,
        is_not_on_root: bool,
        #[serde(default)]
        env: HashMap<String, String>,
        #[serde(default)]
        options: RunOptions,
        #[serde(default)]
        mem: u64,
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        run_stamp: Option<String>,
    },
    Stop {
        model: String,
        submit_stamp: i64,
    },
    MoveQueue {
        submit_stamp: i64,
        position: usize,
    },
    DeleteHistory {
        submit_stamp: i64,
    },
    Query(Query),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum Query {
    Queue,
    Active,
    History,
    Logs {
        model_name: String,
        run_stamp: String,
        #[serde(default)]
        start_line: usize,
        #[serde(default = "default_count")]
        count: i64,
    },
    AllModels,
    RefreshModels,
}

fn default_count() -> i64 {
    0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Submitted { run_stamp: String, run_state: Option<RunState> },
    Stopped { found: bool, is_running: bool },
    Moved,
    Deleted,
    Queue(Vec<RunJob>),
    Active(Vec<RunState>),
    History(Vec<RunState>),
    Logs(Vec<String>),
    Models(Vec<ModelBasic>),
    Refreshed { added: Vec<String>, removed: Vec<String> },
    Error { kind: String, message: String },
}

impl From<oms_core::Error> for Response {
    fn from(err: oms_core::Error) -> Self {
        Response::Error {
            kind: format!("{:?}", err.kind()),
            message: err.message,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    ConnectionClosed,
    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("timed out")]
    Timeout,
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub async fn read_message<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(ProtocolError::ConnectionClosed),
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: len, max: MAX_MESSAGE_SIZE });
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

pub async fn write_message<W: AsyncWriteExt + Unpin>(writer: &mut W, data: &[u8]) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size: data.len(), max: MAX_MESSAGE_SIZE });
    }
    writer.write_all(&(data.len() as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
