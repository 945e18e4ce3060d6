// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newtype identifiers and stamp generators.

use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Shared behavior for the newtype id wrappers below.
pub trait ShortId {
    fn short(&self) -> &str;
}

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ShortId for $name {
            fn short(&self) -> &str {
                let s = &self.0;
                if s.len() <= 8 {
                    s
                } else {
                    &s[..8]
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ModelDigest);
define_id!(RunStamp);

/// Server-assigned millisecond wall-clock value, unique per service instance.
/// The lexical/numeric ordering of `SubmitStamp` is the queue's FIFO key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SubmitStamp(pub i64);

impl SubmitStamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// Fixed-width decimal rendering so lexical and numeric order agree in filenames.
    pub fn as_fixed_width(&self) -> String {
        format!("{:016}", self.0)
    }
}

impl fmt::Display for SubmitStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Produces `SubmitStamp` values. Production uses wall-clock millis;
/// tests use a deterministic monotonic counter so ordering assertions
/// don't depend on scheduling jitter.
pub trait StampGen: Send + Sync {
    fn next_stamp(&self) -> SubmitStamp;
}

pub struct WallClockStampGen;

impl StampGen for WallClockStampGen {
    fn next_stamp(&self) -> SubmitStamp {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;
        SubmitStamp(millis)
    }
}

/// Deterministic, strictly increasing stamp source for tests.
pub struct SequentialStampGen {
    next: AtomicI64,
}

impl SequentialStampGen {
    pub fn new(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }
}

impl Default for SequentialStampGen {
    fn default() -> Self {
        Self::new(1)
    }
}

impl StampGen for SequentialStampGen {
    fn next_stamp(&self) -> SubmitStamp {
        SubmitStamp(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
