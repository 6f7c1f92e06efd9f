// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Bridge errors and the integer codes they map to at the JNI boundary.
//!
//! Result codes coming from the V2Ray core are never translated; these codes
//! only describe failures that happen inside the bridge before or around a
//! core call.

use std::io;
use thiserror::Error;

/// Temporary config file could not be created or written
pub const ERR_CONFIG_FILE: i32 = -1;
/// Unexpected failure inside the bridge
pub const ERR_INTERNAL: i32 = -2;
/// Managed caller passed an unusable argument
pub const ERR_ARGUMENT: i32 = -3;
/// This build has no V2Ray core linked in
pub const ERR_CORE_UNAVAILABLE: i32 = -4;

/// Latency test failure as seen by Kotlin
pub const LATENCY_FAILED: i32 = -1;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("JNI error: {0}")]
    Jni(#[from] jni::errors::Error),

    #[error("config content is empty")]
    EmptyConfig,

    #[error("failed to write config file: {0}")]
    ConfigFile(#[source] io::Error),

    #[error("invalid bridge options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("path contains an interior NUL byte")]
    InteriorNul(#[from] std::ffi::NulError),

    #[error("failed to resolve {target}: {reason}")]
    Resolve { target: String, reason: String },

    #[error("connection to {target} failed: {source}")]
    Connect {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("connection to {target} timed out after {timeout_ms}ms")]
    Timeout { target: String, timeout_ms: u64 },
}

impl BridgeError {
    /// Code handed back to Kotlin for this failure
    pub fn code(&self) -> i32 {
        match self {
            BridgeError::ConfigFile(_) => ERR_CONFIG_FILE,
            BridgeError::Jni(_) | BridgeError::EmptyConfig | BridgeError::InteriorNul(_) => {
                ERR_ARGUMENT
            }
            BridgeError::Options(_) => ERR_INTERNAL,
            BridgeError::Resolve { .. }
            | BridgeError::Connect { .. }
            | BridgeError::Timeout { .. } => LATENCY_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
