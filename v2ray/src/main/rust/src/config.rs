// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Bridge options passed from Kotlin as JSON.

use crate::error::Result;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Logcat tag for everything this library logs
pub const LOG_TAG: &str = "V2RayBridge";

pub const DEFAULT_LATENCY_PORT: u16 = 443;
pub const DEFAULT_LATENCY_TIMEOUT_MS: u64 = 5000;

/// Runtime options for the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
    /// Directory for generated config files (the app's cache dir on Android)
    pub cache_dir: Option<PathBuf>,
    pub latency_port: u16,
    pub latency_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            cache_dir: None,
            latency_port: DEFAULT_LATENCY_PORT,
            latency_timeout_ms: DEFAULT_LATENCY_TIMEOUT_MS,
        }
    }
}

impl ServiceConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Level filter for the logger, `Info` if the name is unknown
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    /// Where config files are written
    pub fn config_dir(&self) -> PathBuf {
        // std::env::temp_dir() is not writable for apps on Android, so Kotlin
        // is expected to pass context.cacheDir
        self.cache_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
