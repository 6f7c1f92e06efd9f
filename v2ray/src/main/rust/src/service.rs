// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Managed V2Ray session on top of the raw bridge.
//!
//! Takes config content instead of a path, writes it to a temporary file,
//! and tracks whether the core is running. The raw JNI start/stop exports go
//! through here too, so both kinds of caller see the same state.

use crate::bridge::{BorrowedPath, Bridge};
use crate::config::ServiceConfig;
use crate::native::V2RayCore;
use crate::error::{BridgeError, Result};
use crate::latency::{duration_ms, measure_latency};
use libc::c_int;
use log::{error, info, warn};
use std::ffi::CString;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock};
use std::time::Duration;
use tempfile::NamedTempFile;

pub const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Default)]
struct SessionState {
    // Kept alive while the core runs; removed from disk on drop
    config_file: Option<NamedTempFile>,
}

pub struct V2RayService<C> {
    bridge: Bridge<C>,
    config: RwLock<ServiceConfig>,
    // Serialises start/stop; held across the blocking core call
    lifecycle: Mutex<SessionState>,
    // Readable without waiting on a start in progress
    running: AtomicBool,
}

/// Config file path as the core should see it
#[cfg(unix)]
fn path_to_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    Ok(CString::new(path.as_os_str().as_bytes())?)
}

#[cfg(not(unix))]
fn path_to_cstring(path: &Path) -> Result<CString> {
    Ok(CString::new(path.to_string_lossy().into_owned())?)
}

impl<C: V2RayCore> V2RayService<C> {
    pub fn new(core: C, config: ServiceConfig) -> Self {
        Self {
            bridge: Bridge::new(core),
            config: RwLock::new(config),
            lifecycle: Mutex::new(SessionState::default()),
            running: AtomicBool::new(false),
        }
    }

    pub fn bridge(&self) -> &Bridge<C> {
        &self.bridge
    }

    pub fn config(&self) -> ServiceConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn configure(&self, config: ServiceConfig) {
        match self.config.write() {
            Ok(mut current) => *current = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, SessionState> {
        self.lifecycle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start V2Ray with JSON config content.
    ///
    /// Returns `0` without touching the core if it is already running, a
    /// bridge error code if the config cannot be prepared, and otherwise the
    /// core's result.
    pub fn start(&self, config_content: &str) -> c_int {
        let mut state = self.lifecycle();
        if self.is_running() {
            warn!("V2Ray is already running");
            return 0;
        }

        if config_content.trim().is_empty() {
            let e = BridgeError::EmptyConfig;
            error!("Cannot start V2Ray: {}", e);
            return e.code();
        }

        let config_file = match self.write_config_file(config_content) {
            Ok(file) => file,
            Err(e) => {
                error!("Failed to create config file: {}", e);
                return e.code();
            }
        };

        let path = match path_to_cstring(config_file.path()) {
            Ok(path) => path,
            Err(e) => {
                error!("Unusable config file path: {}", e);
                return e.code();
            }
        };

        let result = self.bridge.start_tunnel(path);
        if result == 0 {
            state.config_file = Some(config_file);
            self.running.store(true, Ordering::SeqCst);
            info!("V2Ray started");
        } else {
            error!("V2Ray failed to start, error code: {}", result);
        }
        result
    }

    /// Stop V2Ray if it is running.
    ///
    /// Returns the core's result code, or `None` if nothing was running.
    pub fn stop(&self) -> Option<c_int> {
        let mut state = self.lifecycle();
        if !self.is_running() {
            warn!("V2Ray is not running");
            return None;
        }

        let result = self.bridge.stop_tunnel();
        self.clear_session(&mut state);
        info!("V2Ray stopped");
        Some(result)
    }

    /// Raw start from a caller-owned config path.
    ///
    /// Always forwarded; the core's result is returned unchanged. A zero
    /// result marks the core as running.
    pub fn forward_start<P: BorrowedPath>(&self, config_path: P) -> c_int {
        let _state = self.lifecycle();
        if self.is_running() {
            warn!("V2Ray is already running, forwarding start anyway");
        }

        let result = self.bridge.start_tunnel(config_path);
        if result == 0 {
            self.running.store(true, Ordering::SeqCst);
        }
        result
    }

    /// Raw stop: always forwarded, and ends any running session.
    pub fn forward_stop(&self) -> c_int {
        let mut state = self.lifecycle();
        let result = self.bridge.stop_tunnel();
        self.clear_session(&mut state);
        result
    }

    fn clear_session(&self, state: &mut SessionState) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(file) = state.config_file.take() {
            if let Err(e) = file.close() {
                warn!("Failed to remove config file: {}", e);
            }
        }
    }

    /// Core version, or `"unknown"` if the core has none to report
    pub fn version_or_unknown(&self) -> String {
        match self.bridge.version().map(|v| v.to_str()) {
            Some(Ok(version)) => {
                info!("V2Ray version: {}", version);
                version.to_string()
            }
            Some(Err(e)) => {
                error!("V2Ray version is not valid UTF-8: {}", e);
                UNKNOWN_VERSION.to_string()
            }
            None => {
                error!("V2Ray core returned no version");
                UNKNOWN_VERSION.to_string()
            }
        }
    }

    /// TCP connect latency in milliseconds.
    ///
    /// `None` for port or timeout uses the configured default.
    pub async fn test_latency(
        &self,
        host: &str,
        port: Option<u16>,
        timeout: Option<Duration>,
    ) -> Result<u64> {
        let config = self.config();
        let port = port.unwrap_or(config.latency_port);
        let timeout = timeout.unwrap_or(Duration::from_millis(config.latency_timeout_ms));

        info!("Testing latency: {}:{}", host, port);
        match measure_latency(host, port, timeout).await {
            Ok(latency) => {
                let ms = duration_ms(latency);
                info!("Latency test succeeded: {}ms", ms);
                Ok(ms)
            }
            Err(e) => {
                error!("Latency test failed: {}", e);
                Err(e)
            }
        }
    }

    fn write_config_file(&self, content: &str) -> Result<NamedTempFile> {
        let dir = self.config().config_dir();
        let mut file = tempfile::Builder::new()
            .prefix("v2ray")
            .suffix(".json")
            .tempfile_in(&dir)
            .map_err(BridgeError::ConfigFile)?;
        file.write_all(content.as_bytes())
            .map_err(BridgeError::ConfigFile)?;
        file.flush().map_err(BridgeError::ConfigFile)?;
        Ok(file)
    }
}
