// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Stub core and log capture shared by the unit tests.

use crate::bridge::BorrowedPath;
use crate::native::V2RayCore;
use libc::c_int;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

/// In-memory V2Ray core that records every call
#[derive(Debug, Default)]
pub struct StubCore {
    start_result: c_int,
    stop_result: c_int,
    version: Option<CString>,
    started_paths: Mutex<Vec<Vec<u8>>>,
    started_contents: Mutex<Vec<Option<String>>>,
    stop_calls: AtomicUsize,
}

impl StubCore {
    pub fn with_start_result(code: c_int) -> Self {
        Self {
            start_result: code,
            ..Self::default()
        }
    }

    pub fn with_stop_result(code: c_int) -> Self {
        Self {
            stop_result: code,
            ..Self::default()
        }
    }

    pub fn with_version(raw: &[u8]) -> Self {
        Self {
            version: Some(CString::new(raw).expect("version without NUL")),
            ..Self::default()
        }
    }

    /// Raw bytes of every path passed to `start`
    pub fn started_paths(&self) -> Vec<Vec<u8>> {
        self.started_paths.lock().unwrap().clone()
    }

    /// File contents at each `start`, read while the call was in progress
    pub fn started_contents(&self) -> Vec<Option<String>> {
        self.started_contents.lock().unwrap().clone()
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl V2RayCore for StubCore {
    fn start(&self, config_path: &CStr) -> c_int {
        let contents = config_path
            .to_str()
            .ok()
            .and_then(|path| std::fs::read_to_string(path).ok());
        self.started_paths
            .lock()
            .unwrap()
            .push(config_path.to_bytes().to_vec());
        self.started_contents.lock().unwrap().push(contents);
        self.start_result
    }

    fn stop(&self) -> c_int {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.stop_result
    }

    fn version(&self) -> Option<&CStr> {
        self.version.as_deref()
    }
}

/// Path that counts how often it has been released
pub struct CountingPath {
    path: CString,
    releases: Arc<AtomicUsize>,
}

impl CountingPath {
    pub fn new(path: &str, releases: Arc<AtomicUsize>) -> Self {
        Self {
            path: CString::new(path).expect("path without NUL"),
            releases,
        }
    }
}

impl BorrowedPath for CountingPath {
    fn as_c_str(&self) -> &CStr {
        &self.path
    }
}

impl Drop for CountingPath {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            CAPTURED.with(|c| {
                c.borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Run `f` and return the log lines this crate emitted on the current thread
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<(Level, String)>) {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    CAPTURED.with(|c| c.borrow_mut().clear());
    let out = f();
    let logs = CAPTURED.with(|c| c.borrow_mut().drain(..).collect());
    (out, logs)
}
