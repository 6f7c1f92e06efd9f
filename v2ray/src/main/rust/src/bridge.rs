// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Pass-through adapter between the JNI entry points and the V2Ray core.
//!
//! Every call is forwarded as-is: no validation, no retries, no translation
//! of the core's result codes. Each call is logged around the forward.

use crate::native::V2RayCore;
use jni::strings::JavaStr;
use libc::c_int;
use log::{info, warn};
use std::ffi::{CStr, CString};

/// A native string borrowed for the duration of one core call.
///
/// Dropping the value releases the underlying resource.
pub trait BorrowedPath {
    fn as_c_str(&self) -> &CStr;
}

impl BorrowedPath for JavaStr<'_, '_, '_> {
    fn as_c_str(&self) -> &CStr {
        // JavaStr -> JNIStr -> CStr; the bytes are the JVM's modified UTF-8
        self
    }
}

impl BorrowedPath for CString {
    fn as_c_str(&self) -> &CStr {
        CString::as_c_str(self)
    }
}

impl BorrowedPath for &CStr {
    fn as_c_str(&self) -> &CStr {
        *self
    }
}

/// Stateless forwarder over a [`V2RayCore`]
#[derive(Debug, Default)]
pub struct Bridge<C> {
    core: C,
}

impl<C: V2RayCore> Bridge<C> {
    pub fn new(core: C) -> Self {
        Self { core }
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    /// Start the core with the given config file path.
    ///
    /// The path is released right after the core returns, whatever the
    /// outcome, and the core's result is returned unchanged.
    pub fn start_tunnel<P: BorrowedPath>(&self, config_path: P) -> c_int {
        info!("JNI: starting V2Ray");

        let result = self.core.start(config_path.as_c_str());
        drop(config_path);

        info!("JNI: V2Ray start result: {}", result);
        result
    }

    /// Stop the core, returning its result code.
    ///
    /// The Kotlin `stopV2Ray()` is declared `Unit`, so the JNI export drops
    /// this value; it is still logged here.
    pub fn stop_tunnel(&self) -> c_int {
        info!("JNI: stopping V2Ray");

        let result = self.core.stop();
        if result == 0 {
            info!("JNI: V2Ray stop result: {}", result);
        } else {
            warn!("JNI: V2Ray stop result: {}", result);
        }
        result
    }

    /// Version string exactly as the core reports it
    pub fn version(&self) -> Option<&CStr> {
        info!("JNI: querying V2Ray version");
        self.core.version()
    }
}
