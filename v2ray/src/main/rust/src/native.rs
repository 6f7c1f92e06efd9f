// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Call surface of the external V2Ray core.
//!
//! The core ships as a prebuilt `libv2raycore.so` and only exists on Android.
//! Host builds get [`UnlinkedCore`] so the crate and its tests still build.

use libc::c_int;
use std::ffi::CStr;

/// The three functions the V2Ray core exports.
///
/// Result codes are defined by the core and are not interpreted here.
pub trait V2RayCore: Send + Sync {
    /// Start the core with the config file at `config_path`
    fn start(&self, config_path: &CStr) -> c_int;

    /// Stop the core
    fn stop(&self) -> c_int;

    /// Version string owned by the core, `None` if the core returned NULL
    fn version(&self) -> Option<&CStr>;
}

#[cfg(target_os = "android")]
mod linked {
    use super::V2RayCore;
    use libc::{c_char, c_int};
    use std::ffi::CStr;

    #[allow(non_snake_case)]
    extern "C" {
        fn startV2Ray(config_path: *const c_char) -> c_int;
        fn stopV2Ray() -> c_int;
        fn getV2RayVersion() -> *const c_char;
    }

    /// Core linked from `libv2raycore.so`
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LinkedCore;

    impl V2RayCore for LinkedCore {
        fn start(&self, config_path: &CStr) -> c_int {
            // SAFETY: the pointer is NUL-terminated and outlives the call
            unsafe { startV2Ray(config_path.as_ptr()) }
        }

        fn stop(&self) -> c_int {
            unsafe { stopV2Ray() }
        }

        fn version(&self) -> Option<&CStr> {
            let ptr = unsafe { getV2RayVersion() };
            if ptr.is_null() {
                return None;
            }
            // SAFETY: the core keeps its version string alive for the process
            // lifetime; it is never freed on this side.
            Some(unsafe { CStr::from_ptr(ptr) })
        }
    }
}

#[cfg(target_os = "android")]
pub use linked::LinkedCore;

/// Stand-in for builds without `libv2raycore`
#[derive(Debug, Default, Clone, Copy)]
pub struct UnlinkedCore;

impl V2RayCore for UnlinkedCore {
    fn start(&self, _config_path: &CStr) -> c_int {
        log::warn!("V2Ray core is not linked into this build");
        crate::error::ERR_CORE_UNAVAILABLE
    }

    fn stop(&self) -> c_int {
        log::warn!("V2Ray core is not linked into this build");
        crate::error::ERR_CORE_UNAVAILABLE
    }

    fn version(&self) -> Option<&CStr> {
        None
    }
}

/// Core used by the exported JNI functions on this target
#[cfg(target_os = "android")]
pub type PlatformCore = LinkedCore;

#[cfg(not(target_os = "android"))]
pub type PlatformCore = UnlinkedCore;
