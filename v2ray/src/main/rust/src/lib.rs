// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! V2Ray JNI Bridge - Rust Implementation
//!
//! Forwards start, stop and version calls from Kotlin to the prebuilt V2Ray
//! core (`libv2raycore.so`) and logs each call to logcat.
//! Also provides a managed session (config content in, temp file handled
//! here) and a TCP latency test for the Flutter plugin.

pub mod bridge;
pub mod config;
pub mod error;
pub mod latency;
pub mod native;
pub mod service;

#[cfg(test)]
mod test_support;

use std::sync::OnceLock;
use std::time::Duration;
use jni::objects::{JObject, JString};
use jni::sys::{jboolean, jint, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use log::{error, LevelFilter};

use crate::config::ServiceConfig;
use crate::error::{Result, ERR_ARGUMENT, LATENCY_FAILED};
use crate::native::PlatformCore;
use crate::service::V2RayService;

#[cfg(target_os = "android")]
use android_logger::Config;

/// Process-wide service behind every JNI entry point
fn service() -> &'static V2RayService<PlatformCore> {
    static SERVICE: OnceLock<V2RayService<PlatformCore>> = OnceLock::new();
    SERVICE.get_or_init(|| V2RayService::new(PlatformCore::default(), ServiceConfig::default()))
}

/// Initialize logging for Android
#[cfg(target_os = "android")]
fn init_logging(level: LevelFilter) {
    android_logger::init_once(
        Config::default()
            .with_max_level(level)
            .with_tag(config::LOG_TAG),
    );
    // init_once ignores the level after the first call
    log::set_max_level(level);
}

#[cfg(not(target_os = "android"))]
fn init_logging(_level: LevelFilter) {
    // Host applications install their own logger
}

/// Parse the optional JSON options string
fn read_options(env: &mut JNIEnv, options: &JString) -> Result<ServiceConfig> {
    if options.is_null() {
        return Ok(ServiceConfig::default());
    }
    let json: String = env.get_string(options)?.into();
    ServiceConfig::from_json(&json)
}

fn new_jstring(env: &JNIEnv, value: &str) -> jstring {
    match env.new_string(value) {
        Ok(jstr) => jstr.into_raw(),
        Err(e) => {
            error!("JNI: failed to create string: {}", e);
            std::ptr::null_mut()
        }
    }
}

// ============================================================================
// JNI Bindings: raw core forwarding
// ============================================================================

/// Start V2Ray with a config file path - JNI entry point
///
/// Returns the core's result code unchanged; a zero result marks the core
/// as running for `isV2RayRunning`
#[no_mangle]
pub extern "C" fn Java_com_v2ray_ang_flutter_1v2_1android_v2ray_V2RayNative_startV2Ray(
    mut env: JNIEnv,
    _this: JObject,
    config_path: JString,
) -> jint {
    // Released (ReleaseStringUTFChars) when the bridge drops it
    let path = match env.get_string(&config_path) {
        Ok(s) => s,
        Err(e) => {
            error!("JNI: invalid config path argument: {}", e);
            return ERR_ARGUMENT;
        }
    };

    service().forward_start(path)
}

/// Stop V2Ray - JNI entry point
///
/// Declared `Unit` on the Kotlin side, so the core's result is only logged.
/// Also ends a session started by `startV2RayWithConfig`.
#[no_mangle]
pub extern "C" fn Java_com_v2ray_ang_flutter_1v2_1android_v2ray_V2RayNative_stopV2Ray(
    _env: JNIEnv,
    _this: JObject,
) {
    service().forward_stop();
}

/// Get the V2Ray core version - JNI entry point
///
/// Returns null if the core reports no version
#[no_mangle]
pub extern "C" fn Java_com_v2ray_ang_flutter_1v2_1android_v2ray_V2RayNative_getV2RayVersion(
    env: JNIEnv,
    _this: JObject,
) -> jstring {
    match service().bridge().version() {
        Some(version) => new_jstring(&env, &version.to_string_lossy()),
        None => {
            error!("JNI: V2Ray core returned no version");
            std::ptr::null_mut()
        }
    }
}

// ============================================================================
// JNI Bindings: managed session
// ============================================================================

/// Initialize logging and apply bridge options - JNI entry point
///
/// `options` is a JSON object (see `ServiceConfig`) or null for defaults
#[no_mangle]
pub extern "C" fn Java_com_v2ray_ang_flutter_1v2_1android_v2ray_V2RayNative_nativeInit(
    mut env: JNIEnv,
    _this: JObject,
    options: JString,
) {
    match read_options(&mut env, &options) {
        Ok(config) => {
            init_logging(config.level_filter());
            service().configure(config);
        }
        Err(e) => {
            // Keep logging usable even when the options are broken
            init_logging(service().config().level_filter());
            error!("JNI: ignoring bridge options: {}", e);
        }
    }
}

/// Start V2Ray from JSON config content - JNI entry point
#[no_mangle]
pub extern "C" fn Java_com_v2ray_ang_flutter_1v2_1android_v2ray_V2RayNative_startV2RayWithConfig(
    mut env: JNIEnv,
    _this: JObject,
    config_content: JString,
) -> jint {
    let content: String = match env.get_string(&config_content) {
        Ok(s) => s.into(),
        Err(e) => {
            error!("JNI: invalid config content argument: {}", e);
            return ERR_ARGUMENT;
        }
    };

    service().start(&content)
}

/// Stop V2Ray if running - JNI entry point
///
/// Unlike `stopV2Ray`, skips the core when nothing is running
#[no_mangle]
pub extern "C" fn Java_com_v2ray_ang_flutter_1v2_1android_v2ray_V2RayNative_stopV2RaySession(
    _env: JNIEnv,
    _this: JObject,
) {
    service().stop();
}

/// Session state - JNI entry point
#[no_mangle]
pub extern "C" fn Java_com_v2ray_ang_flutter_1v2_1android_v2ray_V2RayNative_isV2RayRunning(
    _env: JNIEnv,
    _this: JObject,
) -> jboolean {
    if service().is_running() {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// Core version with an "unknown" fallback - JNI entry point
#[no_mangle]
pub extern "C" fn Java_com_v2ray_ang_flutter_1v2_1android_v2ray_V2RayNative_getV2RayVersionOrUnknown(
    env: JNIEnv,
    _this: JObject,
) -> jstring {
    new_jstring(&env, &service().version_or_unknown())
}

/// Test TCP latency to a server - JNI entry point (blocking)
///
/// Returns latency in milliseconds, -1 on failure. Non-positive port or
/// timeout selects the configured default.
#[no_mangle]
pub extern "C" fn Java_com_v2ray_ang_flutter_1v2_1android_v2ray_V2RayNative_testLatency(
    mut env: JNIEnv,
    _this: JObject,
    host: JString,
    port: jint,
    timeout_ms: jint,
) -> jint {
    let host_str: String = match env.get_string(&host) {
        Ok(s) => s.into(),
        Err(e) => {
            error!("JNI: invalid host argument: {}", e);
            return LATENCY_FAILED;
        }
    };

    let port = u16::try_from(port).ok().filter(|p| *p > 0);
    let timeout = u64::try_from(timeout_ms)
        .ok()
        .filter(|t| *t > 0)
        .map(Duration::from_millis);

    // One short-lived runtime per latency test; nothing else here is async
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("JNI: failed to create runtime: {}", e);
            return LATENCY_FAILED;
        }
    };

    match rt.block_on(service().test_latency(&host_str, port, timeout)) {
        Ok(ms) => jint::try_from(ms).unwrap_or(jint::MAX),
        Err(_) => LATENCY_FAILED,
    }
}
