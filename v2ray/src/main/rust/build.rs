// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

// Build script for the V2Ray bridge
// Links the prebuilt V2Ray core on Android

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=V2RAY_CORE_LIB_DIR");

    // Build scripts run on the host, so check the target through Cargo
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "android" {
        return;
    }

    if let Ok(dir) = env::var("V2RAY_CORE_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
    }
    println!("cargo:rustc-link-lib=dylib=v2raycore");
    println!("cargo:rustc-link-lib=log");
}
