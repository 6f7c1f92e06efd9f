// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! TCP connect latency to a proxy server.

use crate::error::{BridgeError, Result};
use std::time::{Duration, Instant};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

/// Whole milliseconds, saturating at `u64::MAX`
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Time a TCP handshake with `host:port`.
///
/// Name resolution happens before the clock starts.
pub async fn measure_latency(host: &str, port: u16, timeout_duration: Duration) -> Result<Duration> {
    let target = format!("{}:{}", host, port);

    let addr = match lookup_host((host, port)).await {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => addr,
            None => {
                return Err(BridgeError::Resolve {
                    target,
                    reason: "no addresses".to_string(),
                });
            }
        },
        Err(e) => {
            return Err(BridgeError::Resolve {
                target,
                reason: e.to_string(),
            });
        }
    };

    let started = Instant::now();
    match timeout(timeout_duration, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            let elapsed = started.elapsed();
            drop(stream); // Close connection immediately
            Ok(elapsed)
        }
        Ok(Err(source)) => Err(BridgeError::Connect { target, source }),
        Err(_) => Err(BridgeError::Timeout {
            target,
            timeout_ms: duration_ms(timeout_duration),
        }),
    }
}
