// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the client crate.

use std::time::Duration;

/// Job gateway base URL (`OW_GATEWAY_URL`, default local dev server).
pub fn gateway_url() -> String {
    std::env::var("OW_GATEWAY_URL").unwrap_or_else(|_| "http://localhost:8000".into())
}

/// Event hub WebSocket URL (`OW_HUB_URL`).
pub fn hub_url() -> String {
    std::env::var("OW_HUB_URL").unwrap_or_else(|_| "ws://localhost:8000/ws".into())
}

/// Dwell between a terminal event and the phase switch it triggers
/// (default 1.5s, configurable via `OW_TRANSITION_DELAY_MS`).
pub fn transition_delay() -> Duration {
    std::env::var("OW_TRANSITION_DELAY_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(1500))
}

/// Backoff between hub reconnect attempts (default 2s, via `OW_RECONNECT_DELAY_MS`).
pub fn reconnect_delay() -> Duration {
    std::env::var("OW_RECONNECT_DELAY_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(2))
}

/// Extra status tokens treated as success, comma-separated (`OW_SUCCESS_TOKENS`).
pub fn success_tokens() -> Vec<String> {
    std::env::var("OW_SUCCESS_TOKENS")
        .ok()
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
