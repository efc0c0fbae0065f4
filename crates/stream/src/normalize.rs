// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event normalization — maps an unwrapped payload, whatever its shape,
//! into one canonical [`LogEntry`].
//!
//! The mapping is intentionally permissive: three generations of backend
//! scripts emit three vocabularies, and a malformed payload still has to
//! become a usable narrative line rather than being dropped.

use ow_core::{Clock, Level, LogEntry};
use serde_json::Value;

/// Placeholder when a payload carries no usable message.
const NO_MESSAGE: &str = "(no message)";

/// Normalize one unwrapped payload into a `LogEntry`.
///
/// Field rules, in priority order:
/// - `timestamp`: payload's own (string, or numeric epoch seconds), else now.
/// - `message`: payload `message`, else `step` (legacy execution feed), else
///   `data.name` (step events), else the payload itself when it is a bare
///   string, else a placeholder.
/// - `level`: payload `level` lower-cased, else info.
/// - `event_type`: `event_type` / `type` / `event` verbatim, never renamed.
/// - `data`: structured passthrough for downstream consumers.
pub fn normalize(payload: Value, clock: &impl Clock) -> LogEntry {
    let timestamp = payload_timestamp(&payload).unwrap_or_else(|| iso_now(clock));

    let level = payload
        .get("level")
        .and_then(|l| l.as_str())
        .map(Level::parse)
        .unwrap_or_default();

    let event_type = payload
        .get("event_type")
        .or_else(|| payload.get("type"))
        .or_else(|| payload.get("event"))
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();

    let message = payload
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .or_else(|| legacy_step_text(&payload))
        .or_else(|| payload.as_str().map(str::to_string))
        .unwrap_or_else(|| NO_MESSAGE.to_string());

    let data = payload.get("data").cloned();

    LogEntry { timestamp, level, event_type, message, data, raw: Some(payload) }
}

/// Legacy execution-feed events put their human text in `step`; step events
/// name themselves in `data.name`.
fn legacy_step_text(payload: &Value) -> Option<String> {
    payload
        .get("step")
        .and_then(|s| s.as_str())
        .or_else(|| {
            payload
                .get("data")
                .and_then(|d| d.get("name"))
                .and_then(|n| n.as_str())
        })
        .map(str::to_string)
}

fn payload_timestamp(payload: &Value) -> Option<String> {
    match payload.get("timestamp")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        // Numeric timestamps are epoch seconds, possibly fractional.
        Value::Number(n) => {
            let ms = (n.as_f64()? * 1000.0) as i64;
            Some(iso_from_epoch_ms(ms.max(0) as u64))
        }
        _ => None,
    }
}

pub(crate) fn iso_now(clock: &impl Clock) -> String {
    iso_from_epoch_ms(clock.epoch_ms())
}

fn iso_from_epoch_ms(ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
