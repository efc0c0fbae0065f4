// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Envelope unwrapping — peels 1–3 layers of nesting off a raw hub frame
//! to recover the innermost event payload.
//!
//! The hub republishes pipeline messages as `{"channel": "...", "data":
//! "..."}` where `data` is usually a JSON *string* (double-encoded by the
//! worker). Inside that, orchestrator wrappers carry whole events smuggled
//! as text inside bracketed stream markers: `[STDOUT] {...}`.
//!
//! Every parse failure is non-fatal: the deepest successfully parsed layer
//! wins, and a frame that never parses is simply not a structured event.

use serde_json::Value;
use smol_str::SmolStr;

/// Orchestrator wrapper tag whose message may embed a deeper event.
const LOG_WRAPPER_TYPE: &str = "ORCHESTRATOR_LOG";

/// A frame with its channel tag peeled off and its payload fully unwrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct UnwrappedFrame {
    /// Channel tag from the outer envelope, e.g. `ws_channel:job:abc123`.
    /// Absent when the frame arrived without an envelope (legacy direct
    /// emission).
    pub channel: Option<SmolStr>,
    /// The deepest successfully parsed event payload.
    pub payload: Value,
}

/// Unwrap one raw inbound frame. Returns `None` only when the text is not
/// JSON at all; any structurally surprising frame still comes back as the
/// shallowest parsed object.
pub fn unwrap_frame(text: &str) -> Option<UnwrappedFrame> {
    let outer: Value = serde_json::from_str(text).ok()?;

    let channel = outer
        .get("channel")
        .and_then(|c| c.as_str())
        .map(SmolStr::new);

    let working = peel_data(outer);
    let payload = peel_log_wrapper(working);

    Some(UnwrappedFrame { channel, payload })
}

/// Layer 2: adopt the envelope's `data` field, parsing it first if the
/// worker double-encoded it as a JSON string. No `data` field (or an
/// unparseable one) keeps the envelope itself as the working payload.
fn peel_data(outer: Value) -> Value {
    let inner = match outer.get("data") {
        Some(Value::String(s)) => serde_json::from_str::<Value>(s).ok(),
        Some(obj @ Value::Object(_)) => Some(obj.clone()),
        _ => None,
    };
    inner.unwrap_or(outer)
}

/// Layer 3: an orchestrator log line whose message embeds a JSON object
/// inside bracketed stream markers. If the embedded object parses it
/// supersedes the wrapper as the deepest event.
fn peel_log_wrapper(working: Value) -> Value {
    let is_wrapper = working
        .get("event_type")
        .and_then(|t| t.as_str())
        .is_some_and(|t| t == LOG_WRAPPER_TYPE);
    if !is_wrapper {
        return working;
    }
    let Some(message) = working.get("message").and_then(|m| m.as_str()) else {
        return working;
    };
    match extract_embedded_json(message) {
        Some(inner) => inner,
        None => working,
    }
}

/// Pull a JSON object out of a log line like `[STDOUT] {"event_type": ...}`.
/// The marker must be bracketed and the remainder must parse as an object;
/// anything else is treated as plain text.
fn extract_embedded_json(message: &str) -> Option<Value> {
    let rest = message.strip_prefix('[')?;
    let (_marker, after) = rest.split_once(']')?;
    let candidate = after.trim_start();
    if !candidate.starts_with('{') {
        return None;
    }
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

#[cfg(test)]
#[path = "unwrap_tests.rs"]
mod tests;
