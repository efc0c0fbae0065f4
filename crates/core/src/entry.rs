// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical log entry produced by the event normalizer.
//!
//! Every inbound hub frame, whatever its generation or nesting, is reduced
//! to one `LogEntry` before any downstream consumer sees it. The `event_type`
//! tag is passed through verbatim — dedup signatures, progress matching, and
//! completion heuristics all key on the backend's own vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of message characters that participate in the dedup signature.
pub const SIGNATURE_PREFIX_CHARS: usize = 100;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Info,
    Warning,
    Error,
}

impl Level {
    /// Parse a backend level tag. The pipeline emits `LOG`, `DEBUG`, `INFO`,
    /// `WARNING`, `ERROR`, and `CRITICAL` in various casings; anything
    /// unrecognized is info.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "warning" | "warn" => Level::Warning,
            "error" | "critical" | "fatal" => Level::Error,
            _ => Level::Info,
        }
    }
}

crate::simple_display! {
    Level {
        Info => "info",
        Warning => "warning",
        Error => "error",
    }
}

/// One normalized event, ready for the presentation narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO-8601 timestamp (payload's own, else synthesized at receipt).
    pub timestamp: String,
    pub level: Level,
    /// Backend event tag, verbatim (e.g. `STEP_COMPLETE`).
    #[serde(default)]
    pub event_type: String,
    pub message: String,
    /// Structured payload passthrough for progress/completion consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Original unwrapped payload, kept for the technical view and for
    /// legacy completion heuristics that probe top-level fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl LogEntry {
    /// Dedup signature: event type plus the first 100 characters of the
    /// message. Not globally unique — locally effective is enough, since
    /// operators only ever see the truncated narrative.
    pub fn signature(&self) -> String {
        let prefix: String = self.message.chars().take(SIGNATURE_PREFIX_CHARS).collect();
        format!("{}:{}", self.event_type, prefix)
    }

    /// Fetch a field from the structured payload, if present.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
