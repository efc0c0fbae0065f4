// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion detection — turns a terminal-looking event into a single
//! boolean verdict under several historical backend contracts.
//!
//! The "job is done" signal has shipped in at least three shapes: the
//! current pipeline sends `OPERATION_COMPLETE` with `data.status` and
//! `data.can_proceed`, an older generation sent a top-level `success`
//! boolean, and the oldest relied on a success phrase in free text. Rather
//! than branching on shape at each call site, the heuristics are an ordered
//! chain of pure rules; evaluation stops at the first definite answer, and
//! no answer defaults to failure — never silently to success.

use ow_core::{LogEntry, Verdict};
use serde_json::Value;

/// Event tags that signal a finished job phase.
const TERMINAL_TYPES: &[&str] = &["OPERATION_COMPLETE", "EXECUTION_COMPLETE"];

/// Pre-check summary tag: terminal only for older script generations that
/// never follow up with `OPERATION_COMPLETE` (see the session reducer's
/// provisional-verdict handling).
pub const PRE_CHECK_SUMMARY: &str = "PRE_CHECK_COMPLETE";

/// Success vocabulary. Token matching is exact (case-insensitive) against
/// `status`-style fields; phrase matching is substring (case-insensitive)
/// against free-text messages. The defaults cover every observed backend
/// generation; deployments extend the list through configuration instead of
/// patching the chain.
#[derive(Debug, Clone)]
pub struct SuccessMatcher {
    tokens: Vec<String>,
    phrases: Vec<String>,
}

impl Default for SuccessMatcher {
    fn default() -> Self {
        Self {
            tokens: vec!["SUCCESS".into(), "COMPLETED".into()],
            phrases: vec![
                "completed successfully".into(),
                "execution finished".into(),
                "can proceed: yes".into(),
            ],
        }
    }
}

impl SuccessMatcher {
    /// Extend the token list (e.g. from `OW_SUCCESS_TOKENS`).
    pub fn with_extra_tokens<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(extra.into_iter().map(Into::into));
        self
    }

    fn token_matches(&self, value: &str) -> bool {
        self.tokens.iter().any(|t| t.eq_ignore_ascii_case(value))
    }

    fn phrase_matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.phrases.iter().any(|p| lower.contains(p.as_str()))
    }
}

/// Is this normalized event terminal for a running job phase?
pub fn is_terminal(entry: &LogEntry) -> bool {
    TERMINAL_TYPES.contains(&entry.event_type.as_str())
}

/// Does this event carry a pre-check summary verdict? Used by the reducer
/// to stage a provisional verdict in case no `OPERATION_COMPLETE` follows.
///
/// The verdict flag varies by script generation: `can_proceed` (upgrade
/// pre-checks) or a boolean `passed`/`validation_passed` (storage checks).
/// A numeric `passed` is a check count, not a verdict.
pub fn is_pre_check_summary(entry: &LogEntry) -> bool {
    if entry.event_type != PRE_CHECK_SUMMARY {
        return false;
    }
    entry.data_field("can_proceed").is_some()
        || entry.data_field("validation_passed").and_then(Value::as_bool).is_some()
        || entry.data_field("passed").and_then(Value::as_bool).is_some()
}

type Rule = fn(&LogEntry, &SuccessMatcher) -> Option<bool>;

/// The heuristic chain, in fixed priority order. Adding or retiring a
/// legacy contract means editing this table, nothing else.
const RULES: &[(&str, Rule)] = &[
    ("boolean-flag", rule_boolean_flag),
    ("status-token", rule_status_token),
    ("final-results", rule_final_results),
    ("message-phrase", rule_message_phrase),
];

/// Evaluate the chain against a terminal event and produce the verdict.
pub fn evaluate(entry: &LogEntry, matcher: &SuccessMatcher) -> Verdict {
    for (name, rule) in RULES {
        if let Some(success) = rule(entry, matcher) {
            tracing::debug!(rule = name, success, event_type = %entry.event_type, "terminal verdict");
            return Verdict {
                success,
                message: entry.message.clone(),
                matched_rule: Some((*name).to_string()),
                payload: entry.raw.clone().or_else(|| entry.data.clone()),
            };
        }
    }

    // No heuristic matched: default to failure, and flag the payload so a
    // new backend contract gets noticed instead of silently failing jobs.
    let payload = entry.raw.as_ref().unwrap_or(&Value::Null);
    tracing::warn!(
        event_type = %entry.event_type,
        %payload,
        "terminal event matched no completion heuristic; defaulting to failure"
    );
    Verdict {
        success: false,
        message: entry.message.clone(),
        matched_rule: None,
        payload: entry.raw.clone().or_else(|| entry.data.clone()),
    }
}

/// (a) Explicit boolean flag in structured data: `data.can_proceed`,
/// `data.success`, or the storage pre-check's `validation_passed`/`passed`,
/// falling back to the legacy top-level `success`.
fn rule_boolean_flag(entry: &LogEntry, _: &SuccessMatcher) -> Option<bool> {
    entry
        .data_field("can_proceed")
        .and_then(Value::as_bool)
        .or_else(|| entry.data_field("success").and_then(Value::as_bool))
        .or_else(|| entry.data_field("validation_passed").and_then(Value::as_bool))
        .or_else(|| entry.data_field("passed").and_then(Value::as_bool))
        .or_else(|| top_level(entry, "success").and_then(Value::as_bool))
}

/// (b) `status` field equal to a known success token. A present-but-unknown
/// status is a definite failure, not a fall-through: `FAILED` must not leak
/// into the phrase rule.
fn rule_status_token(entry: &LogEntry, matcher: &SuccessMatcher) -> Option<bool> {
    let status = entry
        .data_field("status")
        .and_then(Value::as_str)
        .or_else(|| top_level(entry, "status").and_then(Value::as_str))?;
    Some(matcher.token_matches(status))
}

/// (c) Nested final-results success flag.
fn rule_final_results(entry: &LogEntry, _: &SuccessMatcher) -> Option<bool> {
    entry
        .data_field("final_results")
        .and_then(|fr| fr.get("success"))
        .and_then(Value::as_bool)
}

/// (d) Success phrase inside the free-text message.
fn rule_message_phrase(entry: &LogEntry, matcher: &SuccessMatcher) -> Option<bool> {
    matcher.phrase_matches(&entry.message).then_some(true)
}

fn top_level<'a>(entry: &'a LogEntry, key: &str) -> Option<&'a Value> {
    entry.raw.as_ref().and_then(|r| r.get(key))
}

#[cfg(test)]
#[path = "completion_tests.rs"]
mod tests;
