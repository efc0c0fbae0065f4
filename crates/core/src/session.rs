// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job session record and completion verdict.

use crate::clock::Clock;
use crate::id::{ChannelId, JobId, SessionId};
use crate::phase::{JobKind, JobStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One in-flight or completed job, created when a job-start request
/// succeeds and discarded on reset or when a new job replaces it. Owns
/// exactly one channel subscription while running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSession {
    pub session_id: SessionId,
    pub job_id: JobId,
    pub channel: ChannelId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
}

impl JobSession {
    pub fn start(job_id: JobId, channel: ChannelId, kind: JobKind, clock: &impl Clock) -> Self {
        Self {
            session_id: SessionId::new(),
            job_id,
            channel,
            kind,
            status: JobStatus::Running,
            created_at: clock.epoch_ms(),
            completed_at: None,
        }
    }

    /// Settle the session with its terminal verdict.
    pub fn settle(&mut self, success: bool, clock: &impl Clock) {
        self.status = if success { JobStatus::Success } else { JobStatus::Failed };
        self.completed_at = Some(clock.epoch_ms());
    }
}

/// Boolean success/failure conclusion derived from a terminal event, plus
/// the payload it was derived from for diagnostic display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub success: bool,
    /// Human-readable terminal message.
    pub message: String,
    /// Name of the heuristic that produced the answer, if any matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
    /// The terminal payload, for the technical view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
