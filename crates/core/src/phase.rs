// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow phases and job status.

use serde::{Deserialize, Serialize};

/// A named stage of a multi-step workflow. Not every workflow uses all five
/// forward phases: upgrades run Config → PreCheck → Review → Execute →
/// Results, while backups and deploys go straight from Config to Execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Config,
    PreCheck,
    Review,
    Execute,
    Results,
    /// Reachable from any running phase.
    Failed,
}

impl Phase {
    /// Phases in which a job channel is live and events are expected.
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::PreCheck | Phase::Execute)
    }

    /// Terminal phases: the workflow has landed and only Reset leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Results | Phase::Failed)
    }
}

crate::simple_display! {
    Phase {
        Config => "config",
        PreCheck => "pre_check",
        Review => "review",
        Execute => "execute",
        Results => "results",
        Failed => "failed",
    }
}

/// Which kind of job a channel carries. Determines where its terminal
/// verdict routes the workflow: pre-check verdicts land in Review, execute
/// verdicts land in Results or Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    PreCheck,
    Execute,
}

crate::simple_display! {
    JobKind {
        PreCheck => "pre_check",
        Execute => "execute",
    }
}

/// Lifecycle status of a job session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Success,
    Failed,
}

impl JobStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

crate::simple_display! {
    JobStatus {
        Idle => "idle",
        Running => "running",
        Success => "success",
        Failed => "failed",
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
