// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step/progress accounting for the active job.
//!
//! The backend redelivers step events (reconnects, multi-path emission) and
//! may deliver them out of order, so crediting is idempotent: each physical
//! step index counts at most once, tracked by a seen-index set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Floor seeded when a total is announced, so the bar never sits at a
/// visually static 0% while the job is demonstrably running.
pub const PERCENT_FLOOR: u8 = 5;

/// Increment applied per step when no total was ever announced.
pub const UNKNOWN_TOTAL_INCREMENT: u8 = 10;

/// Running jobs are capped below 100; only a terminal verdict completes the bar.
pub const RUNNING_CAP: u8 = 99;

/// Completed/total step counts and a 0–100 percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProgressState {
    pub total_steps: u32,
    pub completed_steps: u32,
    pub percentage: u8,
    #[serde(skip)]
    seen: BTreeSet<u64>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the announced step total and seed the percentage floor.
    pub fn announce_total(&mut self, total: u32) {
        self.total_steps = total;
        if self.percentage < PERCENT_FLOOR {
            self.percentage = PERCENT_FLOOR;
        }
        self.recompute();
    }

    /// Credit one step index. Returns false if this index was already
    /// credited (replay or duplicate delivery) — the state is unchanged.
    pub fn credit_step(&mut self, index: u64) -> bool {
        if !self.seen.insert(index) {
            return false;
        }
        self.completed_steps = self.seen.len() as u32;
        if self.total_steps > 0 {
            // A backend emitting more distinct indices than it announced
            // must not push completed past total.
            self.completed_steps = self.completed_steps.min(self.total_steps);
            self.recompute();
        } else {
            self.percentage = (self.percentage + UNKNOWN_TOTAL_INCREMENT).min(RUNNING_CAP);
        }
        true
    }

    /// Terminal success: force the bar full.
    pub fn complete(&mut self) {
        if self.total_steps > 0 {
            self.completed_steps = self.total_steps;
        }
        self.percentage = 100;
    }

    /// Number of distinct step indices credited so far.
    pub fn distinct_steps(&self) -> usize {
        self.seen.len()
    }

    fn recompute(&mut self) {
        if self.total_steps == 0 {
            return;
        }
        let pct = (self.completed_steps as f64 / self.total_steps as f64 * 100.0).round() as u8;
        self.percentage = pct.clamp(PERCENT_FLOOR, RUNNING_CAP);
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
