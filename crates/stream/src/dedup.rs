// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Duplicate suppression for the log narrative.
//!
//! The backend redelivers logically identical events (reconnects, multi-path
//! emission through both the progress feed and the orchestrator log), so the
//! same line would otherwise appear twice. Suppression keys on the entry
//! signature — event type plus a 100-char message prefix. Collisions across
//! genuinely distinct events are an accepted, bounded risk, not something to
//! fix with whole-payload hashing.

use ow_core::LogEntry;
use std::collections::HashSet;

/// First-occurrence filter, scoped to one job session.
#[derive(Debug, Default)]
pub struct DedupFilter {
    seen: HashSet<String>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if this entry's signature has not been seen before; records it.
    pub fn admit(&mut self, entry: &LogEntry) -> bool {
        self.seen.insert(entry.signature())
    }

    /// Number of distinct signatures admitted so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forget everything — used on session reset.
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

#[cfg(test)]
#[path = "dedup_tests.rs"]
mod tests;
