// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream resilience specs
//!
//! Malformed frames, frames for dead channels, late deliveries, and
//! mid-run resets must never corrupt the session narrative.

use yare::parameterized;

use crate::prelude::*;

#[parameterized(
    plain_text = { "not json at all" },
    empty = { "" },
    truncated = { "{broken" },
    trailing_garbage = { r#"{"type": "progress"} extra"# },
)]
fn malformed_frames_are_dropped_silently(text: &str) {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:res-1");

    assert!(console.raw(text).is_empty());
    // Still alive: a real frame lands normally.
    let effects = console.frame("job:res-1", event("LOG", "still here", json!({})));
    assert_eq!(logs(&effects).len(), 1);
}

#[test]
fn frames_for_other_channels_are_ignored() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:res-2");

    let stray = console.frame(
        "job:other",
        event("OPERATION_COMPLETE", "done", json!({ "status": "SUCCESS" })),
    );
    assert!(stray.is_empty(), "stray channel produced {stray:?}");
    assert!(console.state.verdict().is_none());
}

#[test]
fn starting_a_new_job_silences_the_replaced_channel() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:res-3a");
    let effects = console.start(JobKind::Execute, "job:res-3b");

    // The old channel is released before the new one is opened.
    assert_eq!(unsubscribed(&effects).len(), 1);
    assert_eq!(subscribed(&effects).len(), 1);

    let stale = console.frame(
        "job:res-3a",
        event("OPERATION_COMPLETE", "late", json!({ "status": "SUCCESS" })),
    );
    assert!(stale.is_empty());
    assert!(console.state.verdict().is_none());
}

#[test]
fn frames_after_the_verdict_are_dropped() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:res-4");
    console.frame("job:res-4", event("OPERATION_COMPLETE", "done", json!({ "status": "SUCCESS" })));

    let late = console.frame("job:res-4", event("LOG", "in-flight straggler", json!({})));
    assert!(late.is_empty(), "settled session accepted {late:?}");
}

#[test]
fn reset_invalidates_pending_transition_and_clears_state() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:res-5");
    console.frame("job:res-5", event("OPERATION_START", "start", json!({ "total_steps": 2 })));
    let terminal = console
        .frame("job:res-5", event("OPERATION_COMPLETE", "done", json!({ "status": "SUCCESS" })));
    let generation = delay_generation(&terminal).unwrap();

    let effects = console.state.reset();
    assert_eq!(phases(&effects), vec![Phase::Config]);
    assert_eq!(console.state.progress().completed_steps, 0);
    assert!(console.state.verdict().is_none());

    // The timer from before the reset fires into a new generation.
    let late = console.state.delay_elapsed(generation);
    assert!(late.is_empty());
    assert_eq!(console.state.phase(), Phase::Config);
}

#[test]
fn job_start_failure_logs_and_stays_in_config() {
    let mut console = Console::new();
    let effects = console.state.job_start_failed("gateway returned 503");

    let entries = logs(&effects);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, Level::Error);
    assert!(entries[0].message.contains("503"));
    assert_eq!(console.state.phase(), Phase::Config);
}

#[test]
fn identical_message_from_distinct_event_types_is_kept() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:res-6");

    let a = console.frame("job:res-6", event("STEP_START", "Flashing firmware", json!({})));
    let b = console.frame("job:res-6", event("STEP_COMPLETE", "Flashing firmware", json!({})));
    assert_eq!(logs(&a).len(), 1);
    assert_eq!(logs(&b).len(), 1, "signature must include the event type");
}
