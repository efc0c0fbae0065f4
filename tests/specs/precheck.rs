// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-check workflow specs
//!
//! Pre-check jobs always land in Review; whether Execute can start from
//! there depends on the verdict. Older scripts end with only a
//! PRE_CHECK_COMPLETE summary, newer ones follow it with
//! OPERATION_COMPLETE; either way exactly one verdict is published.

use crate::prelude::*;

#[test]
fn blocked_pre_check_lands_in_review_and_refuses_execute() {
    let mut console = Console::new();
    console.start(JobKind::PreCheck, "job:pre-1");
    assert_eq!(console.state.phase(), Phase::PreCheck);

    console.frame(
        "job:pre-1",
        event(
            "PRE_CHECK_RESULT",
            "Battery below threshold",
            json!({ "check": "battery", "passed": false }),
        ),
    );
    let effects = console.frame(
        "job:pre-1",
        event(
            "PRE_CHECK_COMPLETE",
            "Pre-check finished",
            json!({ "can_proceed": false, "checks_passed": 3, "checks_failed": 1 }),
        ),
    );
    let effects = console.elapse(&effects);
    assert_eq!(phases(&effects), vec![Phase::Review]);
    assert!(verdict(&effects).is_some_and(|v| !v.success));

    assert!(!console.state.can_start_execute());
    let blocked = console.start(JobKind::Execute, "job:pre-1-exec");
    assert!(blocked.is_empty(), "execute must not start: {blocked:?}");
    assert_eq!(console.state.phase(), Phase::Review);
}

#[test]
fn allowed_pre_check_permits_execute_from_review() {
    let mut console = Console::new();
    console.start(JobKind::PreCheck, "job:pre-2");

    let effects = console.frame(
        "job:pre-2",
        event("PRE_CHECK_COMPLETE", "All checks passed", json!({ "can_proceed": true })),
    );
    let effects = console.elapse(&effects);
    assert_eq!(phases(&effects), vec![Phase::Review]);
    assert!(console.state.can_start_execute());

    let effects = console.start(JobKind::Execute, "job:pre-2-exec");
    assert_eq!(phases(&effects), vec![Phase::Execute]);
    assert_eq!(subscribed(&effects).len(), 1);
}

#[test]
fn summary_then_operation_complete_publishes_one_verdict() {
    let mut console = Console::new();
    console.start(JobKind::PreCheck, "job:pre-3");

    // Summary stages a provisional verdict and schedules a dwell.
    let summary = console.frame(
        "job:pre-3",
        event("PRE_CHECK_COMPLETE", "Checks done", json!({ "can_proceed": true })),
    );
    assert!(verdict(&summary).is_none(), "summary alone must not publish");
    let stale = delay_generation(&summary);

    // The real terminal event finalizes immediately.
    let terminal = console.frame(
        "job:pre-3",
        event("OPERATION_COMPLETE", "Pre-check complete", json!({ "can_proceed": true })),
    );
    assert!(verdict(&terminal).is_some_and(|v| v.success));

    // The summary's timer is stale now; firing it must do nothing.
    let late = console.state.delay_elapsed(stale.unwrap());
    assert!(late.is_empty(), "stale summary timer produced {late:?}");

    // The terminal event's own timer moves the phase.
    let effects = console.elapse(&terminal);
    assert_eq!(phases(&effects), vec![Phase::Review]);
}

#[test]
fn storage_check_summary_with_validation_flag_settles_on_dwell() {
    let mut console = Console::new();
    console.start(JobKind::PreCheck, "job:pre-5");

    // Storage pre-checks report `validation_passed` instead of
    // `can_proceed` and never send OPERATION_COMPLETE.
    let summary = console.frame(
        "job:pre-5",
        event(
            "PRE_CHECK_COMPLETE",
            "Storage validation finished",
            json!({ "validation_passed": false, "details": { "free_gb": 1.2 } }),
        ),
    );
    assert!(verdict(&summary).is_none());

    let effects = console.elapse(&summary);
    assert!(verdict(&effects).is_some_and(|v| !v.success));
    assert_eq!(phases(&effects), vec![Phase::Review]);
    assert!(!console.state.can_start_execute());
}

#[test]
fn summary_only_session_flushes_provisional_verdict_on_dwell() {
    let mut console = Console::new();
    console.start(JobKind::PreCheck, "job:pre-4");

    let summary = console.frame(
        "job:pre-4",
        event("PRE_CHECK_COMPLETE", "Checks done", json!({ "can_proceed": true })),
    );
    assert!(verdict(&summary).is_none());

    // No OPERATION_COMPLETE ever arrives; the dwell publishes the verdict.
    let effects = console.elapse(&summary);
    assert!(verdict(&effects).is_some_and(|v| v.success));
    assert_eq!(unsubscribed(&effects).len(), 1);
    assert_eq!(phases(&effects), vec![Phase::Review]);
}
