// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execute workflow specs
//!
//! Full runs of an execute job from subscription through the terminal
//! event and the delayed phase switch.

use crate::prelude::*;

#[test]
fn four_step_run_lands_in_results_with_full_progress() {
    let mut console = Console::new();

    let effects = console.start(JobKind::Execute, "job:exec-1");
    assert_eq!(subscribed(&effects).len(), 1);
    assert_eq!(phases(&effects), vec![Phase::Execute]);

    let effects = console.frame(
        "job:exec-1",
        event("OPERATION_START", "Starting maintenance", json!({ "total_steps": 4 })),
    );
    assert_eq!(last_progress(&effects).map(|p| p.total_steps), Some(4));
    assert_eq!(last_progress(&effects).map(|p| p.percentage), Some(PERCENT_FLOOR));

    for step in 1..=4u32 {
        let effects = console.frame(
            "job:exec-1",
            event(
                "STEP_COMPLETE",
                &format!("Step {step} done"),
                json!({ "step": step, "status": "success", "name": format!("step-{step}") }),
            ),
        );
        let progress = last_progress(&effects).unwrap();
        assert_eq!(progress.completed_steps, step);
        // 100 is reserved for the terminal event.
        assert!(progress.percentage < 100);
    }

    let effects = console.frame(
        "job:exec-1",
        event("OPERATION_COMPLETE", "Maintenance finished", json!({ "status": "SUCCESS" })),
    );
    let v = verdict(&effects).unwrap();
    assert!(v.success);
    assert_eq!(last_progress(&effects).map(|p| p.percentage), Some(100));
    assert_eq!(unsubscribed(&effects).len(), 1, "channel closes with the verdict");
    assert_eq!(phases(&effects), vec![], "phase waits for the dwell");

    let effects = console.elapse(&effects);
    assert_eq!(phases(&effects), vec![Phase::Results]);
    assert_eq!(console.state.phase(), Phase::Results);
}

#[test]
fn failed_terminal_event_lands_in_failed_phase() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:exec-2");

    let effects = console.frame(
        "job:exec-2",
        event("OPERATION_COMPLETE", "Maintenance aborted", json!({ "status": "FAILED" })),
    );
    let v = verdict(&effects).unwrap();
    assert!(!v.success);
    // Progress is frozen where it was, not forced to 100.
    assert!(last_progress(&effects).is_none_or(|p| p.percentage < 100));

    let effects = console.elapse(&effects);
    assert_eq!(phases(&effects), vec![Phase::Failed]);
}

#[test]
fn unknown_total_advances_in_fixed_increments_capped_below_done() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:exec-3");

    let mut last = 0u8;
    for step in 1..=15u32 {
        let effects = console.frame(
            "job:exec-3",
            event(
                "STEP_COMPLETE",
                &format!("Step {step} done"),
                json!({ "step": step, "status": "success" }),
            ),
        );
        let progress = last_progress(&effects).unwrap();
        assert!(progress.percentage >= last);
        assert!(progress.percentage <= 99, "running progress never reaches 100");
        last = progress.percentage;
    }
}

#[test]
fn redelivered_step_is_not_credited_twice() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:exec-4");
    console.frame("job:exec-4", event("OPERATION_START", "start", json!({ "total_steps": 3 })));

    let step = event("STEP_COMPLETE", "Step 1 done", json!({ "step": 1, "status": "success" }));
    let first = console.frame("job:exec-4", step.clone());
    assert_eq!(last_progress(&first).map(|p| p.completed_steps), Some(1));
    assert_eq!(logs(&first).len(), 1);

    // Same event delivered again: no log, no progress, nothing.
    let second = console.frame("job:exec-4", step);
    assert!(second.is_empty(), "duplicate produced {second:?}");
}

#[test]
fn legacy_execution_complete_frame_settles_the_session() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:exec-5");

    // Old firmware posts a bare frame, no envelope, no `type` field.
    let effects = console
        .raw(r#"{"event": "EXECUTION_COMPLETE", "status": "SUCCESS", "step": "Rebooted device"}"#);
    let v = verdict(&effects).unwrap();
    assert!(v.success);

    let effects = console.elapse(&effects);
    assert_eq!(phases(&effects), vec![Phase::Results]);
}

#[test]
fn terminal_event_inside_orchestrator_stdout_is_honored() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:exec-6");

    let wrapped = event(
        "ORCHESTRATOR_LOG",
        r#"[STDOUT] {"type": "progress", "event_type": "OPERATION_COMPLETE", "message": "done", "data": {"status": "SUCCESS"}}"#,
        json!({}),
    );
    let effects = console.frame("job:exec-6", wrapped);
    assert!(verdict(&effects).is_some_and(|v| v.success));
}

#[test]
fn failed_step_still_credits_progress_at_error_level() {
    let mut console = Console::new();
    console.start(JobKind::Execute, "job:exec-7");
    console.frame("job:exec-7", event("OPERATION_START", "start", json!({ "total_steps": 2 })));

    let effects = console.frame(
        "job:exec-7",
        event("STEP_COMPLETE", "Step 1 failed", json!({ "step": 1, "status": "failed" })),
    );
    assert_eq!(last_progress(&effects).map(|p| p.completed_steps), Some(1));
    assert_eq!(logs(&effects)[0].level, Level::Error);
}
