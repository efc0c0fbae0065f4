// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow session reducer.
//!
//! One `SessionState` owns everything scoped to the active job: the log
//! narrative filter, progress accounting, the completion verdict, and the
//! workflow phase. Inputs are applied synchronously and return the effects
//! the IO shell must execute — there is exactly one event consumer, so no
//! locking happens here.
//!
//! Phases run `Config → (PreCheck → Review →) Execute → Results`, with
//! `Failed` reachable from any running phase. A terminal verdict is emitted
//! immediately (and the channel released); the *phase* switches only after
//! a fixed short delay so the final log line renders before the tab moves.
//! Delays carry a generation number — reset bumps it, so a timer firing
//! after reset is ignored instead of yanking a fresh workflow around.

use crate::completion::{self, SuccessMatcher};
use crate::dedup::DedupFilter;
use crate::normalize::{iso_now, normalize};
use crate::unwrap::unwrap_frame;
use ow_core::{
    ChannelId, Clock, JobId, JobKind, JobSession, Level, LogEntry, Phase, ProgressState, Verdict,
};
use serde_json::Value;

/// Side effects for the IO shell to execute, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue a SUBSCRIBE control frame for this channel.
    Subscribe(ChannelId),
    /// Issue an UNSUBSCRIBE control frame for this channel.
    Unsubscribe(ChannelId),
    /// Append one entry to the log narrative.
    Log(LogEntry),
    /// Progress changed.
    Progress(ProgressState),
    /// The workflow phase changed.
    Phase(Phase),
    /// The terminal verdict — emitted exactly once per session.
    Verdict(Verdict),
    /// Start the phase-transition delay; deliver `delay_elapsed(generation)`
    /// when it fires.
    ScheduleDelay { generation: u64 },
}

/// Reducer over the inbound event stream for one workflow.
#[derive(Debug)]
pub struct SessionState<C: Clock> {
    clock: C,
    matcher: SuccessMatcher,
    phase: Phase,
    session: Option<JobSession>,
    progress: ProgressState,
    dedup: DedupFilter,
    /// The emitted verdict, if any. Set at most once per session.
    verdict: Option<Verdict>,
    /// Staged verdict from a `PRE_CHECK_COMPLETE` summary; overridden by an
    /// `OPERATION_COMPLETE` arriving before the delay flush.
    provisional: Option<Verdict>,
    /// Where the delay lands the workflow when it fires.
    pending_phase: Option<Phase>,
    delay_generation: u64,
}

impl<C: Clock> SessionState<C> {
    pub fn new(clock: C, matcher: SuccessMatcher) -> Self {
        Self {
            clock,
            matcher,
            phase: Phase::Config,
            session: None,
            progress: ProgressState::new(),
            dedup: DedupFilter::new(),
            verdict: None,
            provisional: None,
            pending_phase: None,
            delay_generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn session(&self) -> Option<&JobSession> {
        self.session.as_ref()
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// May an execute job start right now? Only the Review gate can refuse:
    /// a blocked pre-check verdict pins the workflow until a fresh
    /// pre-check allows it. From any other phase a new execute simply
    /// replaces whatever was running.
    pub fn can_start_execute(&self) -> bool {
        match self.phase {
            Phase::Review => self.verdict.as_ref().is_some_and(|v| v.success),
            _ => true,
        }
    }

    /// A job-start request succeeded: adopt the server-assigned job and
    /// channel. Replacing a live session releases its subscription first —
    /// a stale job must not keep emitting into a workflow that moved on.
    pub fn job_started(&mut self, kind: JobKind, job_id: JobId, channel: ChannelId) -> Vec<Effect> {
        if kind == JobKind::Execute && !self.can_start_execute() {
            tracing::warn!(phase = %self.phase, "execute blocked: pre-check verdict does not permit proceeding");
            return Vec::new();
        }

        let mut effects = Vec::new();
        if let Some(old) = self.session.take() {
            effects.push(Effect::Unsubscribe(old.channel));
        }
        self.clear_job_state();
        // Starting a new job invalidates any pending transition.
        self.delay_generation += 1;

        tracing::info!(%job_id, %channel, kind = %kind, "job session started");
        self.session = Some(JobSession::start(job_id, channel.clone(), kind, &self.clock));
        self.phase = match kind {
            JobKind::PreCheck => Phase::PreCheck,
            JobKind::Execute => Phase::Execute,
        };
        effects.push(Effect::Subscribe(channel));
        effects.push(Effect::Phase(self.phase));
        effects
    }

    /// A job-start request failed before any subscription was attempted:
    /// surface the server's error text in the narrative and stay in Config.
    pub fn job_start_failed(&mut self, error_text: &str) -> Vec<Effect> {
        tracing::warn!(error = error_text, "job-start request failed");
        vec![Effect::Log(LogEntry {
            timestamp: iso_now(&self.clock),
            level: Level::Error,
            event_type: "JOB_START_FAILED".into(),
            message: error_text.to_string(),
            data: None,
            raw: None,
        })]
    }

    /// Apply one raw inbound frame. Frames that are not structured events,
    /// are tagged for another channel, or arrive after the session settled
    /// are silently ignored.
    pub fn handle_frame(&mut self, text: &str) -> Vec<Effect> {
        let Some(frame) = unwrap_frame(text) else {
            return Vec::new();
        };
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        if let Some(tag) = &frame.channel {
            if !session.channel.matches_frame(tag) {
                tracing::debug!(frame_channel = %tag, active = %session.channel, "frame for inactive channel ignored");
                return Vec::new();
            }
        }
        if self.verdict.is_some() {
            // Settled: the subscription is already released; late frames
            // (in-flight at unsubscribe time) are dropped.
            return Vec::new();
        }

        let mut entry = normalize(frame.payload, &self.clock);
        if !self.dedup.admit(&entry) {
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.apply_progress(&mut entry, &mut effects);
        effects.push(Effect::Log(entry.clone()));
        self.apply_completion(&entry, &mut effects);
        effects
    }

    /// The phase-transition delay fired. Stale generations (reset or a
    /// newer terminal event since scheduling) are ignored.
    pub fn delay_elapsed(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.delay_generation {
            tracing::debug!(generation, current = self.delay_generation, "stale transition timer ignored");
            return Vec::new();
        }
        let mut effects = Vec::new();

        // Older pre-check scripts never send OPERATION_COMPLETE; flush the
        // staged summary verdict if nothing finalized it meanwhile.
        if self.verdict.is_none() {
            if let Some(v) = self.provisional.take() {
                self.finalize(v, &mut effects);
            }
        }

        if let Some(next) = self.pending_phase.take() {
            self.phase = next;
            effects.push(Effect::Phase(next));
        }
        effects
    }

    /// Reset from any state back to Config: drop the session, the narrative
    /// state, and the active subscription, and invalidate pending timers.
    pub fn reset(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(old) = self.session.take() {
            effects.push(Effect::Unsubscribe(old.channel));
        }
        self.clear_job_state();
        self.delay_generation += 1;
        self.phase = Phase::Config;
        effects.push(Effect::Phase(Phase::Config));
        effects
    }

    fn clear_job_state(&mut self) {
        self.session = None;
        self.progress = ProgressState::new();
        self.dedup.clear();
        self.verdict = None;
        self.provisional = None;
        self.pending_phase = None;
    }

    fn apply_progress(&mut self, entry: &mut LogEntry, effects: &mut Vec<Effect>) {
        let changed = match entry.event_type.as_str() {
            "OPERATION_START" => {
                let total = entry
                    .data_field("total_steps")
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as u32;
                self.progress.announce_total(total);
                true
            }
            "STEP_COMPLETE" => {
                // A failed step still advances the bar; the narrative line
                // carries the failure.
                if step_failed(entry) {
                    entry.level = Level::Error;
                }
                match entry.data_field("step").and_then(Value::as_u64) {
                    Some(index) => self.progress.credit_step(index),
                    None => false,
                }
            }
            "DEVICE_PROGRESS" => {
                let total = entry
                    .data_field("total_steps")
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as u32;
                if total > 0 && self.progress.total_steps == 0 {
                    self.progress.announce_total(total);
                }
                match entry.data_field("step").and_then(Value::as_u64) {
                    Some(index) => self.progress.credit_step(index),
                    None => false,
                }
            }
            _ => false,
        };
        if changed {
            effects.push(Effect::Progress(self.progress.clone()));
        }
    }

    fn apply_completion(&mut self, entry: &LogEntry, effects: &mut Vec<Effect>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let kind = session.kind;

        if completion::is_terminal(entry) {
            let verdict = completion::evaluate(entry, &self.matcher);
            self.finalize(verdict, effects);
            self.schedule_transition(kind, effects);
        } else if kind == JobKind::PreCheck && completion::is_pre_check_summary(entry) {
            self.provisional = Some(completion::evaluate(entry, &self.matcher));
            self.schedule_transition(kind, effects);
        }
    }

    /// Emit the verdict (once), settle the session, and release the channel.
    fn finalize(&mut self, verdict: Verdict, effects: &mut Vec<Effect>) {
        if self.verdict.is_some() {
            return;
        }
        if verdict.success {
            self.progress.complete();
            effects.push(Effect::Progress(self.progress.clone()));
        }
        effects.push(Effect::Verdict(verdict.clone()));
        if let Some(session) = self.session.as_mut() {
            session.settle(verdict.success, &self.clock);
            effects.push(Effect::Unsubscribe(session.channel.clone()));
        }
        self.verdict = Some(verdict);
        self.provisional = None;
    }

    fn schedule_transition(&mut self, kind: JobKind, effects: &mut Vec<Effect>) {
        self.pending_phase = Some(match kind {
            // Pre-check always lands in Review with the verdict attached;
            // proceeding further is gated on the verdict.
            JobKind::PreCheck => Phase::Review,
            JobKind::Execute => {
                let success = self
                    .verdict
                    .as_ref()
                    .or(self.provisional.as_ref())
                    .is_some_and(|v| v.success);
                if success {
                    Phase::Results
                } else {
                    Phase::Failed
                }
            }
        });
        self.delay_generation += 1;
        effects.push(Effect::ScheduleDelay { generation: self.delay_generation });
    }
}

fn step_failed(entry: &LogEntry) -> bool {
    entry
        .data_field("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("FAILED"))
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
