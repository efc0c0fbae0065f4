// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the scenario specs.

#![allow(dead_code)]

pub use ow_core::{
    ChannelId, FakeClock, JobId, JobKind, Level, LogEntry, Phase, ProgressState, Verdict,
    PERCENT_FLOOR,
};
pub use ow_stream::{Effect, SessionState, SuccessMatcher};
pub use serde_json::{json, Value};

/// One console session under test, fed hub frames as raw text exactly
/// as the hub would deliver them.
pub struct Console {
    pub state: SessionState<FakeClock>,
    pub clock: FakeClock,
}

impl Console {
    pub fn new() -> Self {
        let clock = FakeClock::new();
        clock.set_epoch_ms(1_770_804_000_000);
        Self { state: SessionState::new(clock.clone(), SuccessMatcher::default()), clock }
    }

    /// Bind a job session, as the driver does after a gateway response.
    pub fn start(&mut self, kind: JobKind, channel: &str) -> Vec<Effect> {
        self.state.job_started(
            kind,
            JobId::from_string(format!("job-{channel}")),
            ChannelId::from_string(channel),
        )
    }

    /// Deliver one inner event wrapped in the hub envelope for `channel`.
    pub fn frame(&mut self, channel: &str, inner: Value) -> Vec<Effect> {
        let text = json!({
            "channel": format!("ws_channel:{channel}"),
            "data": inner.to_string(),
        })
        .to_string();
        self.state.handle_frame(&text)
    }

    /// Deliver raw frame text with no envelope handling.
    pub fn raw(&mut self, text: &str) -> Vec<Effect> {
        self.state.handle_frame(text)
    }

    /// Fire the transition timer scheduled by `effects`, if any.
    pub fn elapse(&mut self, effects: &[Effect]) -> Vec<Effect> {
        match delay_generation(effects) {
            Some(generation) => self.state.delay_elapsed(generation),
            None => Vec::new(),
        }
    }
}

pub fn event(event_type: &str, message: &str, data: Value) -> Value {
    json!({
        "type": "progress",
        "event_type": event_type,
        "message": message,
        "data": data,
    })
}

pub fn phases(effects: &[Effect]) -> Vec<Phase> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Phase(p) => Some(*p),
            _ => None,
        })
        .collect()
}

pub fn logs(effects: &[Effect]) -> Vec<&LogEntry> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Log(entry) => Some(entry),
            _ => None,
        })
        .collect()
}

pub fn verdict(effects: &[Effect]) -> Option<&Verdict> {
    effects.iter().find_map(|e| match e {
        Effect::Verdict(v) => Some(v),
        _ => None,
    })
}

pub fn last_progress(effects: &[Effect]) -> Option<&ProgressState> {
    effects.iter().rev().find_map(|e| match e {
        Effect::Progress(p) => Some(p),
        _ => None,
    })
}

pub fn delay_generation(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|e| match e {
        Effect::ScheduleDelay { generation } => Some(*generation),
        _ => None,
    })
}

pub fn subscribed(effects: &[Effect]) -> Vec<&ChannelId> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Subscribe(c) => Some(c),
            _ => None,
        })
        .collect()
}

pub fn unsubscribed(effects: &[Effect]) -> Vec<&ChannelId> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Unsubscribe(c) => Some(c),
            _ => None,
        })
        .collect()
}
