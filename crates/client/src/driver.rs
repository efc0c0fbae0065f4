// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async workflow driver.
//!
//! Glues the pure session reducer to the IO shell: inbound hub frames
//! and user commands go in, [`Update`]s for the presentation layer come
//! out. Every effect the reducer emits is executed here — subscriptions
//! through the registry, job starts through the gateway, transition
//! delays as spawned timers that report back with their generation so
//! a reset can strand them.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

use ow_core::{Clock, JobKind, LogEntry, Phase, ProgressState, SystemClock, Verdict};
use ow_stream::{Effect, SessionState, SuccessMatcher};

use crate::env;
use crate::gateway::GatewayClient;
use crate::registry::ChannelRegistry;

const UPDATE_BUFFER: usize = 256;
const COMMAND_BUFFER: usize = 16;

/// State change fanned out to the presentation layer.
#[derive(Debug, Clone)]
pub enum Update {
    Log(LogEntry),
    Progress(ProgressState),
    Phase(Phase),
    Verdict(Verdict),
}

/// User action flowing into the driver.
#[derive(Debug)]
pub enum Command {
    /// POST to the gateway and, on success, bind the session to the
    /// returned channel.
    StartJob { kind: JobKind, endpoint: String, params: Value },
    /// Abandon the current session and return to configuration.
    Reset,
}

/// Driver settings; [`DriverConfig::from_env`] reads the `OW_*` variables.
#[derive(Clone)]
pub struct DriverConfig {
    pub transition_delay: Duration,
    pub matcher: SuccessMatcher,
}

impl DriverConfig {
    pub fn from_env() -> Self {
        Self {
            transition_delay: env::transition_delay(),
            matcher: SuccessMatcher::default().with_extra_tokens(env::success_tokens()),
        }
    }
}

/// Handle for pushing [`Command`]s into a running driver.
#[derive(Clone)]
pub struct WorkflowHandle {
    commands: mpsc::Sender<Command>,
}

impl WorkflowHandle {
    pub async fn start_job(&self, kind: JobKind, endpoint: impl Into<String>, params: Value) {
        let cmd = Command::StartJob { kind, endpoint: endpoint.into(), params };
        let _ = self.commands.send(cmd).await;
    }

    pub async fn reset(&self) {
        let _ = self.commands.send(Command::Reset).await;
    }
}

/// Spawn a driver on the current runtime. `frames` is one subscription to
/// the shared hub connection ([`crate::Connection::frames`]); several
/// drivers can run against the same connection, each ignoring the
/// channels it does not own.
pub fn spawn_workflow(
    gateway: GatewayClient,
    registry: ChannelRegistry,
    frames: broadcast::Receiver<String>,
    config: DriverConfig,
) -> (WorkflowHandle, mpsc::Receiver<Update>) {
    let state = SessionState::new(SystemClock, config.matcher);
    spawn_workflow_with_state(gateway, registry, frames, config.transition_delay, state)
}

/// Same as [`spawn_workflow`] but with caller-built reducer state, for
/// injecting a fake clock or a pre-bound session.
pub fn spawn_workflow_with_state<C: Clock + 'static>(
    gateway: GatewayClient,
    registry: ChannelRegistry,
    frames: broadcast::Receiver<String>,
    transition_delay: Duration,
    state: SessionState<C>,
) -> (WorkflowHandle, mpsc::Receiver<Update>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (update_tx, update_rx) = mpsc::channel(UPDATE_BUFFER);
    let (delay_tx, delay_rx) = mpsc::channel(COMMAND_BUFFER);

    let driver = WorkflowDriver {
        state,
        gateway,
        registry,
        frames,
        commands: command_rx,
        delays: delay_rx,
        delay_tx,
        updates: update_tx,
        transition_delay,
    };
    tokio::spawn(driver.run());

    (WorkflowHandle { commands: command_tx }, update_rx)
}

struct WorkflowDriver<C: Clock> {
    state: SessionState<C>,
    gateway: GatewayClient,
    registry: ChannelRegistry,
    frames: broadcast::Receiver<String>,
    commands: mpsc::Receiver<Command>,
    delays: mpsc::Receiver<u64>,
    delay_tx: mpsc::Sender<u64>,
    updates: mpsc::Sender<Update>,
    transition_delay: Duration,
}

impl<C: Clock> WorkflowDriver<C> {
    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd).await,
                        // All handles dropped; stop once the frame
                        // stream is the only thing keeping us alive.
                        None => break,
                    }
                }
                frame = self.frames.recv() => {
                    match frame {
                        Ok(text) => {
                            let effects = self.state.handle_frame(&text);
                            self.apply(effects).await;
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Dedup and idempotent crediting absorb most of
                            // the damage from a lagged stream.
                            tracing::warn!(skipped, "frame stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                Some(generation) = self.delays.recv() => {
                    let effects = self.state.delay_elapsed(generation);
                    self.apply(effects).await;
                }
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::StartJob { kind, endpoint, params } => {
                if !self.registry.is_connected() {
                    let effects = self
                        .state
                        .job_start_failed("Not connected to event hub; cannot start job");
                    self.apply(effects).await;
                    return;
                }
                // Refuse before the POST: a gated execute must not launch a
                // server-side job the reducer would then refuse to track.
                if kind == JobKind::Execute && !self.state.can_start_execute() {
                    let effects = self
                        .state
                        .job_start_failed("Execute blocked: pre-check verdict does not permit proceeding");
                    self.apply(effects).await;
                    return;
                }
                match self.gateway.start_job(&endpoint, &params).await {
                    Ok(resp) => {
                        tracing::info!(job_id = %resp.job_id, channel = %resp.ws_channel, "job started");
                        let effects = self.state.job_started(kind, resp.job_id, resp.ws_channel);
                        self.apply(effects).await;
                    }
                    Err(e) => {
                        tracing::warn!(%e, "job start failed");
                        let effects = self.state.job_start_failed(&e.to_string());
                        self.apply(effects).await;
                    }
                }
            }
            Command::Reset => {
                let effects = self.state.reset();
                self.apply(effects).await;
            }
        }
    }

    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Subscribe(channel) => {
                    if let Err(e) = self.registry.subscribe(&channel) {
                        tracing::warn!(%channel, %e, "subscribe failed");
                    }
                }
                Effect::Unsubscribe(channel) => {
                    if let Err(e) = self.registry.unsubscribe(&channel) {
                        tracing::warn!(%channel, %e, "unsubscribe failed");
                    }
                }
                Effect::Log(entry) => {
                    let _ = self.updates.send(Update::Log(entry)).await;
                }
                Effect::Progress(progress) => {
                    let _ = self.updates.send(Update::Progress(progress)).await;
                }
                Effect::Phase(phase) => {
                    let _ = self.updates.send(Update::Phase(phase)).await;
                }
                Effect::Verdict(verdict) => {
                    let _ = self.updates.send(Update::Verdict(verdict)).await;
                }
                Effect::ScheduleDelay { generation } => {
                    let tx = self.delay_tx.clone();
                    let delay = self.transition_delay;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(generation).await;
                    });
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
