// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel registry: the authoritative record of which job channels the
//! client is subscribed to, and the encoder for the hub's SUBSCRIBE /
//! UNSUBSCRIBE control frames.
//!
//! A failed control frame is not retried; the state machine drives a new
//! subscription when the user starts a fresh job.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use smol_str::SmolStr;

use ow_core::ChannelId;

use crate::conn::Connection;
use crate::error::ClientError;

/// Where control frames go. The live implementation is [`Connection`];
/// tests substitute a recording sink.
pub trait FrameSink: Send + Sync {
    fn try_send(&self, frame: String) -> Result<(), ClientError>;
    fn is_connected(&self) -> bool;
}

impl FrameSink for Connection {
    fn try_send(&self, frame: String) -> Result<(), ClientError> {
        Connection::try_send(self, frame)
    }

    fn is_connected(&self) -> bool {
        Connection::is_connected(self)
    }
}

/// Control frame sent to the hub to open or close a channel.
#[derive(Debug, Serialize)]
struct ControlFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    channel: &'a str,
}

#[derive(Clone)]
pub struct ChannelRegistry {
    sink: Arc<dyn FrameSink>,
    active: Arc<Mutex<HashSet<SmolStr>>>,
}

impl ChannelRegistry {
    pub fn new(sink: Arc<dyn FrameSink>) -> Self {
        Self { sink, active: Arc::new(Mutex::new(HashSet::new())) }
    }

    /// Ask the hub to start delivering frames for `channel`.
    pub fn subscribe(&self, channel: &ChannelId) -> Result<(), ClientError> {
        let frame = ControlFrame { kind: "SUBSCRIBE", channel: channel.as_str() };
        self.sink.try_send(serde_json::to_string(&frame)?)?;
        self.active.lock().insert(SmolStr::new(channel.as_str()));
        Ok(())
    }

    /// Ask the hub to stop delivering frames for `channel`. The local
    /// record is cleared even when the send fails: the reducer already
    /// drops frames from channels it no longer cares about.
    pub fn unsubscribe(&self, channel: &ChannelId) -> Result<(), ClientError> {
        self.active.lock().remove(channel.as_str());
        let frame = ControlFrame { kind: "UNSUBSCRIBE", channel: channel.as_str() };
        self.sink.try_send(serde_json::to_string(&frame)?)?;
        Ok(())
    }

    pub fn is_active(&self, channel: &ChannelId) -> bool {
        self.active.lock().contains(channel.as_str())
    }

    pub fn active_channels(&self) -> Vec<SmolStr> {
        self.active.lock().iter().cloned().collect()
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_connected()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
