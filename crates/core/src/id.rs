// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes.
//!
//! `JobId` and `ChannelId` are opaque, server-assigned strings — the gateway
//! hands them back in the job-start response and they are never synthesized
//! client-side. `SessionId` is client-generated and correlates one workflow
//! run across logs.

crate::define_id! {
    /// Server-assigned job identifier (e.g. `validation-<uuid>`).
    pub struct JobId;
}

crate::define_id! {
    /// Server-assigned subscription key for a job's event stream
    /// (e.g. `job:validation-<uuid>`).
    pub struct ChannelId;
}

impl ChannelId {
    /// Hub messages arrive tagged with a `ws_channel:` prefix prepended by
    /// the hub when it republishes from the backend pipeline. A frame
    /// matches this channel if the tags are equal outright or equal after
    /// stripping that prefix.
    pub fn matches_frame(&self, frame_channel: &str) -> bool {
        if self.0 == frame_channel {
            return true;
        }
        frame_channel
            .strip_prefix("ws_channel:")
            .is_some_and(|rest| self.0 == rest)
    }
}

crate::define_id! {
    /// Client-generated identifier for one workflow session.
    pub struct SessionId("ses-");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
