// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the IO layer: hub connection, channel control
/// frames, and the job-start HTTP call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The hub socket is down; control frames fail fast rather than queue.
    #[error("not connected to event hub")]
    Disconnected,

    /// The gateway rejected a job-start request.
    #[error("job start failed ({status}): {message}")]
    JobStart { status: u16, message: String },

    /// Transport-level HTTP failure (connect, timeout, decode).
    #[error("gateway transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// A control frame could not be encoded.
    #[error("frame encode error: {0}")]
    Encode(#[from] serde_json::Error),
}
