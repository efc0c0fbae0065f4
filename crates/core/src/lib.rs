// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ow-core: domain types for the opswatch job-event client.
//!
//! Pure data and state — no IO. The stream pipeline (`ow-stream`) reduces
//! inbound hub frames onto these types and the client shell (`ow-client`)
//! moves them over the wire.

pub mod macros;

pub mod clock;
pub mod entry;
pub mod id;
pub mod phase;
pub mod progress;
pub mod session;

pub use clock::{Clock, FakeClock, SystemClock};
pub use entry::{Level, LogEntry, SIGNATURE_PREFIX_CHARS};
pub use id::{ChannelId, JobId, SessionId};
pub use phase::{JobKind, JobStatus, Phase};
pub use progress::{ProgressState, PERCENT_FLOOR, RUNNING_CAP, UNKNOWN_TOTAL_INCREMENT};
pub use session::{JobSession, Verdict};
