// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ow-stream: the job-event pipeline.
//!
//! Raw hub frames flow one way — unwrap → normalize → dedup → progress /
//! completion → phase — and come out the other side as effects for the IO
//! shell. Every stage is pure and tolerant: a malformed frame degrades to
//! the best-effort payload, never an error out of the pipeline.

pub mod completion;
pub mod dedup;
pub mod normalize;
pub mod session;
pub mod unwrap;

pub use completion::SuccessMatcher;
pub use dedup::DedupFilter;
pub use normalize::normalize;
pub use session::{Effect, SessionState};
pub use unwrap::{unwrap_frame, UnwrappedFrame};
