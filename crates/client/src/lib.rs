// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IO shell for the operations console client.
//!
//! Everything impure lives here: the hub WebSocket connection, the
//! channel registry and its control frames, the job gateway HTTP client,
//! and the async driver that feeds hub frames through the pure session
//! reducer and fans the resulting updates out to the presentation layer.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod conn;
pub mod driver;
pub mod env;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod registry;

pub use conn::Connection;
pub use driver::{spawn_workflow, spawn_workflow_with_state, Command, DriverConfig, Update, WorkflowHandle};
pub use error::ClientError;
pub use gateway::{GatewayClient, JobStartResponse};
pub use registry::{ChannelRegistry, FrameSink};
