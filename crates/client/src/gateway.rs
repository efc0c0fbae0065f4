// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the job gateway.
//!
//! One call matters here: POST a job-start request and get back the
//! job id plus the hub channel to subscribe to. Error bodies come in
//! two shapes, a JSON object with a `detail` field or plain text, and
//! both are folded into [`ClientError::JobStart`].

use serde::Deserialize;
use serde_json::Value;

use ow_core::{ChannelId, JobId};

use crate::error::ClientError;

/// Successful job-start response from the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStartResponse {
    pub job_id: JobId,
    /// Initial status token, e.g. "started". Informational only.
    #[serde(default)]
    pub status: Option<String>,
    pub ws_channel: ChannelId,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    /// POST `params` to `endpoint` (relative to the base URL) and decode
    /// the job-start response.
    pub async fn start_job(
        &self,
        endpoint: &str,
        params: &Value,
    ) -> Result<JobStartResponse, ClientError> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        let resp = self.http.post(&url).json(params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::JobStart {
                status: status.as_u16(),
                message: error_text(&body),
            });
        }
        Ok(resp.json().await?)
    }
}

/// Pull a human-readable message out of a gateway error body.
fn error_text(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(detail) = value.get("detail") {
            return match detail.as_str() {
                Some(s) => s.to_string(),
                None => detail.to_string(),
            };
        }
    }
    if body.trim().is_empty() {
        "no error detail".to_string()
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
