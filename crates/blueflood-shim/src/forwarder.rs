// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shipping batches of metric points to Blueflood.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error, info};

use crate::errors::ForwardError;
use crate::metric::MetricPoint;

#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Ships `points` as a single batch. Returns once the endpoint has
    /// acknowledged it, or with the reason it did not.
    async fn send(&self, points: &[MetricPoint]) -> Result<(), ForwardError>;
}

/// Posts batches to a Blueflood multi-metric ingestion endpoint.
///
/// Each forwarder owns its own client, so workers never share a connection
/// pool.
#[derive(Debug, Clone)]
pub struct BluefloodForwarder {
    client: reqwest::Client,
    url: String,
}

impl BluefloodForwarder {
    pub fn new(url: String, timeout: Duration) -> Result<Self, ForwardError> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// The ingestion endpoint does not speak compressed bodies, so every
/// content-encoding is turned off regardless of which reqwest features are
/// compiled in.
fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .timeout(timeout)
        .build()
}

#[async_trait]
impl Forwarder for BluefloodForwarder {
    async fn send(&self, points: &[MetricPoint]) -> Result<(), ForwardError> {
        let payload = serde_json::to_string(points)?;
        info!("Sending {} points to {}: {}", points.len(), self.url, payload);

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            error!("{}: Failed to push to Blueflood: {:?}", status, body);
            return Err(ForwardError::Rejected { status, body });
        }

        // Read the body to the end so the connection goes back to the pool
        resp.bytes().await?;
        debug!("Blueflood accepted {} points with {}", points.len(), status);
        Ok(())
    }
}
