// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for the shim.
//!
//! Every stage returns one of these instead of exiting; the binary is the only
//! place that turns an error into a process exit.

use reqwest::StatusCode;

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while shipping a batch to the ingestion endpoint
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("Failed to serialize payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Failed to reach ingestion endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Ingestion endpoint rejected batch with status {status}: {body:?}")]
    Rejected { status: StatusCode, body: String },
}

/// Top-level error for a shim run
#[derive(Debug, thiserror::Error)]
pub enum ShimError {
    #[error("Failed to parse observation on line {line}: {source}")]
    InputParse {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Forward(#[from] ForwardError),

    #[error("Failed to read input: {0}")]
    SourceIo(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Worker stopped unexpectedly: {0}")]
    Worker(String),
}
