// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::process::ExitCode;

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use blueflood_shim::{config::Config, constants::DEFAULT_LOG_LEVEL, shim};

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = std::env::var("BF_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or(DEFAULT_LOG_LEVEL.to_string());
    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    let filter =
        EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    debug!("Logging subsystem enabled");
    info!("Blueflood shim started");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on Blueflood shim startup: {e}");
            return ExitCode::FAILURE;
        }
    };

    match shim::run(&config).await {
        Ok(_) => {
            info!("Blueflood shim terminated");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Blueflood shim failed: {e}");
            ExitCode::FAILURE
        }
    }
}
