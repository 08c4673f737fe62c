// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Relays monitoring agent observations to Blueflood.
//!
//! Input is newline-delimited JSON, one [`observations::Observation`] per line.
//! Each observation is flattened into metric points which are batched per
//! worker and posted to the multi-metric ingestion endpoint.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod buffer;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flattener;
pub mod forwarder;
pub mod metric;
pub mod pipeline;
pub mod shim;
pub mod worker_pool;
