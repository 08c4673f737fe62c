// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// How long ingested points live in Blueflood, in seconds (two days)
pub const DEFAULT_INGESTION_TTL: u32 = 172_800;

/// A buffer flushes once it holds more than this many points
pub const DEFAULT_FLUSH_THRESHOLD: usize = 1500;

pub const DEFAULT_DUMP_PATH: &str = "dump.json";

pub const DEFAULT_INGEST_URL: &str =
    "http://qe01.metrics-ingest.api.rackspacecloud.com/v2.0/706456/ingest/multi";

pub const DEFAULT_JOBS: usize = 1;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Leading segment of every metric name
pub const METRIC_NAME_ROOT: &str = "rackspace.monitoring.entities";
