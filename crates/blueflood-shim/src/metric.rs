// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Outbound metric points and their names.

use observations::Observation;
use serde::Serialize;

use crate::constants::METRIC_NAME_ROOT;

/// One numeric measurement in the shape Blueflood's multi-metric ingest expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    /// Serialized as `null` when the observation carries no tenant.
    pub tenant_id: Option<String>,
    pub collection_time: i64,
    pub ttl_in_seconds: u32,
    pub metric_value: f64,
    pub metric_name: String,
}

/// Builds the fully qualified name of `field` within `obs`.
///
/// The prefix is the dot-joined sequence `rackspace.monitoring.entities`,
/// entity id, `checks`, check type, check id and monitoring zone id, where the
/// two optional segments are left out entirely when absent. `field` is appended
/// to the prefix without a separator.
///
/// ```
/// use blueflood_shim::metric::metric_name;
/// use observations::Observation;
///
/// let obs = Observation {
///     entity_id: "e1".to_string(),
///     check_id: "c1".to_string(),
///     monitoring_zone_id: Some("z1".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(
///     metric_name("cpu", &obs),
///     "rackspace.monitoring.entities.e1.checks.c1.z1cpu"
/// );
/// ```
pub fn metric_name(field: &str, obs: &Observation) -> String {
    let mut segments: Vec<&str> = Vec::with_capacity(6);
    segments.push(METRIC_NAME_ROOT);
    segments.push(&obs.entity_id);
    segments.push("checks");
    if let Some(check_type) = obs.check_type.as_deref() {
        segments.push(check_type);
    }
    segments.push(&obs.check_id);
    if let Some(zone) = obs.monitoring_zone_id.as_deref() {
        segments.push(zone);
    }

    let mut name = segments.join(".");
    name.push_str(field);
    name
}
