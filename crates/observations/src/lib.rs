// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Observation records emitted by the monitoring agent.
//!
//! One observation describes every measurement a single check produced at one
//! point in time. The shape is owned by the agent; this crate only mirrors it
//! closely enough to deserialize one JSON document per line.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// A JSON `null` in any field reads as that field's zero value, the same as
/// when the key is missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub account_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub check_id: String,
    #[serde(default)]
    pub check_type: Option<String>,
    #[serde(default)]
    pub collector_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub collector_keys: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity_id: String,
    #[serde(default)]
    pub monitoring_zone_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub period: i32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Collection time in epoch milliseconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
    #[serde(default)]
    pub metrics: Metrics,
}

impl Observation {
    /// Parses a single JSON document.
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ObservationMetric {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub value: MetricValue,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
}

/// The dynamically typed `value` of an [`ObservationMetric`].
///
/// Any JSON number becomes [`MetricValue::Number`], widened to `f64`.
/// Strings, booleans, nulls, arrays and objects all collapse into
/// [`MetricValue::Other`]; the shim never forwards them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MetricValue {
    Number(f64),
    #[default]
    Other,
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Other => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value.as_f64() {
            Some(n) => MetricValue::Number(n),
            None => MetricValue::Other,
        })
    }
}

/// Named metrics of an observation, kept in document order.
///
/// A repeated name replaces the earlier entry in place, matching how a JSON
/// object with duplicate keys is usually read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics(Vec<(String, ObservationMetric)>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, metric: ObservationMetric) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = metric,
            None => self.0.push((name, metric)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ObservationMetric> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, metric)| metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObservationMetric)> {
        self.0.iter().map(|(name, metric)| (name.as_str(), metric))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ObservationMetric)> for Metrics {
    fn from_iter<T: IntoIterator<Item = (K, ObservationMetric)>>(iter: T) -> Self {
        let mut metrics = Metrics::new();
        for (name, metric) in iter {
            metrics.insert(name, metric);
        }
        metrics
    }
}

struct MetricsVisitor;

impl<'de> Visitor<'de> for MetricsVisitor {
    type Value = Metrics;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of metric name to metric")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Metrics::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Metrics::new())
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MetricsVisitor)
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut metrics = Metrics(Vec::with_capacity(access.size_hint().unwrap_or(0)));
        while let Some((name, metric)) = access.next_entry::<String, ObservationMetric>()? {
            metrics.insert(name, metric);
        }
        Ok(metrics)
    }
}

impl<'de> Deserialize<'de> for Metrics {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(MetricsVisitor)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
