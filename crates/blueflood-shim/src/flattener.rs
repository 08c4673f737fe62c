// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use observations::Observation;

use crate::metric::{metric_name, MetricPoint};

/// Turns observations into metric points.
#[derive(Debug, Clone, Copy)]
pub struct Flattener {
    ttl_in_seconds: u32,
}

impl Flattener {
    pub fn new(ttl_in_seconds: u32) -> Self {
        Self { ttl_in_seconds }
    }

    /// Emits one point per numeric metric of `obs`, in the observation's
    /// metric order. Non-numeric values are skipped silently.
    pub fn flatten(&self, obs: &Observation) -> Vec<MetricPoint> {
        obs.metrics
            .iter()
            .filter_map(|(field, metric)| {
                let value = metric.value.as_f64()?;
                Some(MetricPoint {
                    tenant_id: obs.tenant_id.clone(),
                    collection_time: obs.timestamp,
                    ttl_in_seconds: self.ttl_in_seconds,
                    metric_value: value,
                    metric_name: metric_name(field, obs),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use observations::{MetricValue, Metrics, ObservationMetric};
    use proptest::prelude::*;

    fn metric(value: MetricValue) -> ObservationMetric {
        ObservationMetric {
            kind: "n".to_string(),
            value,
            unit: "unknown".to_string(),
        }
    }

    fn observation(metrics: Metrics) -> Observation {
        Observation {
            entity_id: "e1".to_string(),
            check_id: "c1".to_string(),
            monitoring_zone_id: Some("z1".to_string()),
            tenant_id: Some("t1".to_string()),
            timestamp: 1000,
            metrics,
            ..Default::default()
        }
    }

    #[test]
    fn test_flatten_copies_identity_and_ttl() {
        let obs = observation(
            [
                ("cpu", metric(MetricValue::Number(42.5))),
                ("mem", metric(MetricValue::Number(7.0))),
            ]
            .into_iter()
            .collect(),
        );
        let points = Flattener::new(60).flatten(&obs);

        assert_eq!(
            points,
            vec![
                MetricPoint {
                    tenant_id: Some("t1".to_string()),
                    collection_time: 1000,
                    ttl_in_seconds: 60,
                    metric_value: 42.5,
                    metric_name: "rackspace.monitoring.entities.e1.checks.c1.z1cpu".to_string(),
                },
                MetricPoint {
                    tenant_id: Some("t1".to_string()),
                    collection_time: 1000,
                    ttl_in_seconds: 60,
                    metric_value: 7.0,
                    metric_name: "rackspace.monitoring.entities.e1.checks.c1.z1mem".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_flatten_drops_non_numeric() {
        let obs = observation(
            [
                ("cpu", metric(MetricValue::Number(1.0))),
                ("flag", metric(MetricValue::Other)),
            ]
            .into_iter()
            .collect(),
        );
        let points = Flattener::new(60).flatten(&obs);
        assert_eq!(points.len(), 1);
        assert!(points[0].metric_name.ends_with("cpu"));
    }

    #[test]
    fn test_flatten_empty_metrics() {
        let obs = observation(Metrics::new());
        assert!(Flattener::new(60).flatten(&obs).is_empty());
    }

    #[test]
    fn test_flatten_preserves_missing_tenant() {
        let mut obs = observation(
            [("cpu", metric(MetricValue::Number(1.0)))]
                .into_iter()
                .collect(),
        );
        obs.tenant_id = None;
        let points = Flattener::new(60).flatten(&obs);
        assert_eq!(points[0].tenant_id, None);
    }

    proptest! {
        #[test]
        fn only_non_numeric_values_yield_nothing(names in proptest::collection::vec("[a-z]{1,8}", 0..20)) {
            let obs = observation(
                names
                    .into_iter()
                    .map(|name| (name, metric(MetricValue::Other)))
                    .collect(),
            );
            prop_assert!(Flattener::new(60).flatten(&obs).is_empty());
        }

        #[test]
        fn one_point_per_numeric_value(values in proptest::collection::vec(proptest::option::of(-1.0e6f64..1.0e6), 0..20)) {
            let numeric = values.iter().filter(|v| v.is_some()).count();
            let obs = observation(
                values
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let value = v.map_or(MetricValue::Other, MetricValue::Number);
                        (format!("m{i}"), metric(value))
                    })
                    .collect(),
            );
            prop_assert_eq!(Flattener::new(60).flatten(&obs).len(), numeric);
        }
    }
}
