// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Metric definitions and the registry that stores them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// A structured identifier for a metric: a namespace plus a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId {
    /// The broad category of the metric (e.g., "resources", "loaders").
    pub namespace: String,
    /// The specific name of the metric (e.g., "nodes_ready").
    pub name: String,
}

impl MetricId {
    /// Creates a new `MetricId`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// The current value of a metric.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A monotonically increasing count.
    Counter(u64),
    /// A value that can go up or down.
    Gauge(f64),
    /// Recorded samples distributed over fixed bucket bounds.
    Histogram {
        /// Every sample recorded so far.
        samples: Vec<f64>,
        /// Inclusive upper bounds of the buckets.
        bucket_bounds: Vec<f64>,
        /// Number of samples per bucket; samples above the last bound are not bucketed.
        bucket_counts: Vec<u64>,
    },
}

impl MetricValue {
    fn kind_name(&self) -> &'static str {
        match self {
            MetricValue::Counter(_) => "counter",
            MetricValue::Gauge(_) => "gauge",
            MetricValue::Histogram { .. } => "histogram",
        }
    }
}

/// A registered metric with its description.
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric identifier.
    pub id: MetricId,
    /// A human-readable description.
    pub description: String,
    /// The unit of measurement ("count", "ms", ...).
    pub unit: String,
    /// The current value.
    pub value: MetricValue,
}

/// A specialized `Result` type for metric operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// An error raised by the metrics registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    /// The metric is not registered.
    #[error("Metric not found: {0}")]
    MetricNotFound(MetricId),
    /// The operation does not apply to the metric's type.
    #[error("Type mismatch on {id}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The metric the operation targeted.
        id: MetricId,
        /// The type the operation expects.
        expected: &'static str,
        /// The type actually registered.
        found: &'static str,
    },
    /// The storage lock was poisoned by a panicking writer.
    #[error("Metrics storage is unavailable")]
    StoragePoisoned,
}

type Storage = RwLock<HashMap<MetricId, Metric>>;

/// Central, thread-safe registry of metrics.
///
/// Registration returns a typed handle; handles are cheap to clone and share the
/// registry's storage.
#[derive(Debug, Clone, Default)]
pub struct MetricsRegistry {
    storage: Arc<Storage>,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a counter starting at zero. Re-registering an id resets it.
    pub fn register_counter(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> MetricsResult<CounterHandle> {
        let id = self.put(namespace, name, description, "count", MetricValue::Counter(0))?;
        Ok(CounterHandle {
            id,
            storage: self.storage.clone(),
        })
    }

    /// Registers a gauge starting at zero.
    pub fn register_gauge(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> MetricsResult<GaugeHandle> {
        let id = self.put(namespace, name, description, unit, MetricValue::Gauge(0.0))?;
        Ok(GaugeHandle {
            id,
            storage: self.storage.clone(),
        })
    }

    /// Registers a histogram over the given bucket bounds.
    pub fn register_histogram(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        bucket_bounds: Vec<f64>,
    ) -> MetricsResult<HistogramHandle> {
        let bucket_counts = vec![0; bucket_bounds.len()];
        let value = MetricValue::Histogram {
            samples: Vec::new(),
            bucket_bounds,
            bucket_counts,
        };
        let id = self.put(namespace, name, description, unit, value)?;
        Ok(HistogramHandle {
            id,
            storage: self.storage.clone(),
        })
    }

    /// Returns a snapshot of a metric.
    pub fn get_metric(&self, id: &MetricId) -> MetricsResult<Metric> {
        let storage = self
            .storage
            .read()
            .map_err(|_| MetricsError::StoragePoisoned)?;
        storage
            .get(id)
            .cloned()
            .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))
    }

    /// Returns snapshots of every metric in a namespace.
    pub fn namespace_metrics(&self, namespace: &str) -> Vec<Metric> {
        match self.storage.read() {
            Ok(storage) => storage
                .values()
                .filter(|m| m.id.namespace == namespace)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of registered metrics.
    pub fn metric_count(&self) -> usize {
        self.storage.read().map(|s| s.len()).unwrap_or(0)
    }

    fn put(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        value: MetricValue,
    ) -> MetricsResult<MetricId> {
        let id = MetricId::new(namespace, name);
        let metric = Metric {
            id: id.clone(),
            description: description.into(),
            unit: unit.into(),
            value,
        };
        let mut storage = self
            .storage
            .write()
            .map_err(|_| MetricsError::StoragePoisoned)?;
        storage.insert(id.clone(), metric);
        Ok(id)
    }
}

fn update<R>(
    storage: &Storage,
    id: &MetricId,
    apply: impl FnOnce(&mut MetricValue) -> Option<R>,
    expected: &'static str,
) -> MetricsResult<R> {
    let mut storage = storage.write().map_err(|_| MetricsError::StoragePoisoned)?;
    let metric = storage
        .get_mut(id)
        .ok_or_else(|| MetricsError::MetricNotFound(id.clone()))?;
    let found = metric.value.kind_name();
    apply(&mut metric.value).ok_or_else(|| MetricsError::TypeMismatch {
        id: id.clone(),
        expected,
        found,
    })
}

/// Handle for counter operations.
#[derive(Debug, Clone)]
pub struct CounterHandle {
    id: MetricId,
    storage: Arc<Storage>,
}

impl CounterHandle {
    /// Increments the counter by one and returns the new value.
    pub fn increment(&self) -> MetricsResult<u64> {
        self.increment_by(1)
    }

    /// Increments the counter by `amount` and returns the new value.
    pub fn increment_by(&self, amount: u64) -> MetricsResult<u64> {
        update(
            &self.storage,
            &self.id,
            |value| match value {
                MetricValue::Counter(count) => {
                    *count = count.saturating_add(amount);
                    Some(*count)
                }
                _ => None,
            },
            "counter",
        )
    }

    /// Returns the current value.
    pub fn get(&self) -> MetricsResult<u64> {
        update(
            &self.storage,
            &self.id,
            |value| match value {
                MetricValue::Counter(count) => Some(*count),
                _ => None,
            },
            "counter",
        )
    }

    /// The metric identifier.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle for gauge operations.
#[derive(Debug, Clone)]
pub struct GaugeHandle {
    id: MetricId,
    storage: Arc<Storage>,
}

impl GaugeHandle {
    /// Sets the gauge.
    pub fn set(&self, new_value: f64) -> MetricsResult<()> {
        update(
            &self.storage,
            &self.id,
            |value| match value {
                MetricValue::Gauge(current) => {
                    *current = new_value;
                    Some(())
                }
                _ => None,
            },
            "gauge",
        )
    }

    /// Returns the current value.
    pub fn get(&self) -> MetricsResult<f64> {
        update(
            &self.storage,
            &self.id,
            |value| match value {
                MetricValue::Gauge(current) => Some(*current),
                _ => None,
            },
            "gauge",
        )
    }

    /// The metric identifier.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

/// Handle for histogram operations.
#[derive(Debug, Clone)]
pub struct HistogramHandle {
    id: MetricId,
    storage: Arc<Storage>,
}

impl HistogramHandle {
    /// Records one sample.
    pub fn observe(&self, sample: f64) -> MetricsResult<()> {
        update(
            &self.storage,
            &self.id,
            |value| match value {
                MetricValue::Histogram {
                    samples,
                    bucket_bounds,
                    bucket_counts,
                } => {
                    samples.push(sample);
                    if let Some(bucket) = bucket_bounds.iter().position(|bound| sample <= *bound) {
                        bucket_counts[bucket] += 1;
                    }
                    Some(())
                }
                _ => None,
            },
            "histogram",
        )
    }

    /// Number of samples recorded so far.
    pub fn sample_count(&self) -> MetricsResult<usize> {
        update(
            &self.storage,
            &self.id,
            |value| match value {
                MetricValue::Histogram { samples, .. } => Some(samples.len()),
                _ => None,
            },
            "histogram",
        )
    }

    /// The metric identifier.
    pub fn id(&self) -> &MetricId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_registration_and_operations() {
        let registry = MetricsRegistry::new();
        let counter = registry
            .register_counter("resources", "nodes_created", "Nodes created")
            .unwrap();

        assert_eq!(counter.increment().unwrap(), 1);
        assert_eq!(counter.increment_by(5).unwrap(), 6);
        assert_eq!(counter.get().unwrap(), 6);
        assert_eq!(registry.metric_count(), 1);
    }

    #[test]
    fn gauge_operations() {
        let registry = MetricsRegistry::new();
        let gauge = registry
            .register_gauge("resources", "outstanding_requests", "Open requests", "count")
            .unwrap();

        gauge.set(3.0).unwrap();
        assert_eq!(gauge.get().unwrap(), 3.0);
    }

    #[test]
    fn histogram_buckets_samples() {
        let registry = MetricsRegistry::new();
        let histogram = registry
            .register_histogram("loaders", "decode_time", "Decode time", "ms", vec![1.0, 10.0])
            .unwrap();

        histogram.observe(0.5).unwrap();
        histogram.observe(5.0).unwrap();
        histogram.observe(50.0).unwrap();
        assert_eq!(histogram.sample_count().unwrap(), 3);

        let metric = registry.get_metric(histogram.id()).unwrap();
        match metric.value {
            MetricValue::Histogram { bucket_counts, .. } => assert_eq!(bucket_counts, vec![1, 1]),
            other => panic!("Expected histogram, got {other:?}"),
        }
    }

    #[test]
    fn namespace_filtering() {
        let registry = MetricsRegistry::new();
        registry.register_counter("resources", "a", "A").unwrap();
        registry.register_counter("resources", "b", "B").unwrap();
        registry.register_counter("loaders", "c", "C").unwrap();

        assert_eq!(registry.namespace_metrics("resources").len(), 2);
        assert_eq!(registry.namespace_metrics("loaders").len(), 1);
    }

    #[test]
    fn unknown_metric_is_reported() {
        let registry = MetricsRegistry::new();
        let id = MetricId::new("resources", "missing");
        assert_eq!(
            registry.get_metric(&id).unwrap_err(),
            MetricsError::MetricNotFound(id)
        );
    }
}
