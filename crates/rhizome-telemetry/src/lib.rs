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

//! # Rhizome Telemetry
//!
//! An in-memory metrics registry shared by the resource engine and the loader
//! lanes, plus an RAII timer that records scope durations into histograms.

#![warn(missing_docs)]

pub mod metrics;
pub mod timer;

pub use metrics::{
    CounterHandle, GaugeHandle, HistogramHandle, Metric, MetricId, MetricValue, MetricsError,
    MetricsRegistry, MetricsResult,
};
pub use timer::ScopedMetricTimer;
