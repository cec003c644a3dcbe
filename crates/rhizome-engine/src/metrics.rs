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

//! Engine counters, published under the `resources` namespace.

use rhizome_telemetry::{CounterHandle, GaugeHandle, MetricsRegistry};

const NAMESPACE: &str = "resources";

/// Handles into a [`MetricsRegistry`]. A handle that failed to register is
/// skipped rather than failing engine construction.
#[derive(Debug, Default)]
pub(crate) struct EngineMetrics {
    nodes_created: Option<CounterHandle>,
    nodes_ready: Option<CounterHandle>,
    nodes_failed: Option<CounterHandle>,
    requests_registered: Option<CounterHandle>,
    requests_fired: Option<CounterHandle>,
    cycles_detected: Option<CounterHandle>,
    outstanding_requests: Option<GaugeHandle>,
}

impl EngineMetrics {
    pub(crate) fn register(registry: &MetricsRegistry) -> Self {
        Self {
            nodes_created: counter(registry, "nodes_created", "Resource nodes added to the graph"),
            nodes_ready: counter(registry, "nodes_ready", "Resource nodes that became ready"),
            nodes_failed: counter(registry, "nodes_failed", "Resource nodes that failed"),
            requests_registered: counter(
                registry,
                "requests_registered",
                "Resource requests registered",
            ),
            requests_fired: counter(registry, "requests_fired", "Request callbacks invoked"),
            cycles_detected: counter(
                registry,
                "cycles_detected",
                "Cycle detection passes that found a cycle",
            ),
            outstanding_requests: match registry.register_gauge(
                NAMESPACE,
                "outstanding_requests",
                "Requests waiting on the graph",
                "count",
            ) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::warn!("Failed to register engine gauge 'outstanding_requests': {e}");
                    None
                }
            },
        }
    }

    pub(crate) fn node_created(&self) {
        bump(&self.nodes_created);
    }

    pub(crate) fn node_ready(&self) {
        bump(&self.nodes_ready);
    }

    pub(crate) fn node_failed(&self) {
        bump(&self.nodes_failed);
    }

    pub(crate) fn request_registered(&self) {
        bump(&self.requests_registered);
    }

    pub(crate) fn request_fired(&self) {
        bump(&self.requests_fired);
    }

    pub(crate) fn cycle_detected(&self) {
        bump(&self.cycles_detected);
    }

    pub(crate) fn set_outstanding(&self, count: usize) {
        if let Some(gauge) = &self.outstanding_requests {
            if let Err(e) = gauge.set(count as f64) {
                log::warn!("Failed to update '{}': {e}", gauge.id());
            }
        }
    }
}

fn counter(registry: &MetricsRegistry, name: &str, description: &str) -> Option<CounterHandle> {
    match registry.register_counter(NAMESPACE, name, description) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Failed to register engine counter '{name}': {e}");
            None
        }
    }
}

fn bump(handle: &Option<CounterHandle>) {
    if let Some(counter) = handle {
        if let Err(e) = counter.increment() {
            log::warn!("Failed to increment '{}': {e}", counter.id());
        }
    }
}

/// A point-in-time summary of the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Nodes in the graph.
    pub nodes: usize,
    /// Nodes still loading.
    pub loading: usize,
    /// Nodes that became ready.
    pub ready: usize,
    /// Nodes that failed.
    pub failed: usize,
    /// Dependency edges recorded by module definitions.
    pub edges: usize,
    /// Requests waiting on the graph.
    pub outstanding_requests: usize,
}
