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

//! Outstanding multi-resource requests and the scan that decides when they fire.

use crate::engine::ResourceEngine;
use crate::graph::ResourceGraph;
use rhizome_core::resource::{Export, ResourceId, ResourceStatus};
use rhizome_core::{ResourceError, ResourceResult};
use std::fmt;

/// What a request callback receives: one export per requested identifier, in
/// request order, or the first failure observed.
pub type RequestResult = Result<Vec<Export>, ResourceError>;

pub(crate) type RequestCallback =
    Box<dyn FnOnce(&mut ResourceEngine, RequestResult) -> ResourceResult<()>>;

/// Identifies a registered request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ResourceRequest {
    id: RequestId,
    node_ids: Vec<ResourceId>,
    callback: RequestCallback,
}

/// A request that left the tracker and whose callback is ready to run.
pub(crate) struct SatisfiedRequest {
    pub id: RequestId,
    pub result: RequestResult,
    pub callback: RequestCallback,
}

/// Holds every request whose callback has not fired yet.
#[derive(Default)]
pub struct RequestTracker {
    next_id: u64,
    outstanding: Vec<ResourceRequest>,
    deferred: Vec<ResourceRequest>,
}

impl RequestTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a request and checks it once against the graph.
    ///
    /// A request over no identifier is deferred until [`RequestTracker::take_deferred`]
    /// and never looks at the graph. Otherwise, if every node is already terminal (or
    /// one has failed), the request comes straight back as satisfied.
    pub(crate) fn register(
        &mut self,
        node_ids: Vec<ResourceId>,
        callback: RequestCallback,
        graph: &ResourceGraph,
    ) -> (RequestId, Option<SatisfiedRequest>) {
        self.next_id += 1;
        let request = ResourceRequest {
            id: RequestId(self.next_id),
            node_ids,
            callback,
        };
        let id = request.id;

        if request.node_ids.is_empty() {
            log::debug!("Request {id} is empty; deferring it to the next pump.");
            self.deferred.push(request);
            return (id, None);
        }

        log::debug!(
            "Request {id} registered over {} resource(s).",
            request.node_ids.len()
        );
        match evaluate(&request, graph) {
            Some(result) => (id, Some(satisfy(request, result))),
            None => {
                self.outstanding.push(request);
                (id, None)
            }
        }
    }

    /// Removes and returns every outstanding request that can fire.
    ///
    /// Removal swaps the last request into the vacated slot, so the same index is
    /// examined again before moving on.
    pub(crate) fn collect_satisfied(&mut self, graph: &ResourceGraph) -> Vec<SatisfiedRequest> {
        let mut satisfied = Vec::new();
        let mut index = 0;
        while index < self.outstanding.len() {
            match evaluate(&self.outstanding[index], graph) {
                Some(result) => {
                    let request = self.outstanding.swap_remove(index);
                    satisfied.push(satisfy(request, result));
                }
                None => index += 1,
            }
        }
        satisfied
    }

    /// Drains the deferred empty requests, each satisfied with no export.
    pub(crate) fn take_deferred(&mut self) -> Vec<SatisfiedRequest> {
        std::mem::take(&mut self.deferred)
            .into_iter()
            .map(|request| satisfy(request, Ok(Vec::new())))
            .collect()
    }

    /// Number of requests waiting on the graph.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Number of empty requests waiting for the next pump.
    pub fn deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Identifiers still awaited by the given request, if it is outstanding.
    pub fn waiting_on<'g>(
        &self,
        id: RequestId,
        graph: &'g ResourceGraph,
    ) -> Option<Vec<&'g ResourceId>> {
        let request = self.outstanding.iter().find(|r| r.id == id)?;
        Some(
            request
                .node_ids
                .iter()
                .filter_map(|node_id| graph.get(node_id.as_str()))
                .filter(|node| !node.status().is_terminal())
                .map(|node| node.id())
                .collect(),
        )
    }
}

impl fmt::Debug for RequestTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTracker")
            .field("outstanding", &self.outstanding.len())
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

fn satisfy(request: ResourceRequest, result: RequestResult) -> SatisfiedRequest {
    SatisfiedRequest {
        id: request.id,
        result,
        callback: request.callback,
    }
}

/// `None` while the request must keep waiting.
fn evaluate(request: &ResourceRequest, graph: &ResourceGraph) -> Option<RequestResult> {
    let mut exports = Vec::with_capacity(request.node_ids.len());
    let mut waiting = false;

    for node_id in &request.node_ids {
        let Some(node) = graph.get(node_id.as_str()) else {
            return Some(Err(ResourceError::UnknownResource {
                id: node_id.to_string(),
            }));
        };
        match node.status() {
            ResourceStatus::Failed => {
                return Some(Err(ResourceError::LoaderFailure {
                    id: node_id.to_string(),
                    reason: node.failure_reason().unwrap_or_default().to_string(),
                }));
            }
            ResourceStatus::Ready => {
                if let Some(export) = node.export() {
                    exports.push(export.clone());
                }
            }
            ResourceStatus::Pending | ResourceStatus::Loading => waiting = true,
        }
    }

    (!waiting).then_some(Ok(exports))
}
