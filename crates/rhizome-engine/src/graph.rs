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

//! The arena of resource nodes, keyed by canonical identifier.

use crate::loader::{Completer, Completion, Loader};
use rhizome_core::graph::{reduce_dependencies, CycleError, DependencyEntry};
use rhizome_core::resource::{Export, ResourceId, ResourceKind, ResourceStatus};
use rhizome_core::{ResourceError, ResourceResult};
use std::collections::hash_map::{Entry, HashMap};

/// Where a module node stands in the definition handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefinitionState {
    /// No payload has been delivered.
    NotStarted,
    /// The payload was delivered while the definition slot was held and waits for it.
    Parked,
    /// The payload is executing and holds the definition slot.
    Executing,
    /// The payload defined its dependencies and factory.
    Defined,
}

/// The engine's record of one resource.
///
/// Nodes are created once and never removed. They reference each other only
/// through canonical identifiers.
#[derive(Debug)]
pub struct ResourceNode {
    id: ResourceId,
    kind: ResourceKind,
    status: ResourceStatus,
    history: Vec<ResourceStatus>,
    export: Option<Export>,
    dependency_ids: Vec<ResourceId>,
    dependent_count: usize,
    failure_reason: Option<String>,
    pub(crate) definition: DefinitionState,
}

impl ResourceNode {
    fn new(id: ResourceId, kind: ResourceKind) -> Self {
        Self {
            id,
            kind,
            status: ResourceStatus::Pending,
            history: vec![ResourceStatus::Pending],
            export: None,
            dependency_ids: Vec::new(),
            dependent_count: 0,
            failure_reason: None,
            definition: DefinitionState::NotStarted,
        }
    }

    /// The canonical identifier.
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// The kind derived from the identifier's extension.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The current lifecycle state.
    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    /// Every status the node has held, oldest first.
    pub fn status_history(&self) -> &[ResourceStatus] {
        &self.history
    }

    /// The export, set once on the `Ready` transition.
    pub fn export(&self) -> Option<&Export> {
        self.export.as_ref()
    }

    /// The identifiers this node depends on, in definition order.
    pub fn dependency_ids(&self) -> &[ResourceId] {
        &self.dependency_ids
    }

    /// How many graph edges name this node as a dependency.
    pub fn dependent_count(&self) -> usize {
        self.dependent_count
    }

    /// Why the node failed, when it did.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// A freshly created node is handed to the loader in `Loading`.
    fn start_loading(&mut self) {
        debug_assert_eq!(self.status, ResourceStatus::Pending);
        log::trace!("Resource '{}': {} -> {}", self.id, self.status, ResourceStatus::Loading);
        self.status = ResourceStatus::Loading;
        self.history.push(ResourceStatus::Loading);
    }

    /// The only reachable illegal transition is one out of a terminal state.
    fn advance(&mut self, next: ResourceStatus) -> ResourceResult<()> {
        if !self.status.can_advance_to(next) {
            return Err(ResourceError::DoubleCompletion {
                id: self.id.to_string(),
            });
        }
        log::trace!("Resource '{}': {} -> {}", self.id, self.status, next);
        self.status = next;
        self.history.push(next);
        Ok(())
    }
}

/// Owns every [`ResourceNode`] and the loader that feeds them.
pub struct ResourceGraph {
    nodes: HashMap<ResourceId, ResourceNode>,
    loader: Box<dyn Loader>,
    completions: flume::Sender<Completion>,
    edge_count: usize,
}

impl ResourceGraph {
    pub(crate) fn new(loader: Box<dyn Loader>, completions: flume::Sender<Completion>) -> Self {
        Self {
            nodes: HashMap::new(),
            loader,
            completions,
            edge_count: 0,
        }
    }

    /// Returns the node for `id`, creating it and invoking the loader on first reference.
    ///
    /// The boolean is `true` when the node was created by this call. A new node is
    /// created `Pending`, moved to `Loading`, and only then handed to the loader.
    pub fn ensure_node(&mut self, id: &ResourceId, kind: ResourceKind) -> (&ResourceNode, bool) {
        match self.nodes.entry(id.clone()) {
            Entry::Occupied(entry) => (&*entry.into_mut(), false),
            Entry::Vacant(entry) => {
                let mut node = ResourceNode::new(id.clone(), kind);
                node.start_loading();
                let node = entry.insert(node);
                self.loader.load(
                    kind,
                    id,
                    Completer::new(id.clone(), self.completions.clone()),
                );
                (&*node, true)
            }
        }
    }

    /// Looks a node up by canonical identifier.
    pub fn get(&self, id: &str) -> Option<&ResourceNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut ResourceNode> {
        self.nodes.get_mut(id)
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no node yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Iterates over every node, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values()
    }

    /// Moves a node to its terminal state. First settlement wins.
    pub(crate) fn settle(
        &mut self,
        id: &str,
        result: Result<Export, String>,
    ) -> ResourceResult<ResourceStatus> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ResourceError::UnknownResource { id: id.to_string() })?;
        match result {
            Ok(export) => {
                node.advance(ResourceStatus::Ready)?;
                node.export = Some(export);
            }
            Err(reason) => {
                node.advance(ResourceStatus::Failed)?;
                node.failure_reason = Some(reason);
            }
        }
        Ok(node.status)
    }

    /// Records the late-bound dependency list of a module and counts the new edges.
    ///
    /// Every dependency must already be in the graph.
    pub(crate) fn record_definition(
        &mut self,
        id: &str,
        dependency_ids: Vec<ResourceId>,
    ) -> ResourceResult<()> {
        if let Some(missing) = dependency_ids.iter().find(|d| !self.nodes.contains_key(*d)) {
            return Err(ResourceError::UnknownResource {
                id: missing.to_string(),
            });
        }
        if !self.nodes.contains_key(id) {
            return Err(ResourceError::UnknownResource { id: id.to_string() });
        }

        for dependency in &dependency_ids {
            if let Some(node) = self.nodes.get_mut(dependency.as_str()) {
                node.dependent_count += 1;
            }
        }
        self.edge_count += dependency_ids.len();

        if let Some(node) = self.nodes.get_mut(id) {
            node.dependency_ids = dependency_ids;
            node.definition = DefinitionState::Defined;
        }
        Ok(())
    }

    /// Runs the cycle detector over the current graph.
    ///
    /// On success, returns the identifiers in reduction order (dependents first).
    pub fn check_cycles(&self) -> Result<Vec<&ResourceId>, CycleError> {
        reduce_dependencies(self.nodes.values().map(|node| DependencyEntry {
            id: &node.id,
            dependent_count: node.dependent_count,
            dependencies: node.dependency_ids.as_slice(),
        }))
    }
}

impl std::fmt::Debug for ResourceGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGraph")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edge_count)
            .finish()
    }
}
