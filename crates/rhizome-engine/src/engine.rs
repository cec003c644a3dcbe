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

//! The engine facade tying the graph, the tracker and the handshake together.

use crate::graph::{DefinitionState, ResourceGraph, ResourceNode};
use crate::handshake::{DefinitionHandshake, DefinitionToken};
use crate::loader::{Completion, Loader, ModulePayload, Outcome};
use crate::metrics::{EngineMetrics, EngineStats};
use crate::tracker::{RequestCallback, RequestId, RequestResult, RequestTracker, SatisfiedRequest};
use rhizome_core::resource::{resolve, Export, ResolvedId, ResourceId, ResourceStatus};
use rhizome_core::{EngineConfig, ResourceError, ResourceResult};
use rhizome_telemetry::MetricsRegistry;
use std::collections::VecDeque;
use std::fmt;

/// The function a module hands to `define`: it receives its dependencies' exports,
/// in declaration order, and returns the module's own export.
pub type ModuleFactory = Box<dyn FnOnce(Vec<Export>) -> anyhow::Result<Export>>;

/// Tracks a growing graph of resources and notifies requests when their resources
/// settle.
///
/// The engine is single-threaded: every mutation goes through `&mut self`, and the
/// completions reported by the [`Loader`] are applied by [`ResourceEngine::pump`].
/// Request callbacks and module payloads receive the engine itself, so they may
/// import more resources while they run.
pub struct ResourceEngine {
    config: EngineConfig,
    graph: ResourceGraph,
    tracker: RequestTracker,
    handshake: DefinitionHandshake,
    completions: flume::Receiver<Completion>,
    /// Module payloads delivered while the definition slot was held.
    parked_modules: VecDeque<(ResourceId, ModulePayload)>,
    diagnostics: Vec<ResourceError>,
    /// Unconsumed edge count of the last recorded cycle, cleared once the graph reduces again.
    last_cycle: Option<usize>,
    metrics: EngineMetrics,
}

impl ResourceEngine {
    /// Creates an engine that asks `loader` for every new resource.
    pub fn new(config: EngineConfig, loader: impl Loader + 'static) -> Self {
        Self::build(config, Box::new(loader), EngineMetrics::default())
    }

    /// Creates an engine that also publishes its counters in `registry`.
    pub fn with_metrics(
        config: EngineConfig,
        loader: impl Loader + 'static,
        registry: &MetricsRegistry,
    ) -> Self {
        Self::build(config, Box::new(loader), EngineMetrics::register(registry))
    }

    fn build(config: EngineConfig, loader: Box<dyn Loader>, metrics: EngineMetrics) -> Self {
        let (sender, receiver) = flume::unbounded();
        log::info!(
            "Resource engine created (cyclic_check: {}, module_inspection: {}).",
            config.cyclic_check,
            config.module_inspection
        );
        Self {
            config,
            graph: ResourceGraph::new(loader, sender),
            tracker: RequestTracker::new(),
            handshake: DefinitionHandshake::new(),
            completions: receiver,
            parked_modules: VecDeque::new(),
            diagnostics: Vec::new(),
            last_cycle: None,
            metrics,
        }
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the resource graph.
    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// Looks a node up by canonical identifier.
    pub fn node(&self, id: &str) -> Option<&ResourceNode> {
        self.graph.get(id)
    }

    /// Resolves a raw specifier against an optional base identifier.
    pub fn resolve(&self, base: Option<&str>, raw: &str) -> ResourceResult<ResolvedId> {
        resolve(base, raw)
    }

    /// Returns the node for `resolved`, creating it and starting its load if needed.
    pub fn ensure_node(&mut self, resolved: &ResolvedId) -> &ResourceNode {
        let (node, created) = self.graph.ensure_node(resolved.id(), resolved.kind());
        if created {
            self.metrics.node_created();
        }
        node
    }

    /// Requests every resource in `specifiers`, resolved against `base`.
    ///
    /// `callback` runs exactly once: with one export per specifier, in order, once
    /// every resource is ready, or with the first failure observed. An empty list
    /// fires on the next [`ResourceEngine::pump`].
    ///
    /// # Errors
    /// Resolution errors are returned before the graph is touched.
    pub fn import_resources<S, F>(
        &mut self,
        base: Option<&str>,
        specifiers: &[S],
        callback: F,
    ) -> ResourceResult<RequestId>
    where
        S: AsRef<str>,
        F: FnOnce(&mut ResourceEngine, RequestResult) + 'static,
    {
        let resolved = specifiers
            .iter()
            .map(|specifier| resolve(base, specifier.as_ref()))
            .collect::<ResourceResult<Vec<_>>>()?;

        let node_ids = self.ensure_all(&resolved);
        self.register(
            node_ids,
            Box::new(move |engine: &mut ResourceEngine, result: RequestResult| {
                callback(engine, result);
                Ok(())
            }),
        )
    }

    /// Occupies the definition slot on behalf of the module `id`.
    ///
    /// The engine calls this itself before executing a module payload; collaborators
    /// that execute modules outside the engine call it directly.
    pub fn begin_definition(&mut self, id: &str) -> ResourceResult<DefinitionToken> {
        let node = self
            .graph
            .get(id)
            .ok_or_else(|| ResourceError::UnknownResource { id: id.to_string() })?;
        if !node.kind().is_module() {
            return Err(ResourceError::NotAModule { id: id.to_string() });
        }
        if node.status().is_terminal() || node.definition != DefinitionState::NotStarted {
            return Err(ResourceError::DoubleCompletion { id: id.to_string() });
        }

        let token = self.handshake.begin(node.id().clone())?;
        if let Some(node) = self.graph.get_mut(id) {
            node.definition = DefinitionState::Executing;
        }
        Ok(token)
    }

    /// Defines the module owning `token`: its dependencies, resolved against the
    /// module's own identifier, and the factory producing its export once they are
    /// all ready.
    ///
    /// Returns the dependency request. The module settles from that request's
    /// callback.
    pub fn define<S, F>(
        &mut self,
        token: DefinitionToken,
        specifiers: &[S],
        factory: F,
    ) -> ResourceResult<RequestId>
    where
        S: AsRef<str>,
        F: FnOnce(Vec<Export>) -> anyhow::Result<Export> + 'static,
    {
        let module = self.handshake.consume(token)?;
        self.define_node(module, specifiers, Box::new(factory))
    }

    /// Defines whichever module currently holds the definition slot.
    pub fn define_module<S, F>(&mut self, specifiers: &[S], factory: F) -> ResourceResult<RequestId>
    where
        S: AsRef<str>,
        F: FnOnce(Vec<Export>) -> anyhow::Result<Export> + 'static,
    {
        let module = self.handshake.consume_current()?;
        self.define_node(module, specifiers, Box::new(factory))
    }

    fn define_node<S: AsRef<str>>(
        &mut self,
        module: ResourceId,
        specifiers: &[S],
        factory: ModuleFactory,
    ) -> ResourceResult<RequestId> {
        let resolved = match specifiers
            .iter()
            .map(|specifier| resolve(Some(module.as_str()), specifier.as_ref()))
            .collect::<ResourceResult<Vec<_>>>()
        {
            Ok(resolved) => resolved,
            Err(e) => {
                self.settle_if_pending(module.as_str(), Err(e.to_string()))?;
                return Err(e);
            }
        };

        let dependency_ids = self.ensure_all(&resolved);
        self.graph
            .record_definition(module.as_str(), dependency_ids.clone())?;
        log::debug!(
            "Module '{module}' defined with {} dependencies.",
            dependency_ids.len()
        );
        if self.config.cyclic_check {
            self.run_cycle_check();
        }

        self.register(
            dependency_ids,
            Box::new(move |engine: &mut ResourceEngine, result: RequestResult| {
                let outcome = match result {
                    Ok(exports) => factory(exports).map_err(|e| format!("{e:#}")),
                    Err(e) => Err(format!("dependency failed: {e}")),
                };
                engine.settle_if_pending(module.as_str(), outcome)
            }),
        )
    }

    /// Applies a loader outcome to the node `id`.
    ///
    /// A module payload is executed right away, inside the definition handshake. If
    /// another module holds the slot, the payload is parked and runs from
    /// [`ResourceEngine::pump`] once the slot is free.
    ///
    /// # Errors
    /// [`ResourceError::DoubleCompletion`] if the node is already terminal, or if it
    /// is a module whose payload was already delivered. [`ResourceError::UnknownResource`]
    /// if the node was never ensured.
    pub fn complete_node(&mut self, id: &str, outcome: Outcome) -> ResourceResult<()> {
        let node = self
            .graph
            .get(id)
            .ok_or_else(|| ResourceError::UnknownResource { id: id.to_string() })?;
        if node.status().is_terminal()
            || (node.kind().is_module() && node.definition != DefinitionState::NotStarted)
        {
            return Err(ResourceError::DoubleCompletion { id: id.to_string() });
        }
        let kind = node.kind();
        let node_id = node.id().clone();

        match outcome {
            Outcome::Failed(reason) => self.settle(id, Err(reason)),
            Outcome::Ready(_) if kind.is_module() => {
                log::warn!("Module '{id}' was delivered as a value instead of a payload.");
                self.settle(id, Err(format!("module '{id}' was delivered without a payload")))
            }
            Outcome::Ready(export) => self.settle(id, Ok(export)),
            Outcome::Module(_) if !kind.is_module() => {
                let reason = ResourceError::NotAModule { id: id.to_string() }.to_string();
                self.settle(id, Err(reason))
            }
            Outcome::Module(payload) => match self.handshake.occupant() {
                Some(occupant) => {
                    log::debug!("Parking module '{id}' until '{occupant}' finishes defining.");
                    if let Some(node) = self.graph.get_mut(id) {
                        node.definition = DefinitionState::Parked;
                    }
                    self.parked_modules.push_back((node_id, payload));
                    Ok(())
                }
                None => self.execute_module(node_id, payload),
            },
        }
    }

    fn run_parked_module(
        &mut self,
        module: ResourceId,
        payload: ModulePayload,
    ) -> ResourceResult<()> {
        match self.graph.get_mut(module.as_str()) {
            Some(node) if node.definition == DefinitionState::Parked => {
                node.definition = DefinitionState::NotStarted;
                self.execute_module(module, payload)
            }
            _ => Err(ResourceError::DoubleCompletion {
                id: module.to_string(),
            }),
        }
    }

    fn execute_module(&mut self, module: ResourceId, payload: ModulePayload) -> ResourceResult<()> {
        let token = self.begin_definition(module.as_str())?;
        let generation = token.generation();
        log::debug!("Executing module '{module}'.");

        let outcome = payload(self, token);
        match (self.handshake.abandon(generation), outcome) {
            (None, Ok(())) => Ok(()),
            (None, Err(e)) => {
                log::warn!("Module '{module}' returned an error after defining itself: {e:#}");
                Ok(())
            }
            (Some(abandoned), Ok(())) => {
                let reason = ResourceError::MissingDefinition {
                    id: abandoned.to_string(),
                }
                .to_string();
                self.settle_if_pending(abandoned.as_str(), Err(reason))
            }
            (Some(abandoned), Err(e)) => {
                self.settle_if_pending(abandoned.as_str(), Err(format!("{e:#}")))
            }
        }
    }

    /// Applies every completion reported so far, fires deferred requests and runs
    /// parked module payloads once the definition slot is free.
    ///
    /// Returns how many events were handled. Work produced while pumping (a loader
    /// completing synchronously, a callback importing more resources) is handled in
    /// the same call. A pump nested inside a payload that still holds the definition
    /// slot leaves parked payloads for a later pump.
    pub fn pump(&mut self) -> ResourceResult<usize> {
        let mut handled = 0;
        loop {
            let deferred = self.tracker.take_deferred();
            if !deferred.is_empty() {
                handled += deferred.len();
                self.fire(deferred)?;
                continue;
            }
            if self.handshake.occupant().is_none() {
                if let Some((module, payload)) = self.parked_modules.pop_front() {
                    self.run_parked_module(module, payload)?;
                    continue;
                }
            }
            match self.completions.try_recv() {
                Ok(completion) => {
                    handled += 1;
                    self.apply(completion)?;
                }
                Err(_) => break,
            }
        }
        Ok(handled)
    }

    fn apply(&mut self, completion: Completion) -> ResourceResult<()> {
        match completion {
            Completion::Settle { id, outcome } => self.complete_node(id.as_str(), outcome),
            Completion::Prefetch { base, specifiers } => {
                self.prefetch(&base, &specifiers);
                Ok(())
            }
        }
    }

    fn prefetch(&mut self, base: &ResourceId, specifiers: &[String]) {
        if !self.config.module_inspection {
            log::debug!("Module inspection is off; ignoring prefetch hint from '{base}'.");
            return;
        }
        for specifier in specifiers {
            match resolve(Some(base.as_str()), specifier) {
                Ok(resolved) => {
                    self.ensure_node(&resolved);
                }
                Err(e) => log::warn!("Ignoring prefetch hint '{specifier}' from '{base}': {e}"),
            }
        }
    }

    fn ensure_all(&mut self, resolved: &[ResolvedId]) -> Vec<ResourceId> {
        let mut ids = Vec::with_capacity(resolved.len());
        for resolved in resolved {
            ids.push(self.ensure_node(resolved).id().clone());
        }
        ids
    }

    fn register(
        &mut self,
        node_ids: Vec<ResourceId>,
        callback: RequestCallback,
    ) -> ResourceResult<RequestId> {
        let (id, satisfied) = self.tracker.register(node_ids, callback, &self.graph);
        self.metrics.request_registered();
        self.metrics.set_outstanding(self.tracker.outstanding());
        if let Some(satisfied) = satisfied {
            self.fire(vec![satisfied])?;
        }
        Ok(id)
    }

    fn settle(&mut self, id: &str, result: Result<Export, String>) -> ResourceResult<()> {
        match self.graph.settle(id, result)? {
            ResourceStatus::Ready => {
                self.metrics.node_ready();
                log::debug!("Resource '{id}' is ready.");
            }
            _ => {
                self.metrics.node_failed();
                let reason = self
                    .graph
                    .get(id)
                    .and_then(ResourceNode::failure_reason)
                    .unwrap_or_default();
                log::warn!("Resource '{id}' failed: {reason}");
            }
        }
        self.on_node_settled()
    }

    fn settle_if_pending(&mut self, id: &str, result: Result<Export, String>) -> ResourceResult<()> {
        match self.graph.get(id) {
            Some(node) if node.status().is_terminal() => {
                log::warn!(
                    "Ignoring late settlement of '{id}', already {}.",
                    node.status()
                );
                Ok(())
            }
            _ => self.settle(id, result),
        }
    }

    fn on_node_settled(&mut self) -> ResourceResult<()> {
        if self.config.cyclic_check {
            self.run_cycle_check();
        }
        let satisfied = self.tracker.collect_satisfied(&self.graph);
        self.metrics.set_outstanding(self.tracker.outstanding());
        self.fire(satisfied)
    }

    /// Runs every callback, even if an earlier one fails. The first error is returned.
    fn fire(&mut self, satisfied: Vec<SatisfiedRequest>) -> ResourceResult<()> {
        let mut first_error = None;
        for request in satisfied {
            self.metrics.request_fired();
            log::debug!(
                "Firing request {} ({}).",
                request.id,
                if request.result.is_ok() { "ready" } else { "failed" }
            );
            if let Err(e) = (request.callback)(self, request.result) {
                log::error!("Request {} could not complete: {e}", request.id);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Records a detection only when the unconsumed edge count differs from the
    /// last one recorded, so an unchanged cycle is reported once.
    fn run_cycle_check(&mut self) {
        match self.graph.check_cycles() {
            Ok(_) => self.last_cycle = None,
            Err(cycle) if self.last_cycle == Some(cycle.unresolved_edges) => {}
            Err(cycle) => {
                self.last_cycle = Some(cycle.unresolved_edges);
                let error = ResourceError::from(cycle);
                log::error!("{error}");
                self.metrics.cycle_detected();
                self.diagnostics.push(error);
            }
        }
    }

    /// Runs the cycle detector over the current graph, independently of `cyclic_check`.
    pub fn check_cycles(&self) -> ResourceResult<()> {
        self.graph.check_cycles().map(|_| ()).map_err(Into::into)
    }

    /// Cycle detections recorded so far.
    pub fn diagnostics(&self) -> &[ResourceError] {
        &self.diagnostics
    }

    /// Drains the recorded cycle detections.
    pub fn take_diagnostics(&mut self) -> Vec<ResourceError> {
        std::mem::take(&mut self.diagnostics)
    }

    /// The module whose payload is executing, if any.
    pub fn defining(&self) -> Option<&ResourceId> {
        self.handshake.occupant()
    }

    /// Number of requests waiting on the graph.
    pub fn outstanding_requests(&self) -> usize {
        self.tracker.outstanding()
    }

    /// Identifiers still awaited by an outstanding request.
    pub fn waiting_on(&self, request: RequestId) -> Option<Vec<&ResourceId>> {
        self.tracker.waiting_on(request, &self.graph)
    }

    /// `true` when no request is waiting, no completion is queued and no module
    /// payload is parked.
    pub fn is_idle(&self) -> bool {
        self.tracker.outstanding() == 0
            && self.tracker.deferred() == 0
            && self.parked_modules.is_empty()
            && self.completions.is_empty()
    }

    /// Number of module payloads waiting for the definition slot.
    pub fn parked_modules(&self) -> usize {
        self.parked_modules.len()
    }

    /// A point-in-time summary of the graph and the tracker.
    pub fn stats(&self) -> EngineStats {
        let mut stats = EngineStats {
            nodes: self.graph.len(),
            edges: self.graph.edge_count(),
            outstanding_requests: self.tracker.outstanding(),
            ..EngineStats::default()
        };
        for node in self.graph.nodes() {
            match node.status() {
                ResourceStatus::Pending | ResourceStatus::Loading => stats.loading += 1,
                ResourceStatus::Ready => stats.ready += 1,
                ResourceStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }
}

impl fmt::Debug for ResourceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEngine")
            .field("config", &self.config)
            .field("graph", &self.graph)
            .field("tracker", &self.tracker)
            .field("defining", &self.handshake.occupant())
            .field("parked_modules", &self.parked_modules.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}
