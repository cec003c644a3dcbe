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

//! The capability through which the engine asks collaborators to fetch resources,
//! and the path through which they report back.

use crate::engine::ResourceEngine;
use crate::handshake::DefinitionToken;
use rhizome_core::resource::{Export, ResourceId, ResourceKind};
use std::fmt;

/// A module payload: code that, once executed, defines the module's dependencies
/// and factory through [`ResourceEngine::define`].
pub type ModulePayload =
    Box<dyn FnOnce(&mut ResourceEngine, DefinitionToken) -> anyhow::Result<()> + Send>;

/// The outcome a loader reports for one resource.
pub enum Outcome {
    /// The payload was fetched and decoded.
    Ready(Export),
    /// The payload is a module that must execute before it can become ready.
    Module(ModulePayload),
    /// The resource can never be loaded.
    Failed(String),
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready(export) => f.debug_tuple("Ready").field(export).finish(),
            Outcome::Module(_) => f.write_str("Module(..)"),
            Outcome::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
        }
    }
}

/// A message travelling from a loader back to the engine.
#[derive(Debug)]
pub(crate) enum Completion {
    /// The final outcome of one resource.
    Settle { id: ResourceId, outcome: Outcome },
    /// Specifiers a module is known to depend on, resolved against `base`.
    Prefetch {
        base: ResourceId,
        specifiers: Vec<String>,
    },
}

/// The single-use reply channel handed to a [`Loader`] with every load.
///
/// Completers are `Send`, so a loader may move them to worker threads. The
/// completion is applied on the engine's thread during [`ResourceEngine::pump`].
#[must_use = "a dropped completer leaves its resource loading forever"]
pub struct Completer {
    id: ResourceId,
    sender: flume::Sender<Completion>,
}

impl Completer {
    pub(crate) fn new(id: ResourceId, sender: flume::Sender<Completion>) -> Self {
        Self { id, sender }
    }

    /// The canonical identifier this completer reports for.
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Reports a decoded payload.
    pub fn ready(self, export: Export) {
        self.complete(Outcome::Ready(export));
    }

    /// Reports a terminal failure.
    pub fn fail(self, reason: impl Into<String>) {
        self.complete(Outcome::Failed(reason.into()));
    }

    /// Reports a module payload. The engine executes it exactly once.
    pub fn module<F>(self, payload: F)
    where
        F: FnOnce(&mut ResourceEngine, DefinitionToken) -> anyhow::Result<()> + Send + 'static,
    {
        self.complete(Outcome::Module(Box::new(payload)));
    }

    /// Hints that this module depends on `specifiers`, so they can start loading
    /// before the module executes. The hint never changes what the module defines.
    pub fn prefetch(&self, specifiers: Vec<String>) {
        if specifiers.is_empty() {
            return;
        }
        self.send(Completion::Prefetch {
            base: self.id.clone(),
            specifiers,
        });
    }

    /// Reports an arbitrary outcome.
    pub fn complete(self, outcome: Outcome) {
        let id = self.id.clone();
        self.send(Completion::Settle { id, outcome });
    }

    fn send(&self, completion: Completion) {
        if self.sender.send(completion).is_err() {
            log::warn!(
                "Resource engine is gone; completion for '{}' was discarded.",
                self.id
            );
        }
    }
}

impl fmt::Debug for Completer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer").field("id", &self.id).finish()
    }
}

/// The capability the engine uses to start fetching a resource.
///
/// `load` is fire-and-forget: it must not block waiting for the payload, and it
/// reports exactly once through the given [`Completer`], now or later.
pub trait Loader {
    /// Starts loading `id`, a resource of the given `kind`.
    fn load(&mut self, kind: ResourceKind, id: &ResourceId, completer: Completer);
}

impl<F> Loader for F
where
    F: FnMut(ResourceKind, &ResourceId, Completer),
{
    fn load(&mut self, kind: ResourceKind, id: &ResourceId, completer: Completer) {
        self(kind, id, completer)
    }
}
