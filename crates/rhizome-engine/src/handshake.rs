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

//! The single-slot protocol through which an executing module payload declares
//! its dependencies and factory.

use rhizome_core::resource::ResourceId;
use rhizome_core::{ResourceError, ResourceResult};

/// Proof that a module payload currently owns the definition slot.
///
/// A token is consumed once, by [`crate::ResourceEngine::define`]. It is neither
/// `Clone` nor `Copy`.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a definition token must be passed to `define`"]
pub struct DefinitionToken {
    node: ResourceId,
    generation: u64,
}

impl DefinitionToken {
    /// The module this token defines.
    pub fn node(&self) -> &ResourceId {
        &self.node
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Occupant {
    node: ResourceId,
    generation: u64,
}

/// Holds at most one module whose payload is executing.
#[derive(Debug, Default)]
pub struct DefinitionHandshake {
    slot: Option<Occupant>,
    next_generation: u64,
}

impl DefinitionHandshake {
    /// Creates an empty handshake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupies the slot on behalf of `node`.
    pub fn begin(&mut self, node: ResourceId) -> ResourceResult<DefinitionToken> {
        if let Some(occupant) = &self.slot {
            return Err(ResourceError::DefinitionSlotBusy {
                occupant: occupant.node.to_string(),
            });
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.slot = Some(Occupant {
            node: node.clone(),
            generation,
        });
        Ok(DefinitionToken { node, generation })
    }

    /// Vacates the slot if `token` still owns it, returning the defined node.
    pub fn consume(&mut self, token: DefinitionToken) -> ResourceResult<ResourceId> {
        match self.slot.take() {
            Some(occupant) if occupant.generation == token.generation => Ok(occupant.node),
            other => {
                self.slot = other;
                Err(ResourceError::NoActiveDefinition)
            }
        }
    }

    /// Vacates the slot whoever owns it.
    pub fn consume_current(&mut self) -> ResourceResult<ResourceId> {
        self.slot
            .take()
            .map(|occupant| occupant.node)
            .ok_or(ResourceError::NoActiveDefinition)
    }

    /// Vacates the slot only if it is still held by `generation`.
    ///
    /// Returns the node that never defined itself.
    pub(crate) fn abandon(&mut self, generation: u64) -> Option<ResourceId> {
        match self.slot.take() {
            Some(occupant) if occupant.generation == generation => Some(occupant.node),
            other => {
                self.slot = other;
                None
            }
        }
    }

    /// The module currently holding the slot.
    pub fn occupant(&self) -> Option<&ResourceId> {
        self.slot.as_ref().map(|occupant| &occupant.node)
    }
}
