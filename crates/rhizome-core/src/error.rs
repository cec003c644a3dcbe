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

//! Defines the error taxonomy shared by the resolver, the graph and the loaders.

use thiserror::Error;

/// A specialized `Result` type for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// An error raised while resolving, loading or defining a resource.
///
/// The type is `Clone` because a single node failure is delivered to every
/// outstanding request that names the node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The specifier is malformed or resolved to an empty path.
    #[error("Invalid identifier '{specifier}': {reason}")]
    InvalidIdentifier {
        /// The raw specifier as provided by the caller.
        specifier: String,
        /// Why the specifier could not be resolved.
        reason: String,
    },

    /// The specifier carries an extension that maps to no registered kind.
    #[error("Unsupported resource kind for '{specifier}' (extension '{extension}')")]
    UnsupportedKind {
        /// The raw specifier as provided by the caller.
        specifier: String,
        /// The extension that matched no entry of the kind table.
        extension: String,
    },

    /// The loader reported a terminal failure for a node.
    #[error("Failed to load '{id}': {reason}")]
    LoaderFailure {
        /// The canonical identifier of the failed node.
        id: String,
        /// The failure reason reported by the loader or the module factory.
        reason: String,
    },

    /// A definition was started while another module payload was still executing.
    #[error("Cannot begin a definition: '{occupant}' is still executing")]
    DefinitionSlotBusy {
        /// The module currently holding the definition slot.
        occupant: String,
    },

    /// `define` was called while no module payload was executing.
    #[error("No module definition is in progress")]
    NoActiveDefinition,

    /// The dependency graph contains at least one cycle.
    #[error("Cyclic dependency detected ({unresolved_edges} dependency edges could not be reduced)")]
    CyclicDependency {
        /// Number of dependency edges left unconsumed by the reduction.
        unresolved_edges: usize,
    },

    /// A completion arrived for a node that already reached a terminal state.
    #[error("Resource '{id}' was completed more than once")]
    DoubleCompletion {
        /// The canonical identifier of the node.
        id: String,
    },

    /// An operation referenced an identifier that is not part of the graph.
    #[error("Unknown resource '{id}'")]
    UnknownResource {
        /// The canonical identifier that was looked up.
        id: String,
    },

    /// A definition was attempted on a node that is not module-kind.
    #[error("Resource '{id}' is not a module")]
    NotAModule {
        /// The canonical identifier of the node.
        id: String,
    },

    /// A module payload finished executing without defining itself.
    #[error("Module '{id}' finished executing without calling define")]
    MissingDefinition {
        /// The canonical identifier of the module.
        id: String,
    },
}

impl ResourceError {
    /// Builds an [`ResourceError::InvalidIdentifier`].
    pub fn invalid(specifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            specifier: specifier.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors that indicate a bug in a collaborator rather than
    /// a recoverable runtime condition.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::DefinitionSlotBusy { .. }
                | Self::NoActiveDefinition
                | Self::DoubleCompletion { .. }
                | Self::UnknownResource { .. }
                | Self::NotAModule { .. }
        )
    }
}
