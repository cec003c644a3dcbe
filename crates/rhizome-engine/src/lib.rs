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

//! # Rhizome Engine
//!
//! The dependency-resolution engine. It owns the resource graph, the outstanding
//! requests and the definition slot, and it talks to the outside world through a
//! single [`Loader`] capability.
//!
//! ```
//! use rhizome_core::{resource::Export, EngineConfig};
//! use rhizome_engine::{Completer, ResourceEngine};
//! use rhizome_core::resource::{ResourceId, ResourceKind};
//! use std::{cell::Cell, rc::Rc};
//!
//! let loader = |_kind: ResourceKind, id: &ResourceId, completer: Completer| {
//!     completer.ready(Export::new(format!("contents of {id}")));
//! };
//! let mut engine = ResourceEngine::new(EngineConfig::default(), loader);
//!
//! let fired = Rc::new(Cell::new(false));
//! let flag = fired.clone();
//! engine
//!     .import_resources(None, &["notes/today.txt"], move |_, result| {
//!         let exports = result.unwrap();
//!         assert_eq!(
//!             exports[0].downcast_ref::<String>().unwrap(),
//!             "contents of notes/today.txt"
//!         );
//!         flag.set(true);
//!     })
//!     .unwrap();
//!
//! engine.pump().unwrap();
//! assert!(fired.get());
//! ```

#![warn(missing_docs)]

mod engine;
mod graph;
mod handshake;
mod loader;
mod metrics;
mod tracker;

pub use engine::{ModuleFactory, ResourceEngine};
pub use graph::{ResourceGraph, ResourceNode};
pub use handshake::{DefinitionHandshake, DefinitionToken};
pub use loader::{Completer, Loader, ModulePayload, Outcome};
pub use metrics::EngineStats;
pub use tracker::{RequestId, RequestResult, RequestTracker};
