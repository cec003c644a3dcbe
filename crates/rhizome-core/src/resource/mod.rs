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

//! Provides the primitive types that describe a resource from the outside.
//!
//! This module is the "common language" of the loader: it knows how to turn a
//! raw specifier into a canonical identifier and which kind of payload that
//! identifier names, but it has no knowledge of how payloads are fetched,
//! decoded or tracked.
//!
//! The key components are:
//! - [`ResourceId`]: the canonical, separator-normalized key of the graph.
//! - [`ResourceKind`]: the payload category, chosen from a static extension table.
//! - [`resolve`]: the pure identifier resolver.
//! - [`Export`]: the type-erased value a ready resource exposes to its consumers.
//! - [`ResourceStatus`]: the forward-only lifecycle of a node.

mod export;
mod id;
mod kind;
mod resolver;
mod status;

pub use export::*;
pub use id::*;
pub use kind::*;
pub use resolver::*;
pub use status::*;
