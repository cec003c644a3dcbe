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

//! # Rhizome Core
//!
//! Foundational crate containing the types every other Rhizome crate speaks:
//! canonical resource identifiers, resource kinds, exported values, the error
//! taxonomy, engine configuration and the dependency-cycle detector.
//!
//! Nothing in here performs I/O on behalf of a resource or owns any mutable
//! graph state; that lives in `rhizome-engine`.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod graph;
pub mod resource;

pub use config::EngineConfig;
pub use error::{ResourceError, ResourceResult};
