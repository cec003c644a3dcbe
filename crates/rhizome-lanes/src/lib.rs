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

//! # Rhizome Lanes
//!
//! The reference collaborators that plug into the engine's [`Loader`] capability:
//!
//! - [`transport`] turns a canonical identifier into raw bytes, from a directory
//!   or from a packed archive built by `xtask pack`.
//! - [`decode`] turns raw bytes into an [`Export`] according to the resource kind.
//! - [`module`] provides module payloads, either native Rust closures or
//!   declarative JSON module files.
//! - [`StandardLoader`] composes the three.
//!
//! [`Loader`]: rhizome_engine::Loader
//! [`Export`]: rhizome_core::resource::Export

#![warn(missing_docs)]

pub mod decode;
pub mod error;
pub mod module;
pub mod standard;
pub mod transport;

pub use error::LaneError;
pub use standard::StandardLoader;
