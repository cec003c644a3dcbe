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

//! Errors raised by the reference lanes.

use rhizome_core::resource::{ResourceId, ResourceKind};
use thiserror::Error;

/// A boxed, thread-safe error produced by a decoder.
pub type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// An error raised while fetching or decoding a resource.
#[derive(Debug, Error)]
pub enum LaneError {
    /// No decoder handles the resource's kind.
    #[error("No decoder registered for {0} resources")]
    NoDecoder(ResourceKind),

    /// The pack index has no entry for the identifier.
    #[error("'{0}' is not in the pack index")]
    NotPacked(ResourceId),

    /// A decoder rejected the payload.
    #[error("Failed to decode '{id}': {source}")]
    Decode {
        /// The resource being decoded.
        id: ResourceId,
        /// The decoder's error.
        #[source]
        source: DecodeError,
    },
}
