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

use super::{extension_of, Decoder};
use crate::error::DecodeError;
use rhizome_core::resource::{Export, ResourceId, ResourceKind};

/// Raw bytes of a resource the engine does not interpret: images, audio, video
/// and opaque payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// The kind the identifier resolved to.
    pub kind: ResourceKind,
    /// The lower-cased extension.
    pub extension: String,
    /// The payload.
    pub bytes: Vec<u8>,
}

/// Wraps the payload in a [`Blob`].
#[derive(Debug, Clone, Copy)]
pub struct BlobDecoder {
    kind: ResourceKind,
}

impl BlobDecoder {
    /// A decoder producing blobs tagged with `kind`.
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

impl Decoder for BlobDecoder {
    fn decode(&self, id: &ResourceId, bytes: &[u8]) -> Result<Export, DecodeError> {
        Ok(Export::new(Blob {
            kind: self.kind,
            extension: extension_of(id),
            bytes: bytes.to_vec(),
        }))
    }
}
