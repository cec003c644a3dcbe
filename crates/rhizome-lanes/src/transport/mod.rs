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

//! Transports fetch the raw bytes behind a canonical identifier.

mod directory;
mod pack;

pub use directory::DirectoryTransport;
pub use pack::{PackEntry, PackIndex, PackTransport, DATA_FILE_NAME, INDEX_FILE_NAME};

use anyhow::Result;
use rhizome_core::resource::ResourceId;

/// A source of raw resource bytes.
///
/// A failed fetch is terminal for the resource; transports never retry.
pub trait Transport {
    /// Reads every byte of the resource `id`.
    fn fetch(&mut self, id: &ResourceId) -> Result<Vec<u8>>;
}
