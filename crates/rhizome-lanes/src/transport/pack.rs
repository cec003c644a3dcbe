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

//! Packed archives: a bincode-encoded `index.bin` describing byte ranges of a
//! single `data.pack` file.

use super::Transport;
use crate::LaneError;
use anyhow::{Context, Result};
use rhizome_core::resource::{ResourceId, ResourceKind};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

/// File name of the pack index inside a pack directory.
pub const INDEX_FILE_NAME: &str = "index.bin";
/// File name of the pack data inside a pack directory.
pub const DATA_FILE_NAME: &str = "data.pack";

/// Where one resource lives inside `data.pack`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackEntry {
    /// Canonical identifier of the resource.
    pub id: ResourceId,
    /// Kind the identifier resolves to.
    pub kind: ResourceKind,
    /// Byte offset from the start of the data file.
    pub offset: u64,
    /// Length in bytes.
    pub size: u64,
}

/// The runtime form of `index.bin`, keyed by canonical identifier.
#[derive(Debug, Default)]
pub struct PackIndex {
    entries: HashMap<ResourceId, PackEntry>,
}

impl PackIndex {
    /// Decodes an index from the bytes of `index.bin`.
    ///
    /// # Errors
    /// Returns a `DecodeError` if the bytes are not a bincode-encoded list of
    /// [`PackEntry`].
    pub fn from_bytes(index_bytes: &[u8]) -> Result<Self, bincode::error::DecodeError> {
        let config = bincode::config::standard();
        let (entries, _): (Vec<PackEntry>, _) =
            bincode::serde::decode_from_slice(index_bytes, config)?;

        Ok(Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
        })
    }

    /// Encodes a list of entries the way `index.bin` stores them.
    pub fn encode(entries: &[PackEntry]) -> Result<Vec<u8>, bincode::error::EncodeError> {
        bincode::serde::encode_to_vec(entries, bincode::config::standard())
    }

    /// Looks an entry up by canonical identifier.
    pub fn get(&self, id: &str) -> Option<&PackEntry> {
        self.entries.get(id)
    }

    /// Number of packed resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over every entry, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &PackEntry> {
        self.entries.values()
    }
}

/// Reads resources out of a `data.pack` file.
pub struct PackTransport {
    index: PackIndex,
    pack_file: File,
}

impl PackTransport {
    /// Creates a transport from the raw index bytes and an open data file.
    pub fn new(index_bytes: &[u8], pack_file: File) -> Result<Self> {
        let index = PackIndex::from_bytes(index_bytes).context("Failed to decode pack index")?;
        log::info!("Pack index loaded with {} resources.", index.len());
        Ok(Self { index, pack_file })
    }

    /// Opens `index.bin` and `data.pack` inside `directory`.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref();
        let index_path = directory.join(INDEX_FILE_NAME);
        let data_path = directory.join(DATA_FILE_NAME);
        let index_bytes = std::fs::read(&index_path)
            .with_context(|| format!("Failed to read {}", index_path.display()))?;
        let pack_file = File::open(&data_path)
            .with_context(|| format!("Failed to open {}", data_path.display()))?;
        Self::new(&index_bytes, pack_file)
    }

    /// The decoded index.
    pub fn index(&self) -> &PackIndex {
        &self.index
    }
}

impl Transport for PackTransport {
    fn fetch(&mut self, id: &ResourceId) -> Result<Vec<u8>> {
        let entry = self
            .index
            .get(id.as_str())
            .ok_or_else(|| LaneError::NotPacked(id.clone()))?;

        let size = usize::try_from(entry.size).context("Packed resource is too large")?;
        let mut buffer = vec![0; size];
        self.pack_file
            .seek(SeekFrom::Start(entry.offset))
            .context("Failed to seek to resource location in pack file")?;
        self.pack_file
            .read_exact(&mut buffer)
            .context("Failed to read resource bytes from pack file")?;
        Ok(buffer)
    }
}

impl std::fmt::Debug for PackTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackTransport")
            .field("resources", &self.index.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, kind: ResourceKind, offset: u64, size: u64) -> PackEntry {
        PackEntry {
            id: ResourceId::from(id),
            kind,
            offset,
            size,
        }
    }

    #[test]
    fn reads_byte_ranges_from_the_pack() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let entries = vec![
            entry("a.txt", ResourceKind::Text, 0, 5),
            entry("b/c.json", ResourceKind::StructuredData, 5, 2),
        ];
        std::fs::write(dir.path().join(INDEX_FILE_NAME), PackIndex::encode(&entries)?)?;
        std::fs::write(dir.path().join(DATA_FILE_NAME), b"hello{}")?;

        let mut transport = PackTransport::open(dir.path())?;
        assert_eq!(transport.index().len(), 2);
        assert_eq!(transport.fetch(&ResourceId::from("b/c.json"))?, b"{}");
        assert_eq!(transport.fetch(&ResourceId::from("a.txt"))?, b"hello");
        Ok(())
    }

    #[test]
    fn unknown_identifier_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let data_path = dir.path().join(DATA_FILE_NAME);
        std::fs::write(&data_path, b"")?;

        let mut transport = PackTransport::new(&PackIndex::encode(&[])?, File::open(&data_path)?)?;
        let err = transport.fetch(&ResourceId::from("ghost.txt")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LaneError>(),
            Some(LaneError::NotPacked(id)) if id.as_str() == "ghost.txt"
        ));
        Ok(())
    }

    #[test]
    fn truncated_pack_fails_to_read() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let data_path = dir.path().join(DATA_FILE_NAME);
        std::fs::write(&data_path, b"abc")?;
        let index = PackIndex::encode(&[entry("long.txt", ResourceKind::Text, 0, 10)])?;

        let mut transport = PackTransport::new(&index, File::open(&data_path)?)?;
        assert!(transport.fetch(&ResourceId::from("long.txt")).is_err());
        Ok(())
    }
}
