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

use super::Transport;
use anyhow::{Context, Result};
use rhizome_core::resource::ResourceId;
use std::path::{Path, PathBuf};

/// Reads resources from a directory tree, one file per canonical identifier.
#[derive(Debug, Clone)]
pub struct DirectoryTransport {
    root: PathBuf,
}

impl DirectoryTransport {
    /// Serves files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory resources are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file backing `id`.
    pub fn path_of(&self, id: &ResourceId) -> PathBuf {
        // Canonical identifiers never contain `.`, `..` or empty segments.
        id.as_str()
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl Transport for DirectoryTransport {
    fn fetch(&mut self, id: &ResourceId) -> Result<Vec<u8>> {
        let path = self.path_of(id);
        log::trace!("Reading '{id}' from {}", path.display());
        std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
    }
}
