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

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const MANIFEST_FILE_NAME: &str = "Resources.toml";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = ".dist/resources";

/// Describes which directories feed the resource pack and where it is written.
///
/// ```toml
/// source_directories = ["resources", "vendor/resources"]
/// output_directory = ".dist/resources"
/// ```
#[derive(Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct ResourceManifest {
    /// Roots whose files are packed. A file's identifier is its path relative
    /// to its root, so earlier roots win when two of them hold the same path.
    pub source_directories: Vec<PathBuf>,
    pub output_directory: PathBuf,
}

impl Default for ResourceManifest {
    fn default() -> Self {
        Self {
            source_directories: vec![PathBuf::from("resources")],
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
        }
    }
}

impl ResourceManifest {
    /// Loads the manifest, or returns the defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<(Self, bool)> {
        if !path.exists() {
            return Ok((Self::default(), false));
        }
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file at '{}'", path.display()))?;
        let manifest = toml::from_str(&source)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))?;
        Ok((manifest, true))
    }
}
