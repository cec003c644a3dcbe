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

//! Engine configuration, read once at construction.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options recognized by the resource engine and its loaders.
///
/// Every field is optional in the TOML representation:
///
/// ```toml
/// cyclic_check = true
/// module_inspection = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run the cycle detector before every completion scan.
    pub cyclic_check: bool,
    /// Let module loaders read a module's declared dependencies before it executes
    /// and start loading them early. Only affects loaders.
    pub module_inspection: bool,
}

impl EngineConfig {
    /// Parses a configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Loads a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config '{}'", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))
    }

    /// Loads the configuration at `path`, or returns the defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            log::info!("Loading engine config from '{}'", path.display());
            Self::from_file(path)
        } else {
            log::debug!("No engine config at '{}', using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Enables or disables the cycle detector.
    pub fn with_cyclic_check(mut self, enabled: bool) -> Self {
        self.cyclic_check = enabled;
        self
    }

    /// Enables or disables module inspection.
    pub fn with_module_inspection(mut self, enabled: bool) -> Self {
        self.module_inspection = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_everything() {
        let config = EngineConfig::default();
        assert!(!config.cyclic_check);
        assert!(!config.module_inspection);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("cyclic_check = true").unwrap();
        assert!(config.cyclic_check);
        assert!(!config.module_inspection);
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(EngineConfig::from_toml_str("cyclic_check = \"yes\"").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = EngineConfig::load_or_default("does/not/exist/Rhizome.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn serialized_config_round_trips_through_toml() {
        let config = EngineConfig::default().with_module_inspection(true);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
