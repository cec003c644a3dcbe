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

use anyhow::Result;
use rhizome_core::resource::Export;
use rhizome_engine::{DefinitionToken, ResourceEngine};
use serde::{Deserialize, Serialize};

/// A module file written as JSON:
///
/// ```json
/// { "requires": ["./config.json", "../shared/log"], "exports": { "name": "app" } }
/// ```
///
/// Executing it defines `requires`; its factory produces a [`ModuleExports`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeclarativeModule {
    /// Dependency specifiers, resolved against the module's identifier.
    pub requires: Vec<String>,
    /// The value the module exports.
    pub exports: serde_json::Value,
}

impl DeclarativeModule {
    /// Parses a module file.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// The payload the engine executes for this module.
    pub fn into_payload(
        self,
    ) -> impl FnOnce(&mut ResourceEngine, DefinitionToken) -> Result<()> + Send + 'static {
        let Self { requires, exports } = self;
        move |engine, token| {
            engine.define(token, &requires, move |dependencies| {
                Ok(Export::new(ModuleExports {
                    value: exports,
                    dependencies,
                }))
            })?;
            Ok(())
        }
    }
}

/// The export of a declarative module.
#[derive(Debug, Clone)]
pub struct ModuleExports {
    /// The module's `exports` value.
    pub value: serde_json::Value,
    /// The exports of its dependencies, in `requires` order.
    pub dependencies: Vec<Export>,
}
