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
use rhizome_core::resource::{resolve, Export, ResourceId};
use rhizome_core::{ResourceError, ResourceResult};
use rhizome_engine::{DefinitionToken, ResourceEngine};
use std::{collections::HashMap, sync::Arc};

/// A module factory implemented in Rust.
pub type NativeFactory = Arc<dyn Fn(Vec<Export>) -> Result<Export> + Send + Sync>;

/// A module whose factory is a Rust closure.
#[derive(Clone)]
pub struct NativeModule {
    requires: Vec<String>,
    factory: NativeFactory,
}

impl NativeModule {
    /// A module depending on `requires`, resolved against its own identifier.
    pub fn new<F>(requires: Vec<String>, factory: F) -> Self
    where
        F: Fn(Vec<Export>) -> Result<Export> + Send + Sync + 'static,
    {
        Self {
            requires,
            factory: Arc::new(factory),
        }
    }

    /// The declared dependency specifiers.
    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    /// The payload the engine executes for this module.
    pub fn payload(
        &self,
    ) -> impl FnOnce(&mut ResourceEngine, DefinitionToken) -> Result<()> + Send + 'static {
        let requires = self.requires.clone();
        let factory = self.factory.clone();
        move |engine, token| {
            engine.define(token, &requires, move |exports| factory(exports))?;
            Ok(())
        }
    }
}

impl std::fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeModule")
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

/// Native modules keyed by canonical identifier. They take precedence over the
/// transport.
#[derive(Debug, Clone, Default)]
pub struct NativeModuleRegistry {
    modules: HashMap<ResourceId, NativeModule>,
}

impl NativeModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `module` under the canonical form of `specifier`.
    ///
    /// # Errors
    /// Fails if the specifier does not resolve to a module identifier.
    pub fn register(&mut self, specifier: &str, module: NativeModule) -> ResourceResult<ResourceId> {
        let resolved = resolve(None, specifier)?;
        if !resolved.kind().is_module() {
            return Err(ResourceError::NotAModule {
                id: resolved.id().to_string(),
            });
        }
        let id = resolved.into_id();
        if self.modules.insert(id.clone(), module).is_some() {
            log::warn!("Native module '{id}' was registered twice; keeping the latest.");
        }
        Ok(id)
    }

    /// Looks a module up by canonical identifier.
    pub fn get(&self, id: &str) -> Option<&NativeModule> {
        self.modules.get(id)
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no module is registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
