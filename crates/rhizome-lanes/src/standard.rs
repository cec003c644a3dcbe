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

//! The loader that ships with Rhizome: a transport for bytes, a decoder registry
//! for values and two module sources.

use crate::decode::DecoderRegistry;
use crate::module::{DeclarativeModule, NativeModuleRegistry};
use crate::transport::Transport;
use anyhow::{Context, Result};
use rhizome_core::resource::{Export, ResourceId, ResourceKind};
use rhizome_core::EngineConfig;
use rhizome_engine::{Completer, Loader};

/// Composes a [`Transport`], a [`DecoderRegistry`] and a [`NativeModuleRegistry`]
/// into a [`Loader`].
///
/// Every load completes before `load` returns; the engine applies the outcome on
/// its next pump. Module identifiers are looked up among native modules first, then
/// fetched and parsed as [`DeclarativeModule`] files.
pub struct StandardLoader<T> {
    transport: T,
    decoders: DecoderRegistry,
    natives: NativeModuleRegistry,
    module_inspection: bool,
}

impl<T: Transport> StandardLoader<T> {
    /// A loader over `transport` with the default decoders and no native module.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            decoders: DecoderRegistry::with_defaults(),
            natives: NativeModuleRegistry::new(),
            module_inspection: false,
        }
    }

    /// Replaces the decoder registry.
    pub fn with_decoders(mut self, decoders: DecoderRegistry) -> Self {
        self.decoders = decoders;
        self
    }

    /// Replaces the native module registry.
    pub fn with_native_modules(mut self, natives: NativeModuleRegistry) -> Self {
        self.natives = natives;
        self
    }

    /// Sends each module's declared dependencies as a prefetch hint before its payload.
    pub fn with_module_inspection(mut self, enabled: bool) -> Self {
        self.module_inspection = enabled;
        self
    }

    /// Applies the loader-side settings of `config`.
    pub fn configured(self, config: &EngineConfig) -> Self {
        self.with_module_inspection(config.module_inspection)
    }

    fn fetch_and_decode(&mut self, kind: ResourceKind, id: &ResourceId) -> Result<Export> {
        let bytes = self.transport.fetch(id)?;
        Ok(self.decoders.decode(kind, id, &bytes)?)
    }

    fn load_module(&mut self, id: &ResourceId, completer: Completer) {
        if let Some(native) = self.natives.get(id.as_str()) {
            log::debug!("Module '{id}' is native.");
            if self.module_inspection {
                completer.prefetch(native.requires().to_vec());
            }
            completer.module(native.payload());
            return;
        }

        match self.read_declarative(id) {
            Ok(module) => {
                if self.module_inspection {
                    completer.prefetch(module.requires.clone());
                }
                completer.module(module.into_payload());
            }
            Err(e) => completer.fail(format!("{e:#}")),
        }
    }

    fn read_declarative(&mut self, id: &ResourceId) -> Result<DeclarativeModule> {
        let bytes = self.transport.fetch(id)?;
        DeclarativeModule::parse(&bytes)
            .with_context(|| format!("'{id}' is not a valid module file"))
    }
}

impl<T: Transport> Loader for StandardLoader<T> {
    fn load(&mut self, kind: ResourceKind, id: &ResourceId, completer: Completer) {
        log::trace!("Loading {kind} resource '{id}'.");
        if kind.is_module() {
            self.load_module(id, completer);
            return;
        }
        match self.fetch_and_decode(kind, id) {
            Ok(export) => completer.ready(export),
            Err(e) => completer.fail(format!("{e:#}")),
        }
    }
}

impl<T> std::fmt::Debug for StandardLoader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardLoader")
            .field("decoders", &self.decoders)
            .field("native_modules", &self.natives.len())
            .field("module_inspection", &self.module_inspection)
            .finish_non_exhaustive()
    }
}
