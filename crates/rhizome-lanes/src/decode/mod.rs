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

//! Decoders turn the raw bytes of a non-module resource into its export.

mod blob;
mod structured;
mod text;

pub use blob::{Blob, BlobDecoder};
pub use structured::StructuredDataDecoder;
pub use text::{Stylesheet, StylesheetDecoder, TextDecoder};

use crate::error::{DecodeError, LaneError};
use rhizome_core::resource::{Export, ResourceId, ResourceKind};
use rhizome_telemetry::{CounterHandle, HistogramHandle, MetricsRegistry, ScopedMetricTimer};
use std::{collections::HashMap, sync::Arc};

/// Parses the bytes of one resource kind.
///
/// This is the CPU-bound half of loading. Implementations must be thread-safe so a
/// registry can be shared with worker threads.
pub trait Decoder: Send + Sync {
    /// Decodes `bytes`, the payload of `id`.
    fn decode(&self, id: &ResourceId, bytes: &[u8]) -> Result<Export, DecodeError>;
}

impl<F> Decoder for F
where
    F: Fn(&ResourceId, &[u8]) -> Result<Export, DecodeError> + Send + Sync,
{
    fn decode(&self, id: &ResourceId, bytes: &[u8]) -> Result<Export, DecodeError> {
        self(id, bytes)
    }
}

/// Metric handles used by the registry.
#[derive(Default)]
struct DecoderMetrics {
    /// Histogram of decode times in milliseconds.
    decode_time_ms: Option<HistogramHandle>,
    /// Counter of successfully decoded resources.
    decoded_total: Option<CounterHandle>,
}

impl DecoderMetrics {
    fn new(registry: &MetricsRegistry) -> Self {
        let decode_time_ms = registry
            .register_histogram(
                "loaders",
                "decode_time",
                "Resource decoding time",
                "ms",
                vec![1.0, 5.0, 16.0, 33.0, 100.0, 500.0],
            )
            .map_err(|e| log::warn!("Failed to register decode time metric: {e}"))
            .ok();
        let decoded_total = registry
            .register_counter(
                "loaders",
                "decoded_total",
                "Total number of resources decoded",
            )
            .map_err(|e| log::warn!("Failed to register decode count metric: {e}"))
            .ok();
        Self {
            decode_time_ms,
            decoded_total,
        }
    }
}

/// Maps each resource kind to the decoder that handles it.
#[derive(Default, Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<ResourceKind, Arc<dyn Decoder>>,
    metrics: Arc<DecoderMetrics>,
}

impl DecoderRegistry {
    /// Creates a registry with no decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in decoders for every non-module kind.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ResourceKind::Text, TextDecoder);
        registry.register(ResourceKind::Stylesheet, StylesheetDecoder);
        registry.register(ResourceKind::StructuredData, StructuredDataDecoder);
        for kind in [
            ResourceKind::Image,
            ResourceKind::Audio,
            ResourceKind::Video,
            ResourceKind::Unsupported,
        ] {
            registry.register(kind, BlobDecoder::new(kind));
        }
        registry
    }

    /// Publishes decode metrics under the `loaders` namespace of `registry`.
    pub fn with_metrics(mut self, registry: &MetricsRegistry) -> Self {
        self.metrics = Arc::new(DecoderMetrics::new(registry));
        self
    }

    /// Registers (or replaces) the decoder for `kind`.
    pub fn register(&mut self, kind: ResourceKind, decoder: impl Decoder + 'static) {
        if self.decoders.insert(kind, Arc::new(decoder)).is_some() {
            log::debug!("Replaced the decoder for {kind} resources.");
        }
    }

    /// Whether a decoder handles `kind`.
    pub fn supports(&self, kind: ResourceKind) -> bool {
        self.decoders.contains_key(&kind)
    }

    /// Decodes the payload of `id` with the decoder registered for `kind`.
    pub fn decode(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        bytes: &[u8],
    ) -> Result<Export, LaneError> {
        let decoder = self.decoders.get(&kind).ok_or(LaneError::NoDecoder(kind))?;

        let _timer = self.metrics.decode_time_ms.as_ref().map(ScopedMetricTimer::new);
        let export = decoder.decode(id, bytes).map_err(|source| LaneError::Decode {
            id: id.clone(),
            source,
        })?;

        if let Some(counter) = &self.metrics.decoded_total {
            if let Err(e) = counter.increment() {
                log::warn!("Failed to count decoded resource: {e}");
            }
        }
        Ok(export)
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("kinds", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The lower-cased extension of a canonical identifier.
pub(crate) fn extension_of(id: &ResourceId) -> String {
    id.as_str()
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .unwrap_or_default()
}
