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

use serde::{Deserialize, Serialize};
use std::fmt;

/// The extension appended to specifiers that carry none. Such specifiers are module-kind.
pub const DEFAULT_MODULE_EXTENSION: &str = "js";

/// The category of payload a resource identifier names.
///
/// The kind decides which loader path and which decoder handle a resource; it
/// is derived from the identifier's extension through [`EXTENSION_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Plain UTF-8 text.
    Text,
    /// A structured document (JSON, RON).
    StructuredData,
    /// An encoded image.
    Image,
    /// An encoded audio clip.
    Audio,
    /// An encoded video stream.
    Video,
    /// A stylesheet source.
    Stylesheet,
    /// Code that defines its own dependencies once executed.
    Module,
    /// An opaque binary payload with no dedicated decoder.
    Unsupported,
}

/// Maps lowercase extensions to resource kinds. Lookups scan it in order.
pub const EXTENSION_TABLE: &[(&str, ResourceKind)] = &[
    ("js", ResourceKind::Module),
    ("mjs", ResourceKind::Module),
    ("txt", ResourceKind::Text),
    ("md", ResourceKind::Text),
    ("csv", ResourceKind::Text),
    ("html", ResourceKind::Text),
    ("xml", ResourceKind::Text),
    ("glsl", ResourceKind::Text),
    ("wgsl", ResourceKind::Text),
    ("json", ResourceKind::StructuredData),
    ("ron", ResourceKind::StructuredData),
    ("png", ResourceKind::Image),
    ("jpg", ResourceKind::Image),
    ("jpeg", ResourceKind::Image),
    ("gif", ResourceKind::Image),
    ("bmp", ResourceKind::Image),
    ("webp", ResourceKind::Image),
    ("svg", ResourceKind::Image),
    ("wav", ResourceKind::Audio),
    ("mp3", ResourceKind::Audio),
    ("ogg", ResourceKind::Audio),
    ("flac", ResourceKind::Audio),
    ("mp4", ResourceKind::Video),
    ("webm", ResourceKind::Video),
    ("ogv", ResourceKind::Video),
    ("css", ResourceKind::Stylesheet),
    ("bin", ResourceKind::Unsupported),
    ("dat", ResourceKind::Unsupported),
    ("wasm", ResourceKind::Unsupported),
];

impl ResourceKind {
    /// Looks an extension up in [`EXTENSION_TABLE`], ignoring ASCII case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        EXTENSION_TABLE
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, kind)| *kind)
    }

    /// Returns the stable, lowercase name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Text => "text",
            ResourceKind::StructuredData => "structured_data",
            ResourceKind::Image => "image",
            ResourceKind::Audio => "audio",
            ResourceKind::Video => "video",
            ResourceKind::Stylesheet => "stylesheet",
            ResourceKind::Module => "module",
            ResourceKind::Unsupported => "unsupported",
        }
    }

    /// Whether resources of this kind go through the definition handshake.
    pub fn is_module(&self) -> bool {
        matches!(self, ResourceKind::Module)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
