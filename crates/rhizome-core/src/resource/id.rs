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

use super::ResourceKind;
use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt};

/// The canonical, fully resolved identifier of a resource.
///
/// Canonical identifiers are `/`-separated, contain no `.` or `..` segments and
/// always end with an extension. They are the only key the resource graph uses;
/// nodes reference each other exclusively through them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wraps an already canonical string.
    ///
    /// No normalization happens here; use [`super::resolve`] for raw specifiers.
    pub fn new(canonical: impl Into<String>) -> Self {
        Self(canonical.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The result of resolving a raw specifier: a canonical id split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    id: ResourceId,
    directory: String,
    name: String,
    extension: String,
    kind: ResourceKind,
    implicit_extension: bool,
}

impl ResolvedId {
    pub(crate) fn new(
        directory: String,
        name: String,
        extension: String,
        kind: ResourceKind,
        implicit_extension: bool,
    ) -> Self {
        let id = if directory.is_empty() {
            format!("{name}.{extension}")
        } else {
            format!("{directory}/{name}.{extension}")
        };
        Self {
            id: ResourceId(id),
            directory,
            name,
            extension,
            kind,
            implicit_extension,
        }
    }

    /// The canonical identifier (`a/b/d.js`).
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Consumes the resolution, keeping only the canonical identifier.
    pub fn into_id(self) -> ResourceId {
        self.id
    }

    /// The directory part (`a/b`), empty for top-level resources.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// The file name without its extension (`d`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The extension, as written or the default module extension when appended.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The resolved path as the caller wrote it, without an appended default extension.
    pub fn stem_path(&self) -> &str {
        if self.implicit_extension {
            &self.id.0[..self.id.0.len() - self.extension.len() - 1]
        } else {
            &self.id.0
        }
    }

    /// The kind derived from the extension.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Whether the default module extension was appended during resolution.
    pub fn has_implicit_extension(&self) -> bool {
        self.implicit_extension
    }
}

impl fmt::Display for ResolvedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.kind)
    }
}
