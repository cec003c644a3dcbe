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

//! Turns raw specifiers into canonical resource identifiers.

use super::{ResolvedId, ResourceKind, DEFAULT_MODULE_EXTENSION};
use crate::error::{ResourceError, ResourceResult};

/// The separator used by every identifier.
pub const PATH_SEPARATOR: char = '/';

/// Resolves `raw` against an optional `base` identifier.
///
/// A specifier whose first segment is `.` or `..` is relative to the directory of
/// `base` when one is given; anything else is treated as already absolute. While
/// accumulating segments, `.` and empty segments are dropped and `..` pops the last
/// accumulated segment. Popping an empty accumulator is a no-op.
///
/// A final segment without a recognizable extension gets
/// [`DEFAULT_MODULE_EXTENSION`] appended and resolves to a module.
///
/// # Errors
/// - [`ResourceError::InvalidIdentifier`] when nothing is left after normalization
///   or the final segment cannot be split into a name and an extension.
/// - [`ResourceError::UnsupportedKind`] when the extension is not in the kind table.
///
/// # Examples
///
/// ```
/// use rhizome_core::resource::{resolve, ResourceKind};
///
/// let resolved = resolve(Some("a/b/c.js"), "../d").unwrap();
/// assert_eq!(resolved.stem_path(), "a/d");
/// assert_eq!(resolved.id().as_str(), "a/d.js");
/// assert_eq!(resolved.kind(), ResourceKind::Module);
/// ```
pub fn resolve(base: Option<&str>, raw: &str) -> ResourceResult<ResolvedId> {
    let mut raw_segments = raw.split(PATH_SEPARATOR).peekable();
    let is_relative = matches!(raw_segments.peek(), Some(&".") | Some(&".."));

    let mut segments: Vec<&str> = Vec::new();
    if let (true, Some(base)) = (is_relative, base) {
        segments.extend(base.split(PATH_SEPARATOR).filter(|s| !s.is_empty()));
        // Keep the directory of the base only.
        segments.pop();
    }

    for segment in raw_segments {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let Some(file) = segments.pop() else {
        return Err(ResourceError::invalid(raw, "resolves to an empty path"));
    };
    let directory = segments.join("/");

    match split_extension(file) {
        FileName::Bare => Ok(ResolvedId::new(
            directory,
            file.to_string(),
            DEFAULT_MODULE_EXTENSION.to_string(),
            ResourceKind::Module,
            true,
        )),
        FileName::Split(name, extension) => {
            let kind = ResourceKind::from_extension(extension).ok_or_else(|| {
                ResourceError::UnsupportedKind {
                    specifier: raw.to_string(),
                    extension: extension.to_string(),
                }
            })?;
            Ok(ResolvedId::new(
                directory,
                name.to_string(),
                extension.to_string(),
                kind,
                false,
            ))
        }
        FileName::Malformed(reason) => Err(ResourceError::invalid(raw, reason)),
    }
}

enum FileName<'a> {
    Bare,
    Split(&'a str, &'a str),
    Malformed(&'static str),
}

/// An extension is recognizable when it is ASCII alphanumeric with at least one letter,
/// so `v1.2` stays a bare module name.
fn split_extension(file: &str) -> FileName<'_> {
    let Some(dot) = file.rfind('.') else {
        return FileName::Bare;
    };
    let (name, extension) = (&file[..dot], &file[dot + 1..]);

    if extension.is_empty() {
        return FileName::Malformed("the file name ends with a dot");
    }
    let recognizable = extension.chars().all(|c| c.is_ascii_alphanumeric())
        && extension.chars().any(|c| c.is_ascii_alphabetic());
    if !recognizable {
        return FileName::Bare;
    }
    if name.is_empty() {
        return FileName::Malformed("the file name has an extension but no name");
    }
    FileName::Split(name, extension)
}
