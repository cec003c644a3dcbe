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

use super::Decoder;
use crate::error::DecodeError;
use rhizome_core::resource::{Export, ResourceId};

/// Decodes UTF-8 text into a `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl Decoder for TextDecoder {
    fn decode(&self, _id: &ResourceId, bytes: &[u8]) -> Result<Export, DecodeError> {
        let text = String::from_utf8(bytes.to_vec())?;
        Ok(Export::new(text))
    }
}

/// A stylesheet, kept as source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    /// The stylesheet source.
    pub source: String,
}

impl Stylesheet {
    /// The selector of every top-level rule, in source order. Comments are skipped.
    pub fn selectors(&self) -> Vec<&str> {
        let source = self.source.as_str();
        let bytes = source.as_bytes();
        let mut selectors = Vec::new();
        let (mut depth, mut start, mut i) = (0usize, 0usize, 0usize);

        while i < bytes.len() {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let end = source[i + 2..]
                        .find("*/")
                        .map_or(bytes.len(), |e| i + 2 + e + 2);
                    if depth == 0 {
                        start = end;
                    }
                    i = end;
                    continue;
                }
                b'{' => {
                    if depth == 0 {
                        let selector = source[start..i].trim();
                        if !selector.is_empty() {
                            selectors.push(selector);
                        }
                    }
                    depth += 1;
                }
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        start = i + 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        selectors
    }
}

/// Decodes UTF-8 stylesheet source into a [`Stylesheet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesheetDecoder;

impl Decoder for StylesheetDecoder {
    fn decode(&self, _id: &ResourceId, bytes: &[u8]) -> Result<Export, DecodeError> {
        let source = String::from_utf8(bytes.to_vec())?;
        Ok(Export::new(Stylesheet { source }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_must_be_utf8() {
        let id = ResourceId::from("a.txt");
        let export = TextDecoder.decode(&id, "héllo".as_bytes()).unwrap();
        assert_eq!(export.downcast_ref::<String>().unwrap(), "héllo");
        assert!(TextDecoder.decode(&id, &[0xc3, 0x28]).is_err());
    }

    #[test]
    fn stylesheet_lists_top_level_selectors() {
        let sheet = Stylesheet {
            source: "/* theme */ body { margin: 0 }\n@media print { p { color: black } }\n.a, .b{}"
                .into(),
        };
        assert_eq!(sheet.selectors(), vec!["body", "@media print", ".a, .b"]);
    }
}
