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

use super::{extension_of, Decoder};
use crate::error::DecodeError;
use rhizome_core::resource::{Export, ResourceId};

/// Decodes structured data into a `serde_json::Value`.
///
/// The format follows the identifier's extension: `json` or `ron`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredDataDecoder;

impl Decoder for StructuredDataDecoder {
    fn decode(&self, id: &ResourceId, bytes: &[u8]) -> Result<Export, DecodeError> {
        let value: serde_json::Value = match extension_of(id).as_str() {
            "json" => serde_json::from_slice(bytes)?,
            "ron" => ron::from_str(std::str::from_utf8(bytes)?)?,
            other => return Err(format!("no structured-data format for '.{other}'").into()),
        };
        Ok(Export::new(value))
    }
}
