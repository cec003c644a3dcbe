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

use crate::commands::manifest::ResourceManifest;
use crate::console::{note, report, section, Tone};
use anyhow::{Context, Result};
use rhizome_core::resource::{resolve, ResourceId, ResourceKind};
use rhizome_lanes::transport::{PackEntry, PackIndex, DATA_FILE_NAME, INDEX_FILE_NAME};
use std::collections::btree_map::{BTreeMap, Entry};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// A file that will be written into the pack under `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackSource {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub path: PathBuf,
}

pub fn pack(manifest_path: &Path) -> Result<()> {
    section("Packing Resources", "📦", Tone::Pack);

    let (manifest, found) = ResourceManifest::load(manifest_path)?;
    if found {
        note(&format!("Found '{}'. Loading configuration.", manifest_path.display()));
    } else {
        note(&format!(
            "No '{}' found. Using default configuration.",
            manifest_path.display()
        ));
    }

    let roots: Vec<PathBuf> = manifest
        .source_directories
        .into_iter()
        .filter(|dir| dir.is_dir())
        .collect();
    if roots.is_empty() {
        report(Tone::Fail, "No valid source directories found. Nothing to pack.");
        return Ok(());
    }

    let sources = collect_sources(&roots);
    if sources.is_empty() {
        report(Tone::Ok, "No resource files found to pack.");
        return Ok(());
    }
    note(&format!("{} resources to pack.", sources.len()));

    write_pack(&sources, &manifest.output_directory)?;
    report(Tone::Ok, "Resource pack finished successfully.");
    Ok(())
}

/// Walks every root and maps each packable file to its canonical identifier.
///
/// Files whose relative path does not resolve to itself (no extension, an
/// unknown extension, a malformed name) cannot be addressed by the engine and
/// are skipped. When two roots hold the same identifier the first root wins.
pub fn collect_sources(roots: &[PathBuf]) -> Vec<PackSource> {
    let mut sources = BTreeMap::new();

    for root in roots {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report(Tone::Warn, &format!("Skipping unreadable entry: {e}"));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            let Some(relative) = relative_specifier(root, &path) else {
                report(Tone::Warn, &format!("Skipping '{}': not a UTF-8 path.", path.display()));
                continue;
            };

            let resolved = match resolve(None, &relative) {
                Ok(resolved) if !resolved.has_implicit_extension() => resolved,
                Ok(_) => {
                    report(Tone::Warn, &format!("Skipping '{relative}': no extension."));
                    continue;
                }
                Err(e) => {
                    report(Tone::Warn, &format!("Skipping '{relative}': {e}"));
                    continue;
                }
            };

            let kind = resolved.kind();
            match sources.entry(resolved.into_id()) {
                Entry::Vacant(slot) => {
                    let id = slot.key().clone();
                    slot.insert(PackSource { id, kind, path });
                }
                Entry::Occupied(slot) => report(Tone::Warn, &format!(
                    "Skipping '{}': '{}' is already packed from '{}'.",
                    path.display(),
                    slot.key(),
                    slot.get().path.display()
                )),
            }
        }
    }

    sources.into_values().collect()
}

/// Path of `path` below `root`, joined with `/`.
fn relative_specifier(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments = relative
        .components()
        .map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(segments.join("/"))
}

/// Writes `data.pack` and `index.bin` into `dest_dir` and returns the entries.
pub fn write_pack(sources: &[PackSource], dest_dir: &Path) -> Result<Vec<PackEntry>> {
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create '{}'", dest_dir.display()))?;
    let index_path = dest_dir.join(INDEX_FILE_NAME);
    let data_path = dest_dir.join(DATA_FILE_NAME);

    let mut data_file = File::create(&data_path)
        .with_context(|| format!("Failed to create data pack at '{}'", data_path.display()))?;

    let mut entries = Vec::with_capacity(sources.len());
    let mut offset = 0;
    for source in sources {
        let bytes = fs::read(&source.path)
            .with_context(|| format!("Failed to read '{}'", source.path.display()))?;
        data_file.write_all(&bytes)?;

        let size = bytes.len() as u64;
        entries.push(PackEntry {
            id: source.id.clone(),
            kind: source.kind,
            offset,
            size,
        });
        offset += size;
    }

    let encoded_index = PackIndex::encode(&entries).context("Failed to serialize pack index")?;
    fs::write(&index_path, &encoded_index)
        .with_context(|| format!("Failed to write index file to '{}'", index_path.display()))?;

    report(
        Tone::Ok,
        &format!(
            "Wrote {} entries to '{}' ({:.2} KB)",
            entries.len(),
            index_path.display(),
            encoded_index.len() as f64 / 1024.0
        ),
    );
    report(
        Tone::Ok,
        &format!(
            "Wrote resource data to '{}' ({:.2} KB)",
            data_path.display(),
            offset as f64 / 1024.0
        ),
    );

    Ok(entries)
}

/// Prints the entries of the pack in `directory`, sorted by identifier.
pub fn inspect(directory: &Path) -> Result<()> {
    section("Inspecting Pack", "🔍", Tone::Plain);

    let index_path = directory.join(INDEX_FILE_NAME);
    let bytes = fs::read(&index_path)
        .with_context(|| format!("Failed to read '{}'", index_path.display()))?;
    let index = PackIndex::from_bytes(&bytes)
        .with_context(|| format!("Failed to decode '{}'", index_path.display()))?;

    let mut entries: Vec<&PackEntry> = index.entries().collect();
    entries.sort_by(|a, b| a.id.cmp(&b.id));
    for entry in entries {
        println!(
            "  {:<40} {:<16} @{:<8} {} bytes",
            entry.id.as_str(),
            entry.kind.name(),
            entry.offset,
            entry.size
        );
    }
    report(Tone::Ok, &format!("{} entries in '{}'.", index.len(), index_path.display()));
    Ok(())
}
