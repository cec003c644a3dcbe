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
use rhizome_core::resource::{Export, ResourceKind, ResourceStatus};
use rhizome_core::{EngineConfig, ResourceError};
use rhizome_engine::{RequestResult, ResourceEngine};
use rhizome_lanes::decode::{Blob, Stylesheet};
use rhizome_lanes::module::{ModuleExports, NativeModule, NativeModuleRegistry};
use rhizome_lanes::transport::{DirectoryTransport, PackEntry, PackIndex, PackTransport};
use rhizome_lanes::StandardLoader;
use serde_json::json;
use std::{cell::RefCell, path::Path, rc::Rc};
use tempfile::tempdir;

// --- Test Setup: a small resource tree on disk ---
fn write(root: &Path, id: &str, contents: &[u8]) -> Result<()> {
    let path = root.join(id);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

fn sample_tree(root: &Path) -> Result<()> {
    write(
        root,
        "app/main.js",
        br#"{ "requires": ["./config.json", "../shared/banner"], "exports": { "name": "demo" } }"#,
    )?;
    write(root, "app/config.json", br#"{ "fullscreen": true }"#)?;
    write(
        root,
        "shared/banner.js",
        br#"{ "requires": ["./banner.txt", "./theme.css"], "exports": "banner" }"#,
    )?;
    write(root, "shared/banner.txt", b"Welcome!")?;
    write(root, "shared/theme.css", b"h1 { color: teal }")?;
    write(root, "img/logo.png", &[0x89, b'P', b'N', b'G'])?;
    Ok(())
}

type Slot = Rc<RefCell<Option<RequestResult>>>;

fn import(engine: &mut ResourceEngine, specifiers: &[&str]) -> Result<Slot> {
    let slot = Rc::new(RefCell::new(None));
    let sink = slot.clone();
    engine.import_resources(None, specifiers, move |_, result| {
        *sink.borrow_mut() = Some(result);
    })?;
    engine.pump()?;
    Ok(slot)
}

fn exports_of(slot: &Slot) -> Vec<Export> {
    match slot.borrow().as_ref() {
        Some(Ok(exports)) => exports.clone(),
        other => panic!("request did not succeed: {other:?}"),
    }
}
// ---

#[test]
fn declarative_modules_load_their_dependency_tree() -> Result<()> {
    let dir = tempdir()?;
    sample_tree(dir.path())?;

    let loader = StandardLoader::new(DirectoryTransport::new(dir.path()));
    let mut engine = ResourceEngine::new(EngineConfig::default().with_cyclic_check(true), loader);
    let slot = import(&mut engine, &["app/main", "img/logo.png"])?;

    let exports = exports_of(&slot);
    let main = exports[0].downcast_ref::<ModuleExports>().unwrap();
    assert_eq!(main.value, json!({ "name": "demo" }));
    assert_eq!(
        main.dependencies[0].downcast_ref::<serde_json::Value>(),
        Some(&json!({ "fullscreen": true }))
    );

    let banner = main.dependencies[1].downcast_ref::<ModuleExports>().unwrap();
    assert_eq!(banner.value, json!("banner"));
    assert_eq!(
        banner.dependencies[0].downcast_ref::<String>().map(String::as_str),
        Some("Welcome!")
    );
    let theme = banner.dependencies[1].downcast_ref::<Stylesheet>().unwrap();
    assert_eq!(theme.selectors(), vec!["h1"]);

    let logo = exports[1].downcast_ref::<Blob>().unwrap();
    assert_eq!(logo.kind, ResourceKind::Image);
    assert_eq!(logo.bytes.len(), 4);

    assert!(engine.diagnostics().is_empty());
    assert!(engine.is_idle());
    assert_eq!(engine.stats().edges, 4);
    Ok(())
}

#[test]
fn missing_file_fails_only_its_requests() -> Result<()> {
    let dir = tempdir()?;
    sample_tree(dir.path())?;
    let loader = StandardLoader::new(DirectoryTransport::new(dir.path()));
    let mut engine = ResourceEngine::new(EngineConfig::default(), loader);

    let broken = import(&mut engine, &["app/config.json", "app/absent.txt"])?;
    let fine = import(&mut engine, &["app/config.json"])?;

    assert!(matches!(
        broken.borrow().as_ref(),
        Some(Err(ResourceError::LoaderFailure { id, .. })) if id == "app/absent.txt"
    ));
    assert_eq!(exports_of(&fine).len(), 1);
    assert_eq!(
        engine.node("app/absent.txt").unwrap().status(),
        ResourceStatus::Failed
    );
    Ok(())
}

#[test]
fn malformed_module_file_fails_the_module() -> Result<()> {
    let dir = tempdir()?;
    write(dir.path(), "broken.js", b"function () {}")?;
    let loader = StandardLoader::new(DirectoryTransport::new(dir.path()));
    let mut engine = ResourceEngine::new(EngineConfig::default(), loader);

    let slot = import(&mut engine, &["broken"])?;
    assert!(slot.borrow().as_ref().unwrap().is_err());
    let reason = engine.node("broken.js").unwrap().failure_reason().unwrap();
    assert!(reason.contains("not a valid module file"), "{reason}");
    Ok(())
}

#[test]
fn native_modules_take_precedence_over_files() -> Result<()> {
    let dir = tempdir()?;
    sample_tree(dir.path())?;

    let mut natives = NativeModuleRegistry::new();
    natives.register(
        "app/main",
        NativeModule::new(vec!["../shared/banner.txt".into()], |exports| {
            let banner = exports[0]
                .downcast_ref::<String>()
                .cloned()
                .unwrap_or_default();
            Ok(Export::new(banner.to_uppercase()))
        }),
    )?;

    let loader =
        StandardLoader::new(DirectoryTransport::new(dir.path())).with_native_modules(natives);
    let mut engine = ResourceEngine::new(EngineConfig::default(), loader);
    let slot = import(&mut engine, &["app/main"])?;

    let exports = exports_of(&slot);
    assert_eq!(
        exports[0].downcast_ref::<String>().map(String::as_str),
        Some("WELCOME!")
    );
    // The file's own dependencies were never requested.
    assert!(engine.node("app/config.json").is_none());
    Ok(())
}

#[test]
fn module_inspection_prefetches_dependencies() -> Result<()> {
    let dir = tempdir()?;
    sample_tree(dir.path())?;
    let config = EngineConfig::default().with_module_inspection(true);
    let loader = StandardLoader::new(DirectoryTransport::new(dir.path())).configured(&config);
    let mut engine = ResourceEngine::new(config, loader);

    let slot = import(&mut engine, &["app/main"])?;
    let main = exports_of(&slot)[0].clone();
    assert!(main.is::<ModuleExports>());
    assert_eq!(engine.graph().len(), 5);
    Ok(())
}

#[test]
fn packed_resources_load_through_the_pack_transport() -> Result<()> {
    let dir = tempdir()?;
    let module = br#"{ "requires": ["./strings/hello.txt"], "exports": null }"#.to_vec();
    let text = b"hello from the pack".to_vec();

    let entries = vec![
        PackEntry {
            id: "game/init.js".into(),
            kind: ResourceKind::Module,
            offset: 0,
            size: module.len() as u64,
        },
        PackEntry {
            id: "game/strings/hello.txt".into(),
            kind: ResourceKind::Text,
            offset: module.len() as u64,
            size: text.len() as u64,
        },
    ];
    std::fs::write(dir.path().join("index.bin"), PackIndex::encode(&entries)?)?;
    std::fs::write(dir.path().join("data.pack"), [module, text].concat())?;

    let loader = StandardLoader::new(PackTransport::open(dir.path())?);
    let mut engine = ResourceEngine::new(EngineConfig::default(), loader);
    let slot = import(&mut engine, &["game/init"])?;

    let exports = exports_of(&slot);
    let init = exports[0].downcast_ref::<ModuleExports>().unwrap();
    assert_eq!(init.value, serde_json::Value::Null);
    assert_eq!(
        init.dependencies[0].downcast_ref::<String>().map(String::as_str),
        Some("hello from the pack")
    );
    Ok(())
}
