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

//! Imports resources from a directory (or a pack built by `cargo xtask pack`)
//! and prints what each one exported.

use anyhow::{Context, Result};
use clap::Parser;
use rhizome_core::resource::Export;
use rhizome_core::EngineConfig;
use rhizome_engine::{RequestResult, ResourceEngine};
use rhizome_lanes::decode::{Blob, DecoderRegistry, Stylesheet};
use rhizome_lanes::module::{ModuleExports, NativeModule, NativeModuleRegistry};
use rhizome_lanes::transport::{DirectoryTransport, PackTransport, Transport};
use rhizome_lanes::StandardLoader;
use rhizome_telemetry::{MetricValue, MetricsRegistry};
use std::{cell::RefCell, path::PathBuf, rc::Rc};

#[derive(Parser, Debug)]
#[command(name = "sandbox", about = "Loads resources through the Rhizome engine")]
struct Args {
    /// Directory served as the resource root.
    #[arg(long, default_value = "resources")]
    root: PathBuf,

    /// Read from a pack directory (index.bin + data.pack) instead of --root.
    #[arg(long)]
    pack: Option<PathBuf>,

    /// Engine configuration file. Defaults apply when it does not exist.
    #[arg(long, default_value = "Rhizome.toml")]
    config: PathBuf,

    /// Specifiers to import, resolved from the root.
    #[arg(default_value = "main")]
    specifiers: Vec<String>,
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = EngineConfig::load_or_default(&args.config)?;

    match &args.pack {
        Some(pack) => {
            let transport = PackTransport::open(pack)
                .with_context(|| format!("Failed to open pack at {}", pack.display()))?;
            run(transport, config, &args.specifiers)
        }
        None => run(DirectoryTransport::new(&args.root), config, &args.specifiers),
    }
}

fn native_modules() -> Result<NativeModuleRegistry> {
    let mut natives = NativeModuleRegistry::new();
    natives.register(
        "sandbox/version",
        NativeModule::new(Vec::new(), |_| {
            Ok(Export::new(env!("CARGO_PKG_VERSION").to_string()))
        }),
    )?;
    Ok(natives)
}

fn run<T: Transport + 'static>(
    transport: T,
    config: EngineConfig,
    specifiers: &[String],
) -> Result<()> {
    let metrics = MetricsRegistry::new();
    let loader = StandardLoader::new(transport)
        .with_decoders(DecoderRegistry::with_defaults().with_metrics(&metrics))
        .with_native_modules(native_modules()?)
        .configured(&config);
    let mut engine = ResourceEngine::with_metrics(config, loader, &metrics);

    let outcome: Rc<RefCell<Option<RequestResult>>> = Rc::default();
    let sink = outcome.clone();
    let request = engine.import_resources(None, specifiers, move |_, result| {
        *sink.borrow_mut() = Some(result);
    })?;
    let handled = engine.pump()?;
    log::info!("Handled {handled} engine events.");

    for diagnostic in engine.take_diagnostics() {
        log::warn!("{diagnostic}");
    }

    match outcome.take() {
        Some(Ok(exports)) => {
            for (specifier, export) in specifiers.iter().zip(&exports) {
                println!("{specifier}: {}", describe(export));
            }
        }
        Some(Err(e)) => return Err(e).context("Import failed"),
        None => {
            let waiting = engine.waiting_on(request).unwrap_or_default();
            log::warn!("Request {request} is still waiting on {waiting:?}.");
        }
    }

    let stats = engine.stats();
    log::info!(
        "{} resources ({} ready, {} failed, {} loading), {} dependency edges.",
        stats.nodes,
        stats.ready,
        stats.failed,
        stats.loading,
        stats.edges
    );
    for metric in metrics.namespace_metrics("loaders") {
        if let MetricValue::Histogram { samples, .. } = &metric.value {
            let total: f64 = samples.iter().sum();
            log::debug!("{}: {} samples, {total:.3} {}", metric.id, samples.len(), metric.unit);
        }
    }
    Ok(())
}

fn describe(export: &Export) -> String {
    if let Some(text) = export.downcast_ref::<String>() {
        format!("text ({} chars) {text:?}", text.chars().count())
    } else if let Some(value) = export.downcast_ref::<serde_json::Value>() {
        format!("data {value}")
    } else if let Some(sheet) = export.downcast_ref::<Stylesheet>() {
        format!("stylesheet {:?}", sheet.selectors())
    } else if let Some(blob) = export.downcast_ref::<Blob>() {
        format!("{} .{} ({} bytes)", blob.kind, blob.extension, blob.bytes.len())
    } else if let Some(module) = export.downcast_ref::<ModuleExports>() {
        let dependencies: Vec<String> = module.dependencies.iter().map(describe).collect();
        format!("module {} <- [{}]", module.value, dependencies.join(", "))
    } else {
        String::from("<opaque>")
    }
}
