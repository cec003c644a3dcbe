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
use rhizome_core::resource::{Export, ResourceId, ResourceKind, ResourceStatus};
use rhizome_core::{EngineConfig, ResourceError};
use rhizome_engine::{Completer, Loader, Outcome, RequestResult, ResourceEngine};
use rhizome_telemetry::{MetricId, MetricValue, MetricsRegistry};
use std::{cell::RefCell, rc::Rc};

// --- Test Setup: a loader that parks every completer until the test releases it ---
#[derive(Clone, Default)]
struct ManualLoader {
    loads: Rc<RefCell<Vec<(ResourceKind, String)>>>,
    parked: Rc<RefCell<Vec<Completer>>>,
}

impl Loader for ManualLoader {
    fn load(&mut self, kind: ResourceKind, id: &ResourceId, completer: Completer) {
        self.loads.borrow_mut().push((kind, id.to_string()));
        self.parked.borrow_mut().push(completer);
    }
}

impl ManualLoader {
    fn take(&self, id: &str) -> Completer {
        let mut parked = self.parked.borrow_mut();
        let index = parked
            .iter()
            .position(|c| c.id().as_str() == id)
            .unwrap_or_else(|| panic!("no parked load for '{id}'"));
        parked.remove(index)
    }

    fn load_count(&self, id: &str) -> usize {
        self.loads.borrow().iter().filter(|(_, l)| l == id).count()
    }

    fn ready_text(&self, id: &str) {
        self.take(id).ready(Export::new(format!("<{id}>")));
    }
}

type Fired = Rc<RefCell<Vec<RequestResult>>>;

fn recorder() -> (Fired, impl FnOnce(&mut ResourceEngine, RequestResult) + 'static) {
    let fired: Fired = Rc::default();
    let sink = fired.clone();
    (fired, move |_: &mut ResourceEngine, result: RequestResult| {
        sink.borrow_mut().push(result)
    })
}

fn text(export: &Export) -> &str {
    export.downcast_ref::<String>().map(String::as_str).unwrap()
}

fn engine_with(config: EngineConfig) -> (ResourceEngine, ManualLoader) {
    let loader = ManualLoader::default();
    (ResourceEngine::new(config, loader.clone()), loader)
}
// ---

#[test]
fn same_identifier_is_loaded_once() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());

    engine.import_resources(None, &["docs/readme.txt"], |_, _| {})?;
    engine.import_resources(Some("docs/index.html"), &["./readme.txt"], |_, _| {})?;
    engine.import_resources(None, &["docs/../docs/readme.txt"], |_, _| {})?;

    assert_eq!(engine.graph().len(), 1);
    assert_eq!(loader.load_count("docs/readme.txt"), 1);
    assert_eq!(engine.outstanding_requests(), 3);
    Ok(())
}

#[test]
fn status_only_moves_forward() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    engine.import_resources(None, &["a.txt", "b.txt"], |_, _| {})?;

    assert_eq!(engine.node("a.txt").unwrap().status(), ResourceStatus::Loading);

    loader.ready_text("a.txt");
    loader.take("b.txt").fail("disk on fire");
    engine.pump()?;

    assert_eq!(
        engine.node("a.txt").unwrap().status_history(),
        &[
            ResourceStatus::Pending,
            ResourceStatus::Loading,
            ResourceStatus::Ready
        ]
    );
    let b = engine.node("b.txt").unwrap();
    assert_eq!(
        b.status_history(),
        &[
            ResourceStatus::Pending,
            ResourceStatus::Loading,
            ResourceStatus::Failed
        ]
    );
    assert_eq!(b.failure_reason(), Some("disk on fire"));

    assert_eq!(
        engine.complete_node("a.txt", Outcome::Failed("late".into())),
        Err(ResourceError::DoubleCompletion { id: "a.txt".into() })
    );
    assert_eq!(engine.node("a.txt").unwrap().status(), ResourceStatus::Ready);
    Ok(())
}

#[test]
fn request_fires_once_in_any_completion_order() -> Result<()> {
    let orders = [
        ["a.txt", "b.txt", "c.txt"],
        ["c.txt", "a.txt", "b.txt"],
        ["b.txt", "c.txt", "a.txt"],
    ];
    for order in orders {
        let (mut engine, loader) = engine_with(EngineConfig::default());
        let (fired, callback) = recorder();
        engine.import_resources(None, &["a.txt", "b.txt", "c.txt"], callback)?;

        for (i, id) in order.iter().enumerate() {
            loader.ready_text(id);
            engine.pump()?;
            let expected = if i + 1 == order.len() { 1 } else { 0 };
            assert_eq!(fired.borrow().len(), expected, "order {order:?}, step {i}");
        }

        let fired = fired.borrow();
        let exports = fired[0].as_ref().unwrap();
        let names: Vec<&str> = exports.iter().map(text).collect();
        assert_eq!(names, vec!["<a.txt>", "<b.txt>", "<c.txt>"]);
        assert!(engine.is_idle());
    }
    Ok(())
}

#[test]
fn failure_short_circuits_and_never_refires() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    let (fired, callback) = recorder();
    engine.import_resources(None, &["a.txt", "b.txt", "c.txt"], callback)?;

    loader.take("b.txt").fail("404");
    engine.pump()?;
    assert_eq!(fired.borrow().len(), 1);
    assert_eq!(
        fired.borrow()[0].as_ref().err(),
        Some(&ResourceError::LoaderFailure {
            id: "b.txt".into(),
            reason: "404".into()
        })
    );

    loader.ready_text("a.txt");
    loader.ready_text("c.txt");
    engine.pump()?;
    assert_eq!(fired.borrow().len(), 1);
    Ok(())
}

#[test]
fn failed_node_stays_failed_for_later_requests() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    engine.import_resources(None, &["missing.txt"], |_, _| {})?;
    loader.take("missing.txt").fail("gone");
    engine.pump()?;

    let (fired, callback) = recorder();
    engine.import_resources(None, &["missing.txt"], callback)?;

    // Already terminal: fired during registration, with no new load.
    assert_eq!(fired.borrow().len(), 1);
    assert!(fired.borrow()[0].is_err());
    assert_eq!(loader.load_count("missing.txt"), 1);
    Ok(())
}

#[test]
fn empty_request_fires_on_next_pump_without_touching_the_graph() -> Result<()> {
    let (mut engine, _loader) = engine_with(EngineConfig::default());
    let (fired, callback) = recorder();
    let empty: [&str; 0] = [];

    engine.import_resources(Some("app.js"), &empty, callback)?;
    assert!(fired.borrow().is_empty());
    assert!(!engine.is_idle());

    assert_eq!(engine.pump()?, 1);
    assert_eq!(fired.borrow().len(), 1);
    assert!(fired.borrow()[0].as_ref().unwrap().is_empty());
    assert!(engine.graph().is_empty());
    Ok(())
}

#[test]
fn resolution_errors_are_synchronous() {
    let (mut engine, loader) = engine_with(EngineConfig::default());

    let err = engine
        .import_resources(None, &["ok.txt", "broken."], |_, _| {})
        .unwrap_err();
    assert!(matches!(err, ResourceError::InvalidIdentifier { .. }));

    let err = engine
        .import_resources(None, &["archive.zip"], |_, _| {})
        .unwrap_err();
    assert_eq!(
        err,
        ResourceError::UnsupportedKind {
            specifier: "archive.zip".into(),
            extension: "zip".into()
        }
    );

    assert!(engine.graph().is_empty());
    assert!(loader.loads.borrow().is_empty());
}

#[test]
fn relative_specifiers_resolve_against_the_base() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    engine.import_resources(Some("a/b/c.js"), &["./d", "../e.css"], |_, _| {})?;

    let loads = loader.loads.borrow();
    assert_eq!(
        *loads,
        vec![
            (ResourceKind::Module, "a/b/d.js".to_string()),
            (ResourceKind::Stylesheet, "a/e.css".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn module_is_ready_only_after_its_dependencies() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    let (fired, callback) = recorder();
    engine.import_resources(None, &["app/main"], callback)?;

    loader.take("app/main.js").module(|engine, token| {
        engine.define(token, &["./greeting.txt", "../shared/name"], |exports| {
            let greeting = exports[0].downcast_ref::<String>().cloned().unwrap_or_default();
            let name = exports[1].downcast_ref::<String>().cloned().unwrap_or_default();
            Ok(Export::new(format!("{greeting} {name}")))
        })?;
        Ok(())
    });
    engine.pump()?;

    let main = engine.node("app/main.js").unwrap();
    assert_eq!(main.status(), ResourceStatus::Loading);
    assert_eq!(
        main.dependency_ids(),
        &[
            ResourceId::from("app/greeting.txt"),
            ResourceId::from("shared/name.js")
        ]
    );
    assert_eq!(engine.node("shared/name.js").unwrap().dependent_count(), 1);
    assert!(engine.defining().is_none());

    loader.ready_text("app/greeting.txt");
    engine.pump()?;
    assert!(fired.borrow().is_empty());

    loader.take("shared/name.js").module(|engine, _token| {
        engine.define_module(&[] as &[&str], |_| Ok(Export::new(String::from("world"))))?;
        Ok(())
    });
    engine.pump()?;

    assert_eq!(engine.node("app/main.js").unwrap().status(), ResourceStatus::Ready);
    let fired = fired.borrow();
    assert_eq!(fired.len(), 1);
    assert_eq!(text(&fired[0].as_ref().unwrap()[0]), "<app/greeting.txt> world");
    Ok(())
}

#[test]
fn explicit_handshake_outside_the_loader() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    engine.import_resources(None, &["m", "other"], |_, _| {})?;

    let token = engine.begin_definition("m.js")?;
    assert_eq!(token.node().as_str(), "m.js");
    assert_eq!(engine.defining().map(ResourceId::as_str), Some("m.js"));

    assert_eq!(
        engine.begin_definition("other.js").unwrap_err(),
        ResourceError::DefinitionSlotBusy {
            occupant: "m.js".into()
        }
    );

    engine.define(token, &["./dep.txt"], |exports| Ok(exports[0].clone()))?;
    assert!(engine.defining().is_none());

    loader.ready_text("dep.txt");
    engine.pump()?;
    let m = engine.node("m.js").unwrap();
    assert_eq!(m.status(), ResourceStatus::Ready);
    assert_eq!(text(m.export().unwrap()), "<dep.txt>");

    // The loader's payload for `m.js` arrives after the explicit definition.
    loader.take("m.js").module(|_, _| Ok(()));
    assert_eq!(
        engine.pump(),
        Err(ResourceError::DoubleCompletion { id: "m.js".into() })
    );
    Ok(())
}

#[test]
fn define_without_an_active_definition() {
    let (mut engine, _loader) = engine_with(EngineConfig::default());
    assert_eq!(
        engine.define_module(&["./x"], |_| Ok(Export::unit())),
        Err(ResourceError::NoActiveDefinition)
    );
}

#[test]
fn definition_of_a_non_module_is_rejected() -> Result<()> {
    let (mut engine, _loader) = engine_with(EngineConfig::default());
    engine.import_resources(None, &["style.css"], |_, _| {})?;
    assert_eq!(
        engine.begin_definition("style.css").unwrap_err(),
        ResourceError::NotAModule {
            id: "style.css".into()
        }
    );
    assert_eq!(
        engine.begin_definition("nowhere.js").unwrap_err(),
        ResourceError::UnknownResource {
            id: "nowhere.js".into()
        }
    );
    Ok(())
}

#[test]
fn module_that_never_defines_itself_fails() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    let (fired, callback) = recorder();
    engine.import_resources(None, &["lazy"], callback)?;

    loader.take("lazy.js").module(|_, token| {
        drop(token);
        Ok(())
    });
    engine.pump()?;

    let lazy = engine.node("lazy.js").unwrap();
    assert_eq!(lazy.status(), ResourceStatus::Failed);
    assert_eq!(
        lazy.failure_reason(),
        Some(
            ResourceError::MissingDefinition {
                id: "lazy.js".into()
            }
            .to_string()
            .as_str()
        )
    );
    assert!(fired.borrow()[0].is_err());
    assert!(engine.defining().is_none());
    Ok(())
}

#[test]
fn failing_payload_and_failing_factory_fail_the_module() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    engine.import_resources(None, &["boom", "sour"], |_, _| {})?;

    loader
        .take("boom.js")
        .module(|_, _| Err(anyhow::anyhow!("payload exploded")));
    loader.take("sour.js").module(|engine, token| {
        engine.define(token, &[] as &[&str], |_| anyhow::bail!("factory refused"))?;
        Ok(())
    });
    engine.pump()?;

    assert_eq!(
        engine.node("boom.js").unwrap().failure_reason(),
        Some("payload exploded")
    );
    assert_eq!(
        engine.node("sour.js").unwrap().failure_reason(),
        Some("factory refused")
    );
    Ok(())
}

#[test]
fn dependency_failure_propagates_to_the_module() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    let (fired, callback) = recorder();
    engine.import_resources(None, &["app"], callback)?;

    loader.take("app.js").module(|engine, token| {
        engine.define(token, &["./data.json"], |exports| Ok(exports[0].clone()))?;
        Ok(())
    });
    engine.pump()?;
    loader.take("data.json").fail("malformed");
    engine.pump()?;

    assert_eq!(engine.node("app.js").unwrap().status(), ResourceStatus::Failed);
    assert!(matches!(
        fired.borrow()[0],
        Err(ResourceError::LoaderFailure { ref id, .. }) if id == "app.js"
    ));
    Ok(())
}

#[test]
fn late_outcome_after_module_payload_is_a_double_completion() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    engine.import_resources(None, &["m"], |_, _| {})?;

    loader.take("m.js").module(|engine, token| {
        engine.define(token, &["./d.txt"], |exports| Ok(exports[0].clone()))?;
        Ok(())
    });
    engine.pump()?;

    assert_eq!(
        engine.complete_node("m.js", Outcome::Failed("late".into())),
        Err(ResourceError::DoubleCompletion { id: "m.js".into() })
    );
    assert_eq!(
        engine.complete_node("m.js", Outcome::Ready(Export::unit())),
        Err(ResourceError::DoubleCompletion { id: "m.js".into() })
    );
    assert_eq!(
        engine.node("m.js").unwrap().status_history(),
        &[ResourceStatus::Pending, ResourceStatus::Loading]
    );

    loader.ready_text("d.txt");
    engine.pump()?;
    let m = engine.node("m.js").unwrap();
    assert_eq!(m.status(), ResourceStatus::Ready);
    assert_eq!(text(m.export().unwrap()), "<d.txt>");
    Ok(())
}

#[test]
fn module_payloads_wait_while_the_definition_slot_is_held() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    let (fired, callback) = recorder();
    engine.import_resources(None, &["a", "b"], callback)?;

    loader.take("a.js").module(|engine, token| {
        // Drains the payload for `b.js` while `a.js` still holds the slot.
        engine.pump()?;
        engine.define(token, &[] as &[&str], |_| Ok(Export::new(String::from("a"))))?;
        Ok(())
    });
    loader.take("b.js").module(|engine, token| {
        engine.define(token, &[] as &[&str], |_| Ok(Export::new(String::from("b"))))?;
        Ok(())
    });
    engine.pump()?;

    assert_eq!(engine.node("a.js").unwrap().status(), ResourceStatus::Ready);
    assert_eq!(engine.node("b.js").unwrap().status(), ResourceStatus::Ready);
    assert!(engine.take_diagnostics().is_empty());
    let fired = fired.borrow();
    assert_eq!(fired.len(), 1);
    let exports = fired[0].as_ref().unwrap();
    assert_eq!(text(&exports[0]), "a");
    assert_eq!(text(&exports[1]), "b");
    Ok(())
}

#[test]
fn parked_payload_runs_once_an_explicit_definition_ends() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    engine.import_resources(None, &["m", "n"], |_, _| {})?;

    let token = engine.begin_definition("m.js")?;
    loader.take("n.js").module(|engine, token| {
        engine.define(token, &[] as &[&str], |_| Ok(Export::new(String::from("n"))))?;
        Ok(())
    });
    engine.pump()?;
    assert_eq!(engine.parked_modules(), 1);
    assert_eq!(engine.node("n.js").unwrap().status(), ResourceStatus::Loading);
    assert!(!engine.is_idle());

    engine.define(token, &[] as &[&str], |_| Ok(Export::unit()))?;
    engine.pump()?;
    assert_eq!(engine.parked_modules(), 0);
    let n = engine.node("n.js").unwrap();
    assert_eq!(n.status(), ResourceStatus::Ready);
    assert_eq!(text(n.export().unwrap()), "n");
    Ok(())
}

#[test]
fn cycle_is_reported_as_a_diagnostic() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default().with_cyclic_check(true));
    engine.import_resources(None, &["a"], |_, _| {})?;

    for (module, dependency) in [("a.js", "./b"), ("b.js", "./c"), ("c.js", "./a")] {
        loader.take(module).module(move |engine, token| {
            engine.define(token, &[dependency], |exports| Ok(exports[0].clone()))?;
            Ok(())
        });
        engine.pump()?;
    }

    assert_eq!(
        engine.take_diagnostics(),
        vec![ResourceError::CyclicDependency {
            unresolved_edges: 3
        }]
    );
    assert_eq!(
        engine.check_cycles(),
        Err(ResourceError::CyclicDependency {
            unresolved_edges: 3
        })
    );
    // Detection only: the nodes stay where they were.
    assert_eq!(engine.node("a.js").unwrap().status(), ResourceStatus::Loading);
    Ok(())
}

#[test]
fn unchanged_cycle_is_reported_once() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default().with_cyclic_check(true));
    engine.import_resources(None, &["a", "x.txt", "y.txt"], |_, _| {})?;

    for (module, dependency) in [("a.js", "./b"), ("b.js", "./c"), ("c.js", "./a")] {
        loader.take(module).module(move |engine, token| {
            engine.define(token, &[dependency], |exports| Ok(exports[0].clone()))?;
            Ok(())
        });
        engine.pump()?;
    }
    // Unrelated loads keep triggering scans while the cycle stays put.
    loader.ready_text("x.txt");
    engine.pump()?;
    loader.ready_text("y.txt");
    engine.pump()?;

    assert_eq!(
        engine.take_diagnostics(),
        vec![ResourceError::CyclicDependency {
            unresolved_edges: 3
        }]
    );
    Ok(())
}

#[test]
fn chain_without_cycle_reports_nothing() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default().with_cyclic_check(true));
    let (fired, callback) = recorder();
    engine.import_resources(None, &["a"], callback)?;

    for (module, dependency) in [("a.js", "./b"), ("b.js", "./c")] {
        loader.take(module).module(move |engine, token| {
            engine.define(token, &[dependency], |exports| Ok(exports[0].clone()))?;
            Ok(())
        });
        engine.pump()?;
    }
    loader.take("c.js").module(|engine, token| {
        engine.define(token, &[] as &[&str], |_| Ok(Export::new(String::from("leaf"))))?;
        Ok(())
    });
    engine.pump()?;

    assert!(engine.diagnostics().is_empty());
    assert!(engine.check_cycles().is_ok());
    assert_eq!(text(&fired.borrow()[0].as_ref().unwrap()[0]), "leaf");
    Ok(())
}

#[test]
fn callbacks_may_reenter_the_engine() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    let (fired, inner) = recorder();

    engine.import_resources(None, &["first.txt"], move |engine, result| {
        assert!(result.is_ok());
        engine
            .import_resources(None, &["first.txt", "second.txt"], inner)
            .unwrap();
    })?;

    loader.ready_text("first.txt");
    engine.pump()?;
    assert!(fired.borrow().is_empty());
    assert_eq!(loader.load_count("second.txt"), 1);
    assert_eq!(loader.load_count("first.txt"), 1);

    loader.ready_text("second.txt");
    engine.pump()?;
    assert_eq!(fired.borrow().len(), 1);
    Ok(())
}

#[test]
fn overlapping_requests_share_exports() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    let (first, first_cb) = recorder();
    let (second, second_cb) = recorder();
    engine.import_resources(None, &["shared.txt"], first_cb)?;
    engine.import_resources(None, &["shared.txt", "extra.txt"], second_cb)?;

    loader.ready_text("shared.txt");
    engine.pump()?;
    assert_eq!(first.borrow().len(), 1);
    assert!(second.borrow().is_empty());

    loader.ready_text("extra.txt");
    engine.pump()?;
    let (first, second) = (first.borrow(), second.borrow());
    let a = &first[0].as_ref().unwrap()[0];
    let b = &second[0].as_ref().unwrap()[0];
    assert!(a.ptr_eq(b));
    Ok(())
}

#[test]
fn loader_may_complete_synchronously() -> Result<()> {
    let loader = |_kind: ResourceKind, id: &ResourceId, completer: Completer| {
        completer.ready(Export::new(id.to_string()));
    };
    let mut engine = ResourceEngine::new(EngineConfig::default(), loader);
    let (fired, callback) = recorder();
    engine.import_resources(None, &["now.txt"], callback)?;

    // Applied on the engine's turn, never inside `import_resources`.
    assert!(fired.borrow().is_empty());
    engine.pump()?;
    assert_eq!(fired.borrow().len(), 1);
    Ok(())
}

#[test]
fn completions_from_worker_threads_are_applied_by_pump() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    let (fired, callback) = recorder();
    engine.import_resources(None, &["remote.txt"], callback)?;

    let completer = loader.take("remote.txt");
    std::thread::spawn(move || completer.ready(Export::new(String::from("from a thread"))))
        .join()
        .unwrap();

    engine.pump()?;
    assert_eq!(text(&fired.borrow()[0].as_ref().unwrap()[0]), "from a thread");
    Ok(())
}

#[test]
fn prefetch_hints_follow_module_inspection() -> Result<()> {
    for inspection in [false, true] {
        let (mut engine, loader) =
            engine_with(EngineConfig::default().with_module_inspection(inspection));
        engine.import_resources(None, &["lib/app"], |_, _| {})?;

        let completer = loader.take("lib/app.js");
        completer.prefetch(vec!["./util".into(), "bad.".into()]);
        engine.pump()?;

        assert_eq!(loader.load_count("lib/util.js"), usize::from(inspection));
        // The hint never settles the module.
        assert_eq!(
            engine.node("lib/app.js").unwrap().status(),
            ResourceStatus::Loading
        );
        drop(completer);
    }
    Ok(())
}

#[test]
fn value_delivered_for_a_module_fails_it() -> Result<()> {
    let (mut engine, loader) = engine_with(EngineConfig::default());
    engine.import_resources(None, &["plain", "notes.txt"], |_, _| {})?;

    loader.take("plain.js").ready(Export::unit());
    loader.take("notes.txt").module(|_, _| Ok(()));
    engine.pump()?;

    assert_eq!(engine.node("plain.js").unwrap().status(), ResourceStatus::Failed);
    assert_eq!(engine.node("notes.txt").unwrap().status(), ResourceStatus::Failed);
    Ok(())
}

#[test]
fn engine_publishes_metrics() -> Result<()> {
    let registry = MetricsRegistry::new();
    let loader = ManualLoader::default();
    let mut engine = ResourceEngine::with_metrics(
        EngineConfig::default(),
        loader.clone(),
        &registry,
    );
    engine.import_resources(None, &["a.txt", "b.txt"], |_, _| {})?;
    loader.ready_text("a.txt");
    loader.take("b.txt").fail("nope");
    engine.pump()?;

    let counter = |name: &str| match registry
        .get_metric(&MetricId::new("resources", name))
        .map(|m| m.value)
    {
        Ok(MetricValue::Counter(value)) => value,
        other => panic!("unexpected metric {other:?}"),
    };
    assert_eq!(counter("nodes_created"), 2);
    assert_eq!(counter("nodes_ready"), 1);
    assert_eq!(counter("nodes_failed"), 1);
    assert_eq!(counter("requests_registered"), 1);
    assert_eq!(counter("requests_fired"), 1);

    let stats = engine.stats();
    assert_eq!(stats.nodes, 2);
    assert_eq!(stats.ready, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.outstanding_requests, 0);
    Ok(())
}
