//! End-to-end import runs against scripted providers.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use strata_core::{AbsProviderConfig, AbsResourceInstance, InstanceKey, ModuleInstance};
use strata_engine::WalkerConfig;
use strata_import::{ImportConfig, ImportError, ImportTarget, Importer};
use strata_provider::testing::MockProvider;
use strata_provider::{ProviderRegistry, ResourceProvider};
use strata_state::{InstanceState, ResourceState, State, StateStore};

fn widget(id: &str) -> InstanceState {
    InstanceState::new(id).with_type("widget")
}

fn addr(s: &str) -> AbsResourceInstance {
    s.parse().unwrap()
}

struct Harness {
    importer: Importer,
    provider: Arc<MockProvider>,
}

fn harness(provider: MockProvider, state: State) -> Harness {
    let _ = strata_log::try_init();
    let provider = Arc::new(provider);
    let registry = Arc::new(ProviderRegistry::new());
    registry.register(
        AbsProviderConfig::root("r"),
        Arc::clone(&provider) as Arc<dyn ResourceProvider>,
    );
    Harness {
        importer: Importer::new(WalkerConfig::default(), registry, StateStore::from_state(state)),
        provider,
    }
}

fn seeded(entries: &[(&str, &str)]) -> State {
    let mut state = State::new();
    for (address, id) in entries {
        let address = addr(address);
        state.put(
            &address.module,
            address.legacy_state_key(),
            ResourceState::for_instance(
                &address,
                AbsProviderConfig::root("r"),
                InstanceState::new(*id),
            ),
        );
    }
    state
}

#[test]
fn two_objects_of_one_type_get_distinct_addresses() {
    let h = harness(
        MockProvider::new("r").with_import("id1", vec![widget("w1"), widget("w2")]),
        State::new(),
    );

    let report = h
        .importer
        .import(vec![ImportTarget::new(addr("r.a"), "id1")])
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(
        report.completed(),
        &[
            "r.a (import id \"id1\")".to_owned(),
            "import widget.a result: w1".to_owned(),
            "import widget.a-1 result: w2".to_owned(),
        ]
    );

    let state = h.importer.state().read();
    assert_eq!(state.instance(&addr("widget.a")).unwrap().id, "w1");
    assert_eq!(state.instance(&addr("widget.a-1")).unwrap().id, "w2");
    assert!(state.instance(&addr("r.a")).is_none());
    assert_eq!(state.resource_count(), 2);
    assert_eq!(h.provider.import_calls(), 1);
    assert_eq!(h.provider.refresh_calls(), 2);
}

#[test]
fn conflicts_abort_the_expansion_and_list_every_address() {
    let h = harness(
        MockProvider::new("r").with_import(
            "id1",
            vec![
                widget("w1"),
                InstanceState::new("g1").with_type("gadget"),
                InstanceState::new("z1").with_type("gizmo"),
            ],
        ),
        seeded(&[("widget.a", "old-w"), ("gizmo.a", "old-z")]),
    );

    let report = h
        .importer
        .import(vec![ImportTarget::new(addr("r.a"), "id1")])
        .unwrap();

    let err = report.failure("r.a (import id \"id1\")").unwrap();
    let Some(ImportError::Conflicts(diags)) = err.downcast_ref::<ImportError>() else {
        panic!("expected conflicts, got {err}");
    };
    let details: Vec<&str> = diags.diagnostics().iter().map(|d| d.detail.as_str()).collect();
    assert_eq!(details.len(), 2);
    assert!(details[0].contains("widget.a") && details[0].contains("old-w"));
    assert!(details[1].contains("gizmo.a") && details[1].contains("old-z"));

    assert_eq!(h.provider.refresh_calls(), 0);
    assert_eq!(h.importer.state().read().resource_count(), 2);
    assert!(matches!(report.into_result(), Err(ImportError::NodesFailed { .. })));
}

#[test]
fn int_key_import_leaves_string_keyed_record_alone() {
    let h = harness(
        MockProvider::new("r").with_import("id1", vec![widget("new")]),
        seeded(&[("widget.a[\"0\"]", "old")]),
    );

    let report = h
        .importer
        .import(vec![ImportTarget::new(addr("r.a[0]"), "id1")])
        .unwrap()
        .into_result()
        .unwrap();
    assert!(report.is_success());

    let state = h.importer.state().read();
    assert_eq!(state.resource_count(), 2);
    assert_eq!(state.instance(&addr("widget.a[\"0\"]")).unwrap().id, "old");
    assert_eq!(state.instance(&addr("widget.a[0]")).unwrap().id, "new");
}

#[test]
fn untyped_object_fails_before_refresh() {
    let h = harness(
        MockProvider::new("r").with_import("id1", vec![InstanceState::new("w1")]),
        State::new(),
    );

    let report = h
        .importer
        .import(vec![ImportTarget::new(addr("r.a"), "id1")])
        .unwrap();

    let err = report.failure("import r.a result: w1").unwrap();
    assert_eq!(err.step(), Some("check type"));
    assert!(matches!(
        err.downcast_ref::<ImportError>(),
        Some(ImportError::MissingType { .. })
    ));
    assert_eq!(h.provider.refresh_calls(), 0);
    assert_eq!(h.importer.state().read().resource_count(), 0);
}

#[test]
fn a_failing_sub_node_does_not_stop_its_siblings() {
    let h = harness(
        MockProvider::new("r")
            .with_import("id1", vec![widget("w1"), widget("w2"), widget("w3")])
            .failing_refresh("w2", "timeout"),
        State::new(),
    );

    let report = h
        .importer
        .import(vec![ImportTarget::new(addr("r.a"), "id1")])
        .unwrap();

    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].node, "import widget.a-1 result: w2");
    assert!(report.skipped().is_empty());

    let state = h.importer.state().read();
    assert!(state.instance(&addr("widget.a")).is_some());
    assert!(state.instance(&addr("widget.a-1")).is_none());
    assert!(state.instance(&addr("widget.a-2")).is_some());
    drop(state);

    let Err(ImportError::NodesFailed { failures }) = report.into_result() else {
        panic!("expected node failures");
    };
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("timeout"));
}

#[test]
fn failed_import_call_creates_no_sub_nodes() {
    let h = harness(MockProvider::new("r").failing_import("id1", "access denied"), State::new());

    let report = h
        .importer
        .import(vec![ImportTarget::new(addr("r.a"), "id1")])
        .unwrap();

    let err = report.failure("r.a (import id \"id1\")").unwrap();
    assert_eq!(err.step(), Some("import state"));
    assert!(err.to_string().contains("access denied"));
    assert_eq!(report.completed().len(), 0);
    assert_eq!(h.provider.refresh_calls(), 0);
}

#[test]
fn many_targets_run_independently() {
    let mut provider = MockProvider::new("r");
    for i in 0..6 {
        provider = provider.with_import(format!("id{i}"), vec![widget(&format!("w{i}"))]);
    }
    let h = harness(provider, State::new());

    let targets = (0..6)
        .map(|i| ImportTarget::new(addr(&format!("r.n{i}")), format!("id{i}")))
        .chain(std::iter::once(ImportTarget::new(addr("r.missing"), "nope")))
        .collect();
    let report = h.importer.import(targets).unwrap();

    assert_eq!(report.failures().len(), 1);
    assert!(report.failure("r.missing (import id \"nope\")").is_some());
    let state = h.importer.state().read();
    for i in 0..6 {
        assert_eq!(state.instance(&addr(&format!("widget.n{i}"))).unwrap().id, format!("w{i}"));
    }
}

#[test]
fn module_target_inherits_root_provider() {
    let net = ModuleInstance::root().child("net", InstanceKey::None);
    let h = harness(MockProvider::new("r").with_import("id1", vec![widget("w1")]), State::new());

    let target = ImportTarget::new(addr("module.net.r.a[0]"), "id1")
        .with_provider(AbsProviderConfig::root("r").in_module(net.clone()));
    let report = h.importer.import(vec![target]).unwrap().into_result().unwrap();
    assert!(report.is_success());

    let state = h.importer.state().read();
    let module = state.module(&net).unwrap();
    let record = &module.resources["widget.a.0"];
    assert_eq!(record.provider, AbsProviderConfig::root("r"));
    assert_eq!(record.key, InstanceKey::Int(0));
    assert!(state.module(&ModuleInstance::root()).is_none());
}

#[test]
fn unconfigured_provider_fails_before_anything_runs() {
    let h = harness(MockProvider::new("r"), State::new());

    let err = h
        .importer
        .import(vec![
            ImportTarget::new(addr("other_thing.a"), "x"),
            ImportTarget::new(addr("third_thing.b"), "y"),
        ])
        .unwrap_err();

    let ImportError::Engine(engine) = &err else {
        panic!("expected engine error, got {err:?}");
    };
    assert!(engine.to_string().starts_with("2 problems"));
    assert_eq!(h.provider.import_calls(), 0);
}

#[test]
fn targets_from_configuration() {
    let config = ImportConfig::from_toml_str(
        r#"
        parallelism = 2

        [[target]]
        address = "r.a"
        id = "id1"

        [[target]]
        address = "r.b"
        id = "id2"
        provider = "provider.r"
        "#,
    )
    .unwrap();

    let h = harness(
        MockProvider::new("r")
            .with_import("id1", vec![widget("w1")])
            .with_import("id2", vec![InstanceState::new("g2").with_type("gadget")]),
        State::new(),
    );
    let importer = Importer::from_config(
        &config,
        Arc::new(registry_for(&h)),
        h.importer.state().clone(),
    );
    importer.import_configured(&config).unwrap().into_result().unwrap();

    let state = h.importer.state().read();
    assert!(state.instance(&addr("widget.a")).is_some());
    assert!(state.instance(&addr("gadget.b")).is_some());
}

fn registry_for(h: &Harness) -> ProviderRegistry {
    let registry = ProviderRegistry::new();
    registry.register(
        AbsProviderConfig::root("r"),
        Arc::clone(&h.provider) as Arc<dyn ResourceProvider>,
    );
    registry
}

#[test]
fn imported_state_round_trips_through_json() {
    let h = harness(
        MockProvider::new("r").with_import(
            "id1",
            vec![widget("w1").with_attribute("size", serde_json::json!(2))],
        ),
        State::new(),
    );
    h.importer
        .import(vec![ImportTarget::new(addr("r.a"), "id1")])
        .unwrap()
        .into_result()
        .unwrap();

    let json = h.importer.state().read().to_json().unwrap();
    let restored = State::from_json(&json).unwrap();
    let stored = restored.instance(&addr("widget.a")).unwrap();
    assert_eq!(stored.id, "w1");
    assert_eq!(stored.attributes["size"], serde_json::json!(2));
    assert!(stored.ephemeral.type_name.is_empty());
}
