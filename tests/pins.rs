//! Integration tests for pin blob decoding and node graph construction.
//!
//! Node exports are assembled from pin lists encoded with the blob writer, then resolved with
//! the same entry points the analysis driver uses.

use kismetscope::pins::{read_pins, write_pins, ContainerKind, PinView};
use kismetscope::prelude::*;
use uguid::{guid, Guid};

const EVENT_THEN: Guid = guid!("6f1d0c2e-0000-4000-8000-000000000001");
const CALL_EXEC: Guid = guid!("6f1d0c2e-0000-4000-8000-000000000002");
const CALL_THEN: Guid = guid!("6f1d0c2e-0000-4000-8000-000000000003");
const CALL_SELF: Guid = guid!("6f1d0c2e-0000-4000-8000-000000000004");
const CALL_ITEMS: Guid = guid!("6f1d0c2e-0000-4000-8000-000000000005");
const PRINT_EXEC: Guid = guid!("6f1d0c2e-0000-4000-8000-000000000006");
const STALE: Guid = guid!("6f1d0c2e-0000-4000-8000-0000000000ff");

fn add_node(asset: &mut Asset, graph: PackageIndex, name: &str, class: &str, pins: &[Pin]) {
    let blob = write_pins(pins, asset.pin_version);
    asset.add_export(
        Export::new(name, class)
            .with_outer(graph)
            .with_extra(blob),
    );
}

fn event_pins() -> Vec<Pin> {
    vec![Pin::new(EVENT_THEN, "then", PinDirection::Output)
        .with_category("exec")
        .linked(CALL_EXEC)]
}

fn call_pins() -> Vec<Pin> {
    let mut self_pin = Pin::new(CALL_SELF, "self", PinDirection::Input).with_category("object");
    self_pin.hidden = true;

    let mut items = Pin::new(CALL_ITEMS, "Items", PinDirection::Input).with_category("int");
    items.pin_type.container = ContainerKind::Array;
    items.default_value = Some("(1,2,3)".to_string());
    items.autogenerated_default = Some("()".to_string());

    vec![
        Pin::new(CALL_EXEC, "execute", PinDirection::Input)
            .with_category("exec")
            .linked(EVENT_THEN),
        Pin::new(CALL_THEN, "then", PinDirection::Output)
            .with_category("exec")
            .linked(PRINT_EXEC)
            .linked(STALE),
        self_pin,
        items,
    ]
}

fn print_pins() -> Vec<Pin> {
    vec![Pin::new(PRINT_EXEC, "execute", PinDirection::Input)
        .with_category("exec")
        .linked(CALL_THEN)
        .linked(CALL_SELF)]
}

fn event_graph(version: PinVersion) -> Asset {
    let mut asset = Asset::new("BP_Door");
    asset.pin_version = version;
    let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
    add_node(&mut asset, graph, "K2Node_Event_0", "K2Node_Event", &event_pins());
    add_node(&mut asset, graph, "K2Node_CallFunction_0", "K2Node_CallFunction", &call_pins());
    add_node(&mut asset, graph, "K2Node_CallFunction_1", "K2Node_CallFunction", &print_pins());
    asset
}

#[test]
fn initial_layout_skips_gated_fields() -> Result<()> {
    let blob = write_pins(&call_pins(), PinVersion::INITIAL);
    let pins = read_pins(&blob, PinVersion::INITIAL)?;

    assert_eq!(pins.len(), 4);
    let items = &pins[3];
    assert_eq!(items.name, "Items");
    assert_eq!(items.pin_type.container, ContainerKind::Array);
    assert_eq!(items.default_value.as_deref(), Some("(1,2,3)"));
    assert_eq!(items.autogenerated_default, None);
    assert!(!items.orphaned);
    assert_eq!(pins[1].linked_to, vec![PRINT_EXEC, STALE]);

    assert!(read_pins(&blob, PinVersion::LATEST).is_err());
    Ok(())
}

#[test]
fn orphaned_flag_only_read_when_present() -> Result<()> {
    let mut orphan = Pin::new(CALL_EXEC, "OldInput", PinDirection::Input);
    orphan.orphaned = true;
    let pins = [orphan, Pin::new(CALL_THEN, "then", PinDirection::Output)];

    let latest = read_pins(&write_pins(&pins, PinVersion::LATEST), PinVersion::LATEST)?;
    assert!(latest[0].orphaned);
    assert_eq!(latest[1].name, "then");

    let container = read_pins(
        &write_pins(&pins, PinVersion::CONTAINER_TYPE),
        PinVersion::CONTAINER_TYPE,
    )?;
    assert!(!container[0].orphaned);
    assert_eq!(container[1].name, "then");
    Ok(())
}

#[test]
fn two_node_link() -> Result<()> {
    let mut asset = Asset::new("BP_Door");
    let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
    add_node(&mut asset, graph, "A", "K2Node_Event", &event_pins());
    add_node(
        &mut asset,
        graph,
        "B",
        "K2Node_CallFunction",
        &[Pin::new(CALL_EXEC, "execute", PinDirection::Input).linked(EVENT_THEN)],
    );

    let nodes = build_node_graph(&asset, &AnalysisOptions::default());
    let a = PackageIndex::from_export(1);
    let b = PackageIndex::from_export(2);
    assert_eq!(
        nodes.node(a).map(|n| n.pins[0].links.clone()),
        Some(vec![PinLink {
            node: b,
            pin: CALL_EXEC
        }])
    );
    assert_eq!(
        nodes.node(b).map(|n| n.pins[0].links.clone()),
        Some(vec![PinLink {
            node: a,
            pin: EVENT_THEN
        }])
    );
    assert!(nodes.dangling.is_empty());

    let edges: Vec<_> = nodes.edges().collect();
    assert_eq!(
        edges,
        vec![(
            PinLink {
                node: a,
                pin: EVENT_THEN
            },
            PinLink {
                node: b,
                pin: CALL_EXEC
            }
        )]
    );

    // The same asset without node B.
    asset.exports.pop();
    let nodes = build_node_graph(&asset, &AnalysisOptions::default());
    assert_eq!(nodes.dangling.len(), 1);
    assert_eq!(nodes.dangling[0].node, a);
    assert_eq!(nodes.dangling[0].pin, EVENT_THEN);
    assert_eq!(nodes.dangling[0].target, CALL_EXEC);
    assert!(nodes.edges().next().is_none());
    Ok(())
}

#[test]
fn every_link_is_resolved_filtered_or_dangling() -> Result<()> {
    for version in [PinVersion::INITIAL, PinVersion::LATEST] {
        let asset = event_graph(version);
        let nodes = build_node_graph(&asset, &AnalysisOptions::default());
        assert!(nodes.diagnostics.iter().all(|d| d.kind != DiagnosticKind::MalformedInput));

        let mut all_pins = Vec::new();
        for (i, export) in asset.exports.iter().enumerate().skip(1) {
            for pin in read_pins(&export.extra, version)? {
                all_pins.push((PackageIndex::from_export(i), pin));
            }
        }

        for (owner, pin) in &all_pins {
            let view: Option<&PinView> = nodes.node(*owner).and_then(|node| node.pin(pin.id));
            for target in &pin.linked_to {
                let filtered_target = all_pins
                    .iter()
                    .any(|(_, other)| other.id == *target && other.is_filtered());
                let resolved = view.is_some_and(|v| v.links.iter().any(|l| l.pin == *target));
                let dangling = nodes
                    .dangling
                    .iter()
                    .any(|d| d.node == *owner && d.pin == pin.id && d.target == *target);

                assert!(
                    resolved || dangling || filtered_target || pin.is_filtered(),
                    "link {} -> {target} lost",
                    pin.id
                );
            }
        }

        assert_eq!(nodes.dangling.len(), 1);
        assert_eq!(nodes.dangling[0].target, STALE);
    }
    Ok(())
}

#[test]
fn hidden_pins_leave_node_views() -> Result<()> {
    let asset = event_graph(PinVersion::LATEST);
    let nodes = build_node_graph(&asset, &AnalysisOptions::default());

    let graph = &nodes.graphs["EventGraph"];
    assert_eq!(graph.len(), 3);
    assert_eq!(nodes.edges().count(), 2);

    let call = &graph[1];
    assert_eq!(call.name, "K2Node_CallFunction_0");
    assert!(call.pin(CALL_SELF).is_none());
    assert_eq!(call.pins.len(), 3);

    let print = &graph[2];
    assert_eq!(
        print.pins[0].links,
        vec![PinLink {
            node: call.id,
            pin: CALL_THEN
        }]
    );
    Ok(())
}

#[test]
fn node_prefixes_are_configurable() -> Result<()> {
    let asset = event_graph(PinVersion::LATEST);
    let options = AnalysisOptions::default().with_node_class_prefixes(["K2Node_Event"]);
    let nodes = build_node_graph(&asset, &options);

    assert_eq!(nodes.node_count(), 0);
    assert_eq!(nodes.dangling.len(), 1);
    assert_eq!(nodes.dangling[0].target, CALL_EXEC);
    Ok(())
}
