//! Node connectivity graph built from the pin blobs of an asset.
//!
//! Construction runs in two passes. The first decodes every node blob and records where each
//! pin identifier lives. The second resolves every link through that map; identifiers that are
//! not found become [`DanglingLink`] records instead of failing the asset. Hidden and orphaned
//! pins are dropped afterwards together with links pointing at them, and nodes left without
//! links, target or error are omitted from the result.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, warn};
use uguid::Guid;

use crate::{
    asset::{Asset, Export, PackageIndex, PropertyBag, PropertyValue, SymbolTable},
    diagnostics::{Diagnostic, DiagnosticKind},
    engine::AnalysisOptions,
    pins::{read_pins, ContainerKind, Pin, PinDirection},
};

/// Properties naming a member, in lookup order.
const MEMBER_REFERENCES: [&str; 4] = [
    "FunctionReference",
    "EventReference",
    "VariableReference",
    "DelegateReference",
];

/// Group key for nodes without an owning graph.
const UNOWNED_GRAPH: &str = "<unowned>";

/// End point of a resolved link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PinLink {
    /// Node owning the target pin
    pub node: PackageIndex,
    /// Target pin
    pub pin: Guid,
}

/// A link whose target pin does not exist in the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DanglingLink {
    /// Node owning the source pin
    pub node: PackageIndex,
    /// Source pin
    pub pin: Guid,
    /// Identifier that failed to resolve
    pub target: Guid,
}

/// A visible pin with its resolved links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinView {
    /// Identifier
    pub id: Guid,
    /// Pin name
    pub name: String,
    /// Input or output
    pub direction: PinDirection,
    /// Type category
    pub category: String,
    /// Type sub category
    pub sub_category: String,
    /// Name of the class, struct or enum narrowing the type
    pub sub_category_object: Option<String>,
    /// Container shape
    pub container: ContainerKind,
    /// User supplied default value
    pub default_value: Option<String>,
    /// Editor generated default value
    pub autogenerated_default: Option<String>,
    /// Resolved links, in serialized order
    pub links: Vec<PinLink>,
}

/// A graph node that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Export index of the node
    pub id: PackageIndex,
    /// Object name of the node
    pub name: String,
    /// Node class, e.g. `K2Node_CallFunction`
    pub class_name: String,
    /// Function, variable or type the node refers to
    pub target: Option<String>,
    /// Visible pins, in serialized order
    pub pins: Vec<PinView>,
    /// Why the pin blob could not be decoded
    pub error: Option<String>,
}

impl GraphNode {
    /// Number of resolved links leaving this node's pins.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.pins.iter().map(|pin| pin.links.len()).sum()
    }

    /// Pin with the given identifier.
    #[must_use]
    pub fn pin(&self, id: Guid) -> Option<&PinView> {
        self.pins.iter().find(|pin| pin.id == id)
    }
}

/// Node graphs of an asset, grouped by owning graph name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeGraph {
    /// Nodes per owning graph, in export order
    pub graphs: BTreeMap<String, Vec<GraphNode>>,
    /// Links that did not resolve
    pub dangling: Vec<DanglingLink>,
    /// Findings recorded while building
    pub diagnostics: Vec<Diagnostic>,
}

impl NodeGraph {
    /// Total number of nodes across all graphs.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graphs.values().map(Vec::len).sum()
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graphs.values().flatten()
    }

    /// Node with the given export index.
    #[must_use]
    pub fn node(&self, id: PackageIndex) -> Option<&GraphNode> {
        self.nodes().find(|node| node.id == id)
    }

    /// Iterate over every resolved wire as `(source, target)`.
    ///
    /// A wire is stored on both of its pins. It is reported once, oriented from the output pin
    /// to the input pin; a one-sided link is reported from the pin that stores it.
    pub fn edges(&self) -> impl Iterator<Item = (PinLink, PinLink)> + '_ {
        self.nodes().flat_map(move |node| {
            node.pins.iter().flat_map(move |pin| {
                let source = PinLink {
                    node: node.id,
                    pin: pin.id,
                };
                pin.links
                    .iter()
                    .filter(move |link| self.originates(source, pin.direction, **link))
                    .map(move |link| (source, *link))
            })
        })
    }

    /// Returns `true` if the wire `source -> target` is reported from `source`.
    fn originates(&self, source: PinLink, direction: PinDirection, target: PinLink) -> bool {
        let Some(back) = self.node(target.node).and_then(|node| node.pin(target.pin)) else {
            return true;
        };
        if !back.links.contains(&source) {
            return true;
        }
        match (direction, back.direction) {
            (PinDirection::Output, PinDirection::Input) => true,
            (PinDirection::Input, PinDirection::Output) => false,
            _ => (source.node, source.pin.to_bytes()) < (target.node, target.pin.to_bytes()),
        }
    }
}

struct DecodedNode<'a> {
    id: PackageIndex,
    export: &'a Export,
    pins: Vec<Pin>,
    error: Option<String>,
}

/// Build the node graphs of `asset`.
///
/// Never fails: corrupt blobs and unresolved links are recorded in the result.
///
/// # Examples
///
/// ```rust
/// use kismetscope::pins::{build_node_graph, write_pins, Pin, PinDirection};
/// use kismetscope::{AnalysisOptions, Asset, Export};
/// use uguid::guid;
///
/// let out = guid!("00000000-0000-0000-0000-00000000000a");
/// let input = guid!("00000000-0000-0000-0000-00000000000b");
///
/// let mut asset = Asset::new("BP_Door");
/// let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
/// let blob_a = write_pins(&[Pin::new(out, "then", PinDirection::Output).linked(input)], asset.pin_version);
/// let blob_b = write_pins(&[Pin::new(input, "execute", PinDirection::Input).linked(out)], asset.pin_version);
/// asset.add_export(Export::new("K2Node_Event_0", "K2Node_Event").with_outer(graph).with_extra(blob_a));
/// asset.add_export(Export::new("K2Node_CallFunction_0", "K2Node_CallFunction").with_outer(graph).with_extra(blob_b));
///
/// let nodes = build_node_graph(&asset, &AnalysisOptions::default());
/// assert_eq!(nodes.graphs["EventGraph"].len(), 2);
/// assert_eq!(nodes.edges().count(), 1);
/// assert!(nodes.dangling.is_empty());
/// ```
#[must_use]
pub fn build_node_graph(asset: &Asset, options: &AnalysisOptions) -> NodeGraph {
    let mut result = NodeGraph::default();

    let nodes: Vec<DecodedNode<'_>> = asset
        .exports
        .iter()
        .enumerate()
        .filter(|(_, export)| options.is_node_class(&export.class_name))
        .map(|(i, export)| {
            let id = PackageIndex::from_export(i);
            match read_pins(&export.extra, asset.pin_version) {
                Ok(pins) => DecodedNode {
                    id,
                    export,
                    pins,
                    error: None,
                },
                Err(error) => {
                    warn!(node = %export.object_name, %error, "corrupt pin blob");
                    result.diagnostics.push(Diagnostic::error(
                        DiagnosticKind::MalformedInput,
                        format!("Pins of '{}': {error}", export.object_name),
                    ));
                    DecodedNode {
                        id,
                        export,
                        pins: Vec::new(),
                        error: Some(error.to_string()),
                    }
                }
            }
        })
        .collect();

    let mut pin_map: HashMap<Guid, (usize, usize)> = HashMap::new();
    for (node_slot, node) in nodes.iter().enumerate() {
        for (pin_slot, pin) in node.pins.iter().enumerate() {
            if pin_map.insert(pin.id, (node_slot, pin_slot)).is_some() {
                warn!(pin = %pin.id, node = %node.export.object_name, "duplicate pin identifier");
                result.diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::MalformedInput,
                    format!(
                        "Pin {} of '{}' reuses an identifier",
                        pin.id, node.export.object_name
                    ),
                ));
            }
        }
    }

    for node in &nodes {
        let mut views = Vec::with_capacity(node.pins.len());

        for pin in &node.pins {
            let mut links = Vec::with_capacity(pin.linked_to.len());
            for &target in &pin.linked_to {
                match pin_map.get(&target) {
                    Some(&(node_slot, pin_slot)) => {
                        let owner = &nodes[node_slot];
                        if !owner.pins[pin_slot].is_filtered() {
                            links.push(PinLink {
                                node: owner.id,
                                pin: target,
                            });
                        }
                    }
                    None => {
                        warn!(node = %node.export.object_name, pin = %pin.id, %target, "dangling pin link");
                        result.diagnostics.push(Diagnostic::warning(
                            DiagnosticKind::DanglingReference,
                            format!(
                                "Pin '{}' of '{}' links to unknown pin {target}",
                                pin.name, node.export.object_name
                            ),
                        ));
                        result.dangling.push(DanglingLink {
                            node: node.id,
                            pin: pin.id,
                            target,
                        });
                    }
                }
            }

            if pin.is_filtered() {
                continue;
            }

            views.push(PinView {
                id: pin.id,
                name: pin.name.clone(),
                direction: pin.direction,
                category: pin.pin_type.category.clone(),
                sub_category: pin.pin_type.sub_category.clone(),
                sub_category_object: lookup_object(
                    asset,
                    pin.pin_type.sub_category_object,
                    &mut result.diagnostics,
                ),
                container: pin.pin_type.container,
                default_value: pin.default_value.clone(),
                autogenerated_default: pin.autogenerated_default.clone(),
                links,
            });
        }

        let target = node_target(asset, &node.export.properties, &mut result.diagnostics);
        let linked = views.iter().any(|view| !view.links.is_empty());
        if !linked && target.is_none() && node.error.is_none() {
            continue;
        }

        let group = asset
            .outer_name(node.id)
            .unwrap_or(UNOWNED_GRAPH)
            .to_string();
        result.graphs.entry(group).or_default().push(GraphNode {
            id: node.id,
            name: node.export.object_name.clone(),
            class_name: node.export.class_name.clone(),
            target,
            pins: views,
            error: node.error.clone(),
        });
    }

    debug!(
        asset = %asset.name,
        graphs = result.graphs.len(),
        nodes = result.node_count(),
        dangling = result.dangling.len(),
        "built node graphs"
    );

    result
}

fn lookup_object(
    symbols: &dyn SymbolTable,
    index: PackageIndex,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    if index.is_null() {
        return None;
    }
    let name = symbols.object_name(index).map(str::to_string);
    if name.is_none() {
        warn!(%index, "unresolved object reference");
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::DanglingReference,
            format!("No object for {index}"),
        ));
    }
    name
}

/// Resolve what a node refers to from its tagged properties.
fn node_target(
    symbols: &dyn SymbolTable,
    properties: &PropertyBag,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    for reference in MEMBER_REFERENCES {
        if let Some(name) = properties
            .get_path(&[reference, "MemberName"])
            .and_then(PropertyValue::as_str)
            .filter(|name| !name.is_empty() && *name != "None")
        {
            return Some(name.to_string());
        }
    }

    if let Some(name) = properties
        .get("CustomFunctionName")
        .and_then(PropertyValue::as_str)
        .filter(|name| !name.is_empty() && *name != "None")
    {
        return Some(name.to_string());
    }

    let object = properties
        .get("TargetType")
        .or_else(|| properties.get("StructType"))
        .or_else(|| properties.get_path(&["MacroGraphReference", "MacroGraph"]))
        .and_then(PropertyValue::as_object)?;
    lookup_object(symbols, object, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        asset::{Export, Import},
        pins::{write_pins, PinVersion},
    };
    use uguid::guid;

    const A_OUT: Guid = guid!("00000000-0000-0000-0000-0000000000a1");
    const A_HIDDEN: Guid = guid!("00000000-0000-0000-0000-0000000000a2");
    const B_IN: Guid = guid!("00000000-0000-0000-0000-0000000000b1");
    const MISSING: Guid = guid!("00000000-0000-0000-0000-0000000000ff");

    fn node(
        asset: &mut Asset,
        name: &str,
        class: &str,
        graph: PackageIndex,
        pins: &[Pin],
    ) -> PackageIndex {
        let blob = write_pins(pins, asset.pin_version);
        asset.add_export(
            Export::new(name, class)
                .with_outer(graph)
                .with_extra(blob),
        )
    }

    #[test]
    fn test_hidden_pins_and_their_links_dropped() {
        let mut asset = Asset::new("BP");
        let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
        let mut hidden = Pin::new(A_HIDDEN, "self", PinDirection::Input);
        hidden.hidden = true;
        node(
            &mut asset,
            "A",
            "K2Node_CallFunction",
            graph,
            &[Pin::new(A_OUT, "then", PinDirection::Output).linked(B_IN), hidden],
        );
        node(
            &mut asset,
            "B",
            "K2Node_CallFunction",
            graph,
            &[Pin::new(B_IN, "execute", PinDirection::Input)
                .linked(A_OUT)
                .linked(A_HIDDEN)],
        );

        let nodes = build_node_graph(&asset, &AnalysisOptions::default());
        let a = &nodes.graphs["EventGraph"][0];
        assert_eq!(a.pins.len(), 1);
        let b = &nodes.graphs["EventGraph"][1];
        assert_eq!(
            b.pins[0].links,
            vec![PinLink {
                node: PackageIndex::from_export(1),
                pin: A_OUT
            }]
        );
        assert!(nodes.dangling.is_empty());
    }

    #[test]
    fn test_dangling_link_recorded() {
        let mut asset = Asset::new("BP");
        let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
        node(
            &mut asset,
            "A",
            "K2Node_Event",
            graph,
            &[Pin::new(A_OUT, "then", PinDirection::Output).linked(MISSING)],
        );

        let nodes = build_node_graph(&asset, &AnalysisOptions::default());
        assert_eq!(nodes.dangling.len(), 1);
        assert_eq!(nodes.dangling[0].target, MISSING);
        assert_eq!(nodes.node_count(), 0);
        assert_eq!(nodes.diagnostics[0].kind, DiagnosticKind::DanglingReference);
    }

    #[test]
    fn test_corrupt_blob_keeps_node() {
        let mut asset = Asset::new("BP");
        let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
        asset.add_export(
            Export::new("Broken", "K2Node_Knot")
                .with_outer(graph)
                .with_extra(vec![5, 0, 0, 0, 1]),
        );
        node(
            &mut asset,
            "Fine",
            "K2Node_Event",
            graph,
            &[Pin::new(A_OUT, "then", PinDirection::Output).linked(B_IN)],
        );
        node(
            &mut asset,
            "Other",
            "K2Node_CallFunction",
            graph,
            &[Pin::new(B_IN, "execute", PinDirection::Input)],
        );

        let nodes = build_node_graph(&asset, &AnalysisOptions::default());
        let broken = nodes.node(PackageIndex::from_export(1)).unwrap();
        assert!(broken.pins.is_empty());
        assert!(broken.error.is_some());
        assert_eq!(nodes.node(PackageIndex::from_export(2)).unwrap().link_count(), 1);
    }

    #[test]
    fn test_targets_from_properties() {
        let mut asset = Asset::new("BP");
        let actor = asset.add_import(Import::new("Actor", "Class", PackageIndex::NULL));
        let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
        asset.add_export(
            Export::new("Call", "K2Node_CallFunction")
                .with_outer(graph)
                .with_extra(write_pins(&[], PinVersion::LATEST))
                .with_properties(PropertyBag::new().with(
                    "FunctionReference",
                    PropertyValue::Struct(
                        PropertyBag::new()
                            .with("MemberName", PropertyValue::Name("PrintString".into())),
                    ),
                )),
        );
        asset.add_export(
            Export::new("Cast", "K2Node_DynamicCast")
                .with_outer(graph)
                .with_extra(write_pins(&[], PinVersion::LATEST))
                .with_properties(
                    PropertyBag::new().with("TargetType", PropertyValue::Object(actor)),
                ),
        );

        let nodes = build_node_graph(&asset, &AnalysisOptions::default());
        let targets: Vec<_> = nodes.nodes().map(|n| n.target.as_deref()).collect();
        assert_eq!(targets, vec![Some("PrintString"), Some("Actor")]);
    }

    #[test]
    fn test_mirrored_link_is_one_edge() {
        let mut asset = Asset::new("BP");
        let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
        let b = node(
            &mut asset,
            "B",
            "K2Node_CallFunction",
            graph,
            &[Pin::new(B_IN, "execute", PinDirection::Input).linked(A_OUT)],
        );
        let a = node(
            &mut asset,
            "A",
            "K2Node_Event",
            graph,
            &[Pin::new(A_OUT, "then", PinDirection::Output).linked(B_IN)],
        );

        let nodes = build_node_graph(&asset, &AnalysisOptions::default());
        let edges: Vec<_> = nodes.edges().collect();
        assert_eq!(
            edges,
            vec![(PinLink { node: a, pin: A_OUT }, PinLink { node: b, pin: B_IN })]
        );
    }

    #[test]
    fn test_one_sided_link_reported_from_its_pin() {
        let mut asset = Asset::new("BP");
        let graph = asset.add_export(Export::new("EventGraph", "EdGraph"));
        let b = node(
            &mut asset,
            "B",
            "K2Node_CallFunction",
            graph,
            &[Pin::new(B_IN, "execute", PinDirection::Input).linked(A_OUT)],
        );
        let a = node(
            &mut asset,
            "A",
            "K2Node_Event",
            graph,
            &[Pin::new(A_OUT, "then", PinDirection::Output)],
        );

        let nodes = build_node_graph(&asset, &AnalysisOptions::default());
        let edges: Vec<_> = nodes.edges().collect();
        assert_eq!(
            edges,
            vec![(PinLink { node: b, pin: B_IN }, PinLink { node: a, pin: A_OUT })]
        );
    }

    #[test]
    fn test_non_node_exports_ignored() {
        let mut asset = Asset::new("BP");
        asset.add_export(Export::new("EventGraph", "EdGraph").with_extra(vec![1, 2, 3]));
        let nodes = build_node_graph(&asset, &AnalysisOptions::default());
        assert!(nodes.graphs.is_empty());
        assert!(nodes.diagnostics.is_empty());
    }
}
