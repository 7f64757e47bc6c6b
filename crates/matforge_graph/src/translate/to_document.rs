// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph to document translation.

use indexmap::IndexMap;
use matforge_mtlx::document::{ATTR_XPOS, ATTR_YPOS};
use matforge_mtlx::{
    validate, DocInput, DocNodeGraph, Document, InputBinding, NodeKind, ValidationReport,
    ValueType,
};
use tracing::{debug, warn};

use crate::boundary::BoundaryKind;
use crate::graph::{Connection, GraphNode, NodeGraph, NodeId};
use crate::group::GroupNode;
use crate::node::PolymorphicNode;
use crate::translate::{DocumentTranslator, MAIN_NODEGRAPH, POSITION_SCALE};

/// Where a node's document element landed: container nodegraph name
/// (`None` = document root) and element name.
type Placement = IndexMap<NodeId, (Option<String>, String)>;

impl DocumentTranslator<'_> {
    /// Serialize a graph into a document.
    ///
    /// Always succeeds; untranslatable items (nodes with no outputs,
    /// dangling connection endpoints) are logged and skipped. The
    /// returned report is the advisory validation of the finished
    /// document.
    pub fn graph_to_document(&self, graph: &NodeGraph) -> (Document, ValidationReport) {
        let mut doc = Document::new();
        let has_group = graph.nodes().any(|(_, n)| matches!(n, GraphNode::Group(_)));
        let wrap = self.options.nodegraph_abstraction && !has_group;
        let mut wrapper = DocNodeGraph::new(MAIN_NODEGRAPH);
        let mut placement = Placement::new();

        for (id, node) in graph.nodes() {
            match node {
                // proxies live only inside groups and emit nothing here
                GraphNode::Boundary(_) => {}
                GraphNode::Group(group) => {
                    let ng = self.export_group(group);
                    doc.nodegraphs.insert(ng.name.clone(), ng);
                    placement.insert(id, (None, group.name.clone()));
                }
                GraphNode::Polymorphic(n) => {
                    let def = n.definition();
                    if def.outputs.is_empty() {
                        warn!(node = %n.name, "definition declares no outputs, node skipped");
                        continue;
                    }
                    let mut dn =
                        export_node(n, |port| graph.connection_into(id, port).is_some());
                    let material = def.node_type() == ValueType::Material;
                    let shader = def.outputs.iter().any(|o| o.ty.is_shader());
                    if wrap && !material && !shader {
                        placement.insert(id, (Some(MAIN_NODEGRAPH.to_string()), dn.name.clone()));
                        wrapper.add_node(dn);
                    } else {
                        if material {
                            dn.kind = NodeKind::Material;
                        }
                        placement.insert(id, (None, dn.name.clone()));
                        doc.add_node(dn);
                    }
                }
            }
        }

        let mut exposed: IndexMap<(NodeId, String), String> = IndexMap::new();
        for conn in graph.connections() {
            self.export_connection(graph, conn, &placement, &mut doc, &mut wrapper, &mut exposed);
        }

        if wrap && !wrapper.nodes.is_empty() {
            doc.nodegraphs.insert(wrapper.name.clone(), wrapper);
        }

        let report = validate(&doc);
        debug!(
            nodes = doc.nodes.len(),
            nodegraphs = doc.nodegraphs.len(),
            valid = report.valid(),
            "graph serialized"
        );
        (doc, report)
    }

    fn export_connection(
        &self,
        graph: &NodeGraph,
        conn: &Connection,
        placement: &Placement,
        doc: &mut Document,
        wrapper: &mut DocNodeGraph,
        exposed: &mut IndexMap<(NodeId, String), String>,
    ) {
        let (Some(src_node), Some(dst_node)) =
            (graph.node(conn.from_node), graph.node(conn.to_node))
        else {
            return;
        };
        if matches!(src_node, GraphNode::Boundary(_)) || matches!(dst_node, GraphNode::Boundary(_))
        {
            return;
        }
        let Some((dst_container, dst_name)) = placement.get(&conn.to_node).cloned() else {
            warn!(to = %dst_node.name(), "connection destination was skipped, connection dropped");
            return;
        };

        let binding = match src_node {
            GraphNode::Group(group) => InputBinding::NodeGraphOutput {
                nodegraph: group.name.clone(),
                output: conn.from_port.clone(),
            },
            GraphNode::Polymorphic(src) => {
                let Some((src_container, src_name)) = placement.get(&conn.from_node).cloned()
                else {
                    warn!(from = %src.name, "connection source was skipped, connection dropped");
                    return;
                };
                match (&src_container, &dst_container) {
                    (a, b) if a == b => {
                        let multi = src.definition().is_multi_output();
                        if multi {
                            let nodes = match &src_container {
                                Some(_) => &mut wrapper.nodes,
                                None => &mut doc.nodes,
                            };
                            if let (Some(dn), Some(ty)) =
                                (nodes.get_mut(&src_name), src.output_type(&conn.from_port))
                            {
                                dn.ensure_output(&conn.from_port, ty.clone());
                            }
                        }
                        InputBinding::Node {
                            node: src_name,
                            output: multi.then(|| conn.from_port.clone()),
                        }
                    }
                    (Some(_), None) => {
                        // wrapped source feeding a root consumer: re-expose
                        // the output through the wrapper interface
                        let Some(ty) = src.output_type(&conn.from_port).cloned() else {
                            return;
                        };
                        let key = (conn.from_node, conn.from_port.clone());
                        let output = match exposed.get(&key) {
                            Some(name) => name.clone(),
                            None => {
                                let name = format!("output_{src_name}_{}", conn.from_port);
                                if src.definition().is_multi_output() {
                                    if let Some(dn) = wrapper.nodes.get_mut(&src_name) {
                                        dn.ensure_output(&conn.from_port, ty.clone());
                                    }
                                }
                                wrapper.add_output(name.clone(), ty, Some(src_name.clone()));
                                exposed.insert(key, name.clone());
                                name
                            }
                        };
                        InputBinding::NodeGraphOutput {
                            nodegraph: MAIN_NODEGRAPH.to_string(),
                            output,
                        }
                    }
                    _ => {
                        warn!(
                            from = %src.name,
                            to = %dst_node.name(),
                            "connection crosses into the wrapper nodegraph, dropped"
                        );
                        return;
                    }
                }
            }
            GraphNode::Boundary(_) => return,
        };

        match dst_node {
            GraphNode::Group(group) => {
                let Some(ng) = doc.nodegraphs.get_mut(&group.name) else {
                    return;
                };
                let Some(ty) = dst_node.input_type(&conn.to_port).cloned() else {
                    return;
                };
                let input = ng
                    .inputs
                    .entry(conn.to_port.clone())
                    .or_insert_with(|| DocInput::new(conn.to_port.clone(), ty));
                input.value = None;
                input.binding = Some(binding);
            }
            GraphNode::Polymorphic(_) => {
                let nodes = match &dst_container {
                    Some(_) => &mut wrapper.nodes,
                    None => &mut doc.nodes,
                };
                let Some(dn) = nodes.get_mut(&dst_name) else {
                    return;
                };
                let Some(ty) = dst_node.input_type(&conn.to_port).cloned() else {
                    return;
                };
                let input = dn
                    .inputs
                    .entry(conn.to_port.clone())
                    .or_insert_with(|| DocInput::new(conn.to_port.clone(), ty));
                input.value = None;
                input.binding = Some(binding);
            }
            GraphNode::Boundary(_) => {}
        }
    }

    /// Serialize a group node as a nested nodegraph: interface inputs
    /// from external ports, declared outputs from output-proxy
    /// connections, interface-name bindings from input-proxy connections.
    fn export_group(&self, group: &GroupNode) -> DocNodeGraph {
        let mut ng = DocNodeGraph::new(group.name.clone());
        ng.attributes.insert(
            ATTR_XPOS.to_string(),
            (group.position[0] * POSITION_SCALE).to_string(),
        );
        ng.attributes.insert(
            ATTR_YPOS.to_string(),
            (group.position[1] * POSITION_SCALE).to_string(),
        );

        for port in group.inputs() {
            let mut input = DocInput::new(&port.name, port.ty.clone());
            if let Some(value) = group.property(&port.name) {
                if !(value.is_empty_string() && port.ty != ValueType::String) {
                    input.value = Some(value.clone());
                }
            }
            ng.add_input(input);
        }

        let sub = group.subgraph();
        let in_proxy = sub.boundary(BoundaryKind::Input).map(|(id, _)| id);
        let out_proxy = sub.boundary(BoundaryKind::Output).map(|(id, _)| id);

        for (id, node) in sub.nodes() {
            match node {
                GraphNode::Boundary(_) => {}
                GraphNode::Group(nested) => {
                    warn!(
                        group = %group.name,
                        nested = %nested.name,
                        "nested groups cannot be serialized, skipped"
                    );
                }
                GraphNode::Polymorphic(n) => {
                    if n.definition().outputs.is_empty() {
                        warn!(node = %n.name, "definition declares no outputs, node skipped");
                        continue;
                    }
                    ng.add_node(export_node(n, |port| sub.connection_into(id, port).is_some()));
                }
            }
        }

        for conn in sub.connections() {
            if Some(conn.from_node) == in_proxy && Some(conn.to_node) == out_proxy {
                warn!(group = %group.name, "interface passthrough cannot be serialized, skipped");
                continue;
            }
            if Some(conn.to_node) == out_proxy {
                let Some(src) = sub.node(conn.from_node) else {
                    continue;
                };
                let Some(ty) = sub
                    .node(conn.to_node)
                    .and_then(|n| n.input_type(&conn.to_port).cloned())
                else {
                    continue;
                };
                if src
                    .as_polymorphic()
                    .is_some_and(|n| n.definition().is_multi_output())
                {
                    warn!(
                        group = %group.name,
                        output = %conn.to_port,
                        "multi-output source of a nodegraph output loses its output name"
                    );
                }
                ng.add_output(conn.to_port.clone(), ty, Some(src.name().to_string()));
                continue;
            }

            let binding = if Some(conn.from_node) == in_proxy {
                InputBinding::InterfaceName(conn.from_port.clone())
            } else if let Some(src) = sub.node(conn.from_node) {
                let multi = src
                    .as_polymorphic()
                    .is_some_and(|n| n.definition().is_multi_output());
                if multi {
                    if let (Some(dn), Some(ty)) = (
                        ng.nodes.get_mut(src.name()),
                        src.output_type(&conn.from_port).cloned(),
                    ) {
                        dn.ensure_output(&conn.from_port, ty);
                    }
                }
                InputBinding::Node {
                    node: src.name().to_string(),
                    output: multi.then(|| conn.from_port.clone()),
                }
            } else {
                continue;
            };

            let Some(dst) = sub.node(conn.to_node) else {
                continue;
            };
            let Some(ty) = dst.input_type(&conn.to_port).cloned() else {
                continue;
            };
            let Some(dn) = ng.nodes.get_mut(dst.name()) else {
                continue;
            };
            let input = dn
                .inputs
                .entry(conn.to_port.clone())
                .or_insert_with(|| DocInput::new(conn.to_port.clone(), ty));
            input.value = None;
            input.binding = Some(binding);
        }

        ng
    }
}

/// Serialize one definition-backed node, without connection bindings.
///
/// Geometric-property inputs are omitted unless connected; connected
/// inputs are emitted valueless; empty non-string values are dropped;
/// non-empty filenames get the source colorspace attribute.
fn export_node(node: &PolymorphicNode, connected: impl Fn(&str) -> bool) -> matforge_mtlx::DocNode {
    let def = node.definition();
    let mut dn = matforge_mtlx::DocNode::new(node.name.clone(), def.category.clone(), def.node_type());
    dn.set_position_attrs([
        node.position[0] * POSITION_SCALE,
        node.position[1] * POSITION_SCALE,
    ]);

    for input in &def.inputs {
        if connected(&input.name) {
            dn.add_input(DocInput::new(&input.name, input.ty.clone()));
            continue;
        }
        if input.is_geom_prop {
            continue;
        }
        let Some(value) = node.property(&input.name) else {
            continue;
        };
        if value.is_empty_string() && input.ty != ValueType::String {
            continue;
        }
        let mut di = DocInput::new(&input.name, input.ty.clone()).with_value(value.clone());
        // empty filenames were dropped above, so this is always a real path
        if input.ty == ValueType::Filename {
            di.attributes
                .insert("colorspace".to_string(), "srgb_texture".to_string());
        }
        dn.add_input(di);
    }
    dn
}
