// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document to graph translation.

use std::path::Path;

use indexmap::IndexMap;
use matforge_mtlx::document::{ATTR_XPOS, ATTR_YPOS};
use matforge_mtlx::{DocInput, DocNode, DocNodeGraph, Document, InputBinding, Value, ValueType};
use tracing::{debug, warn};

use crate::boundary::BoundaryKind;
use crate::graph::{GraphNode, NodeGraph, NodeId};
use crate::group::GroupNode;
use crate::layout::auto_layout;
use crate::node::PolymorphicNode;
use crate::translate::{DocumentTranslator, TranslateError, POSITION_SCALE};

impl DocumentTranslator<'_> {
    /// Build a graph from a document.
    ///
    /// Best-effort: nodes whose definition cannot be resolved and
    /// connections whose peer is missing are logged and skipped. The
    /// graph is built from scratch, so a fatal error leaves the caller's
    /// state untouched. Graphs without persisted positions are laid out
    /// on the fallback grid.
    pub fn document_to_graph(&self, doc: &Document) -> Result<NodeGraph, TranslateError> {
        if self.index.is_empty() {
            return Err(TranslateError::EmptyIndex);
        }

        let mut graph = NodeGraph::new("root");
        let mut ids: IndexMap<String, NodeId> = IndexMap::new();
        let mut had_positions = false;

        for dn in doc.nodes.values() {
            let Some(node) = self.import_node(dn, &mut had_positions) else {
                continue;
            };
            let id = graph.add_node(GraphNode::Polymorphic(node));
            ids.insert(dn.name.clone(), id);
        }
        for ng in doc.nodegraphs.values() {
            let group = self.import_group(ng, &mut had_positions);
            let id = graph.add_node(GraphNode::Group(group));
            ids.insert(ng.name.clone(), id);
        }

        for dn in doc.nodes.values() {
            let Some(&to) = ids.get(&dn.name) else {
                continue;
            };
            for input in dn.inputs.values() {
                self.import_root_binding(&mut graph, &ids, to, &dn.name, input);
            }
        }
        // interface inputs of a nodegraph can be fed from the root too
        for ng in doc.nodegraphs.values() {
            let Some(&to) = ids.get(&ng.name) else {
                continue;
            };
            for input in ng.inputs.values() {
                self.import_root_binding(&mut graph, &ids, to, &ng.name, input);
            }
        }

        if !had_positions {
            auto_layout(&mut graph);
        }
        debug!(nodes = graph.len(), connections = graph.connections().len(), "document imported");
        Ok(graph)
    }

    fn import_root_binding(
        &self,
        graph: &mut NodeGraph,
        ids: &IndexMap<String, NodeId>,
        to: NodeId,
        to_name: &str,
        input: &DocInput,
    ) {
        match &input.binding {
            None => {}
            Some(InputBinding::Node { node, output }) => {
                let Some(&from) = ids.get(node) else {
                    warn!(node = to_name, peer = %node, "connection peer missing, input left unconnected");
                    return;
                };
                let Some(from_port) =
                    graph.node(from).and_then(|n| source_port(n, output.as_deref()))
                else {
                    return;
                };
                connect_logged(graph, from, &from_port, to, &input.name);
            }
            Some(InputBinding::NodeGraphOutput { nodegraph, output }) => {
                let Some(&from) = ids.get(nodegraph) else {
                    warn!(node = to_name, peer = %nodegraph, "nodegraph peer missing, input left unconnected");
                    return;
                };
                connect_logged(graph, from, output, to, &input.name);
            }
            Some(InputBinding::InterfaceName(name)) => {
                warn!(node = to_name, interface = %name, "interface-name binding outside a nodegraph ignored");
            }
        }
    }

    /// Resolve a document node against the index and build its graph
    /// node: variant by structural match, values into the property bag,
    /// positions unscaled.
    fn import_node(&self, dn: &DocNode, had_positions: &mut bool) -> Option<PolymorphicNode> {
        let variant = match self.index.resolve_variant(&dn.category, dn) {
            Some(variant) => variant,
            None => {
                let fallback = self
                    .index
                    .variants(&dn.category)
                    .and_then(|table| table.first().map(|(key, _)| key.clone()));
                match fallback {
                    Some(variant) => {
                        warn!(
                            node = %dn.name,
                            category = %dn.category,
                            variant = %variant,
                            "no variant matches, falling back to the first"
                        );
                        variant
                    }
                    None => {
                        warn!(node = %dn.name, category = %dn.category, "unknown category, node skipped");
                        return None;
                    }
                }
            }
        };

        let mut node = self.index.create_node(&dn.category, Some(&variant))?;
        node.name = dn.name.clone();
        if let Some(pos) = dn.position_attrs() {
            node.position = [pos[0] / POSITION_SCALE, pos[1] / POSITION_SCALE];
            *had_positions = true;
        }
        for input in dn.inputs.values() {
            let Some(value) = &input.value else {
                continue;
            };
            node.set_property(&input.name, self.absolutize(&input.ty, value.clone()));
        }
        Some(node)
    }

    /// Build a group node from a nested nodegraph: declared interface
    /// inputs become external ports, declared outputs become output-proxy
    /// ports, interface-name bindings route through the input proxy.
    fn import_group(&self, ng: &DocNodeGraph, root_had_positions: &mut bool) -> GroupNode {
        let mut group = GroupNode::new(ng.name.clone());
        let x = ng.attributes.get(ATTR_XPOS).and_then(|v| v.parse::<f32>().ok());
        let y = ng.attributes.get(ATTR_YPOS).and_then(|v| v.parse::<f32>().ok());
        if let (Some(x), Some(y)) = (x, y) {
            group.position = [x / POSITION_SCALE, y / POSITION_SCALE];
            *root_had_positions = true;
        }

        for input in ng.inputs.values() {
            let value = input
                .value
                .as_ref()
                .map(|v| self.absolutize(&input.ty, v.clone()));
            group.declare_input(&input.name, input.ty.clone(), value);
        }

        group.edit(|sub| {
            let mut ids: IndexMap<String, NodeId> = IndexMap::new();
            let mut had_positions = false;

            for dn in ng.nodes.values() {
                let Some(node) = self.import_node(dn, &mut had_positions) else {
                    continue;
                };
                let id = sub.add_node(GraphNode::Polymorphic(node));
                ids.insert(dn.name.clone(), id);
            }

            if let Some((out_proxy, _)) = sub.boundary(BoundaryKind::Output) {
                for out in ng.outputs.values() {
                    if let Some(GraphNode::Boundary(proxy)) = sub.node_mut(out_proxy) {
                        proxy.add_named_port(&out.name, out.ty.clone());
                    }
                    let Some(src_name) = &out.connected_node else {
                        continue;
                    };
                    let Some(&from) = ids.get(src_name) else {
                        warn!(
                            nodegraph = %ng.name,
                            output = %out.name,
                            peer = %src_name,
                            "output source missing, output left unconnected"
                        );
                        continue;
                    };
                    let Some(from_port) = sub.node(from).and_then(|n| source_port(n, None)) else {
                        continue;
                    };
                    connect_logged(sub, from, &from_port, out_proxy, &out.name);
                }
            }

            let in_proxy = sub.boundary(BoundaryKind::Input).map(|(id, _)| id);
            for dn in ng.nodes.values() {
                let Some(&to) = ids.get(&dn.name) else {
                    continue;
                };
                for input in dn.inputs.values() {
                    match &input.binding {
                        None => {}
                        Some(InputBinding::Node { node, output }) => {
                            let Some(&from) = ids.get(node) else {
                                warn!(node = %dn.name, peer = %node, "connection peer missing, input left unconnected");
                                continue;
                            };
                            let Some(from_port) =
                                sub.node(from).and_then(|n| source_port(n, output.as_deref()))
                            else {
                                continue;
                            };
                            connect_logged(sub, from, &from_port, to, &input.name);
                        }
                        Some(InputBinding::InterfaceName(name)) => {
                            let Some(in_proxy) = in_proxy else {
                                continue;
                            };
                            connect_logged(sub, in_proxy, name, to, &input.name);
                        }
                        Some(InputBinding::NodeGraphOutput { nodegraph, .. }) => {
                            warn!(
                                node = %dn.name,
                                peer = %nodegraph,
                                "nodegraph-output binding inside a nodegraph is not supported"
                            );
                        }
                    }
                }
            }

            if !had_positions {
                auto_layout(sub);
            }
        });
        group
    }

    /// Join relative filename values onto the configured base directory.
    fn absolutize(&self, ty: &ValueType, value: Value) -> Value {
        if *ty != ValueType::Filename {
            return value;
        }
        let Some(base) = &self.options.base_dir else {
            return value;
        };
        match value {
            Value::String(path) if !path.is_empty() && Path::new(&path).is_relative() => {
                Value::String(base.join(&path).to_string_lossy().into_owned())
            }
            other => other,
        }
    }
}

/// The port a document binding reads from: the named output when given,
/// else the peer's single (first) output.
fn source_port(node: &GraphNode, output: Option<&str>) -> Option<String> {
    if let Some(name) = output {
        return Some(name.to_string());
    }
    match node {
        GraphNode::Polymorphic(n) => n.outputs().first().map(|p| p.name.clone()),
        GraphNode::Group(g) => g.outputs().first().map(|p| p.name.clone()),
        GraphNode::Boundary(_) => None,
    }
}

fn connect_logged(graph: &mut NodeGraph, from: NodeId, from_port: &str, to: NodeId, to_port: &str) {
    if let Err(err) = graph.connect(from, from_port, to, to_port) {
        warn!(%err, from = from_port, to = to_port, "connection could not be restored");
    }
}
