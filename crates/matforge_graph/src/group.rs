// SPDX-License-Identifier: MIT OR Apache-2.0
//! Group nodes owning a nested subgraph session.

use indexmap::IndexMap;
use matforge_mtlx::{Value, ValueType};
use tracing::warn;

use crate::boundary::BoundaryKind;
use crate::graph::{GraphNode, NodeGraph};
use crate::port::Port;

/// A node whose contents are a nested [`NodeGraph`].
///
/// The subgraph holds one input proxy and one output proxy; every named
/// port on a proxy has exactly one identically-named external port on
/// the group. [`GroupNode::edit`] keeps that pairing by reconciling
/// external ports after each subgraph edit.
#[derive(Debug, Clone)]
pub struct GroupNode {
    /// Display and serialization name
    pub name: String,
    /// Editor position
    pub position: [f32; 2],
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    properties: IndexMap<String, Value>,
    subgraph: Box<NodeGraph>,
}

impl GroupNode {
    /// Create an empty group. The subgraph starts with just its two
    /// boundary proxies.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            subgraph: Box::new(NodeGraph::subgraph(name.clone())),
            name,
            position: [0.0, 0.0],
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    /// The nested subgraph.
    pub fn subgraph(&self) -> &NodeGraph {
        &self.subgraph
    }

    /// Edit the nested subgraph, then reconcile external ports with the
    /// boundary proxies.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut NodeGraph) -> R) -> R {
        let result = f(&mut self.subgraph);
        self.sync_external_ports();
        result
    }

    /// External input ports, mirroring the input proxy's named ports.
    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    /// External output ports, mirroring the output proxy's named ports.
    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Values of unconnected external inputs, keyed by port name.
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// The value of an external input.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Set the value of an external input. Unknown names are ignored.
    pub fn set_property(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.properties.get_mut(name) {
            *slot = value;
        } else {
            warn!(group = %self.name, property = name, "no such external input");
        }
    }

    /// Declare an external input with a known name and type, growing the
    /// matching named port on the input proxy. Used when rebuilding a
    /// group from a serialized nodegraph interface.
    pub fn declare_input(&mut self, name: &str, ty: ValueType, value: Option<Value>) {
        self.add_proxy_port(BoundaryKind::Input, name, ty);
        self.sync_external_ports();
        if let Some(value) = value {
            self.set_property(name, value);
        }
    }

    /// Declare an external output, growing the matching named port on
    /// the output proxy.
    pub fn declare_output(&mut self, name: &str, ty: ValueType) {
        self.add_proxy_port(BoundaryKind::Output, name, ty);
        self.sync_external_ports();
    }

    fn add_proxy_port(&mut self, kind: BoundaryKind, name: &str, ty: ValueType) {
        let Some((id, _)) = self.subgraph.boundary(kind) else {
            return;
        };
        if let Some(GraphNode::Boundary(proxy)) = self.subgraph.node_mut(id) {
            proxy.add_named_port(name, ty);
        }
    }

    /// Rebuild external ports from the boundary proxies' named ports.
    ///
    /// Input values survive when the port keeps its name and type; new or
    /// retyped inputs get the coercion-table default.
    pub fn sync_external_ports(&mut self) {
        let mut inputs = Vec::new();
        if let Some((_, proxy)) = self.subgraph.boundary(BoundaryKind::Input) {
            for port in proxy.named_ports() {
                inputs.push(Port::input(&port.name, port.ty.clone()));
            }
        }
        let mut outputs = Vec::new();
        if let Some((_, proxy)) = self.subgraph.boundary(BoundaryKind::Output) {
            for port in proxy.named_ports() {
                outputs.push(Port::output(&port.name, port.ty.clone()));
            }
        }

        let old_inputs = std::mem::replace(&mut self.inputs, inputs);
        self.outputs = outputs;

        let mut properties = IndexMap::new();
        for port in &self.inputs {
            let unchanged = old_inputs
                .iter()
                .any(|p| p.name == port.name && p.ty == port.ty);
            let value = if unchanged {
                self.properties.get(&port.name).cloned()
            } else {
                None
            };
            properties.insert(
                port.name.clone(),
                value.unwrap_or_else(|| Value::default_for(&port.ty)),
            );
        }
        self.properties = properties;
    }
}
