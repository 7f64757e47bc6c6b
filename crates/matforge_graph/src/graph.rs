// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editable node graph: nodes, connections and the structural edit
//! operations (connect, disconnect, retype).

use indexmap::IndexMap;
use matforge_mtlx::ValueType;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::boundary::{BoundaryKind, BoundaryNode};
use crate::group::GroupNode;
use crate::node::{PolymorphicNode, VARIANT_PROP};

/// Stable identifier of a node within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Allocate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Why a connection could not be made.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectionError {
    /// One endpoint node does not exist in this graph
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The named port does not exist on the endpoint node
    #[error("node '{node}' has no port '{port}' on that side")]
    UnknownPort {
        /// Endpoint node name
        node: String,
        /// Missing port name
        port: String,
    },

    /// Both endpoints are on the same node
    #[error("cannot connect node '{0}' to itself")]
    SelfLoop(String),

    /// Endpoint types disagree
    #[error("cannot connect {from} output to {to} input")]
    TypeMismatch {
        /// Source port type
        from: ValueType,
        /// Destination port type
        to: ValueType,
    },

    /// Both endpoints are untyped boundary placeholders
    #[error("cannot connect two placeholder ports")]
    UntypedEndpoints,
}

/// A node in the graph.
#[derive(Debug, Clone)]
pub enum GraphNode {
    /// A definition-backed node
    Polymorphic(PolymorphicNode),
    /// A node owning a nested subgraph
    Group(GroupNode),
    /// An interface proxy inside a subgraph
    Boundary(BoundaryNode),
}

impl GraphNode {
    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Polymorphic(n) => &n.name,
            Self::Group(n) => &n.name,
            Self::Boundary(n) => &n.name,
        }
    }

    /// Rename the node. Uniqueness is the graph's concern.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Self::Polymorphic(n) => n.name = name,
            Self::Group(n) => n.name = name,
            Self::Boundary(n) => n.name = name,
        }
    }

    /// Editor position.
    pub fn position(&self) -> [f32; 2] {
        match self {
            Self::Polymorphic(n) => n.position,
            Self::Group(n) => n.position,
            Self::Boundary(n) => n.position,
        }
    }

    /// Move the node.
    pub fn set_position(&mut self, position: [f32; 2]) {
        match self {
            Self::Polymorphic(n) => n.position = position,
            Self::Group(n) => n.position = position,
            Self::Boundary(n) => n.position = position,
        }
    }

    /// Whether the node has an output-side port with this name.
    pub fn has_output_port(&self, port: &str) -> bool {
        match self {
            Self::Polymorphic(n) => n.outputs().iter().any(|p| p.name == port),
            Self::Group(n) => n.outputs().iter().any(|p| p.name == port),
            Self::Boundary(n) => n
                .ports()
                .iter()
                .any(|p| p.name == port && p.direction == crate::port::PortDirection::Output),
        }
    }

    /// Whether the node has an input-side port with this name.
    pub fn has_input_port(&self, port: &str) -> bool {
        match self {
            Self::Polymorphic(n) => n.inputs().iter().any(|p| p.name == port),
            Self::Group(n) => n.inputs().iter().any(|p| p.name == port),
            Self::Boundary(n) => n
                .ports()
                .iter()
                .any(|p| p.name == port && p.direction == crate::port::PortDirection::Input),
        }
    }

    /// Resolved type of an output port. `None` for missing ports and for
    /// the untyped boundary placeholder.
    pub fn output_type(&self, port: &str) -> Option<&ValueType> {
        match self {
            Self::Polymorphic(n) => n.output_type(port),
            Self::Group(n) => n.outputs().iter().find(|p| p.name == port).map(|p| &p.ty),
            Self::Boundary(n) => n.port_type(port),
        }
    }

    /// Resolved type of an input port. `None` for missing ports and for
    /// the untyped boundary placeholder.
    pub fn input_type(&self, port: &str) -> Option<&ValueType> {
        match self {
            Self::Polymorphic(n) => n.input_type(port),
            Self::Group(n) => n.inputs().iter().find(|p| p.name == port).map(|p| &p.ty),
            Self::Boundary(n) => n.port_type(port),
        }
    }

    /// Borrow as a polymorphic node.
    pub fn as_polymorphic(&self) -> Option<&PolymorphicNode> {
        match self {
            Self::Polymorphic(n) => Some(n),
            _ => None,
        }
    }

    /// Mutably borrow as a polymorphic node.
    pub fn as_polymorphic_mut(&mut self) -> Option<&mut PolymorphicNode> {
        match self {
            Self::Polymorphic(n) => Some(n),
            _ => None,
        }
    }

    /// Borrow as a group node.
    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Self::Group(n) => Some(n),
            _ => None,
        }
    }

    /// Mutably borrow as a group node.
    pub fn as_group_mut(&mut self) -> Option<&mut GroupNode> {
        match self {
            Self::Group(n) => Some(n),
            _ => None,
        }
    }

    /// Borrow as a boundary proxy.
    pub fn as_boundary(&self) -> Option<&BoundaryNode> {
        match self {
            Self::Boundary(n) => Some(n),
            _ => None,
        }
    }
}

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Source node
    pub from_node: NodeId,
    /// Source output port name
    pub from_port: String,
    /// Destination node
    pub to_node: NodeId,
    /// Destination input port name
    pub to_port: String,
}

/// An editable node graph.
///
/// Nodes are keyed by [`NodeId`] in insertion order; connections keep
/// insertion order too, so serialization is deterministic. Display names
/// are unique within the graph.
#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    /// Graph name (the nodegraph element name when nested)
    pub name: String,
    nodes: IndexMap<NodeId, GraphNode>,
    connections: Vec<Connection>,
}

impl NodeGraph {
    /// Create an empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a subgraph session: an empty graph holding one input proxy
    /// and one output proxy.
    pub fn subgraph(name: impl Into<String>) -> Self {
        let mut graph = Self::new(name);
        graph.add_node(GraphNode::Boundary(BoundaryNode::new(BoundaryKind::Input)));
        graph.add_node(GraphNode::Boundary(BoundaryNode::new(BoundaryKind::Output)));
        graph
    }

    /// Insert a node, allocating a unique display name, and return its id.
    pub fn add_node(&mut self, mut node: GraphNode) -> NodeId {
        let base = match &node {
            GraphNode::Polymorphic(n) if n.name.is_empty() => n.category().to_string(),
            GraphNode::Group(n) if n.name.is_empty() => "group".to_string(),
            other => other.name().to_string(),
        };
        let name = self.unique_name(&base);
        node.set_name(name);
        let id = NodeId::new();
        self.nodes.insert(id, node);
        id
    }

    /// Insert a node under a caller-provided id, keeping the name unique.
    /// Used when restoring a serialized session.
    pub(crate) fn insert_node(&mut self, id: NodeId, mut node: GraphNode) {
        let name = self.unique_name(node.name());
        node.set_name(name);
        self.nodes.insert(id, node);
    }

    /// Remove a node and every connection touching it. Boundary ports
    /// orphaned by the removed connections are pruned.
    pub fn remove_node(&mut self, id: NodeId) -> Option<GraphNode> {
        let node = self.nodes.shift_remove(&id)?;
        let removed: Vec<Connection> = self
            .connections
            .iter()
            .filter(|c| c.from_node == id || c.to_node == id)
            .cloned()
            .collect();
        self.connections
            .retain(|c| c.from_node != id && c.to_node != id);
        for conn in removed {
            self.prune_boundary_endpoint(conn.from_node, &conn.from_port);
            self.prune_boundary_endpoint(conn.to_node, &conn.to_port);
        }
        Some(node)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// Mutably look up a node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(&id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// All nodes, mutably.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut GraphNode)> {
        self.nodes.iter_mut().map(|(id, node)| (*id, node))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by display name.
    pub fn find_by_name(&self, name: &str) -> Option<(NodeId, &GraphNode)> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name() == name)
            .map(|(id, node)| (*id, node))
    }

    /// The boundary proxy of the given kind, if this is a subgraph.
    pub fn boundary(&self, kind: BoundaryKind) -> Option<(NodeId, &BoundaryNode)> {
        self.nodes.iter().find_map(|(id, node)| match node {
            GraphNode::Boundary(b) if b.kind() == kind => Some((*id, b)),
            _ => None,
        })
    }

    /// All connections in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The connection terminating at the given input, if any.
    pub fn connection_into(&self, to: NodeId, port: &str) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.to_node == to && c.to_port == port)
    }

    /// Connections originating at the given node.
    pub fn connections_from(&self, from: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.from_node == from)
    }

    /// Allocate a display name not used by any node (`base`, `base_1`, …).
    pub fn unique_name(&self, base: &str) -> String {
        let taken = |name: &str| self.nodes.values().any(|n| n.name() == name);
        let base = if base.is_empty() { "node" } else { base };
        if !taken(base) {
            return base.to_string();
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{base}_{counter}");
            if !taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Connect an output port to an input port.
    ///
    /// Endpoint existence, direction and type agreement are validated. An
    /// input holds at most one connection; connecting again replaces the
    /// previous one. Connecting through a boundary placeholder grows a
    /// named port typed after the opposite endpoint; the returned
    /// connection carries the grown port name.
    pub fn connect(
        &mut self,
        from: NodeId,
        from_port: &str,
        to: NodeId,
        to_port: &str,
    ) -> Result<Connection, ConnectionError> {
        let from_node = self
            .nodes
            .get(&from)
            .ok_or(ConnectionError::UnknownNode(from))?;
        let to_node = self
            .nodes
            .get(&to)
            .ok_or(ConnectionError::UnknownNode(to))?;
        if from == to {
            return Err(ConnectionError::SelfLoop(from_node.name().to_string()));
        }
        if !from_node.has_output_port(from_port) {
            return Err(ConnectionError::UnknownPort {
                node: from_node.name().to_string(),
                port: from_port.to_string(),
            });
        }
        if !to_node.has_input_port(to_port) {
            return Err(ConnectionError::UnknownPort {
                node: to_node.name().to_string(),
                port: to_port.to_string(),
            });
        }

        let from_ty = from_node.output_type(from_port).cloned();
        let to_ty = to_node.input_type(to_port).cloned();
        match (&from_ty, &to_ty) {
            (None, None) => return Err(ConnectionError::UntypedEndpoints),
            (Some(from), Some(to)) if from != to => {
                return Err(ConnectionError::TypeMismatch {
                    from: from.clone(),
                    to: to.clone(),
                })
            }
            _ => {}
        }

        let from_name = from_node.name().to_string();
        let to_name = to_node.name().to_string();
        let mut from_port = from_port.to_string();
        let mut to_port = to_port.to_string();

        // An untyped endpoint is a boundary placeholder; grow a named
        // port typed after the opposite endpoint and reroute.
        if from_ty.is_none() {
            if let (Some(GraphNode::Boundary(proxy)), Some(ty)) =
                (self.nodes.get_mut(&from), to_ty.clone())
            {
                from_port = proxy.grow(&to_name, ty);
            }
        }
        if to_ty.is_none() {
            if let (Some(GraphNode::Boundary(proxy)), Some(ty)) =
                (self.nodes.get_mut(&to), from_ty.clone())
            {
                to_port = proxy.grow(&from_name, ty);
            }
        }

        let displaced: Vec<Connection> = self
            .connections
            .iter()
            .filter(|c| c.to_node == to && c.to_port == to_port)
            .cloned()
            .collect();
        self.connections
            .retain(|c| !(c.to_node == to && c.to_port == to_port));
        for old in displaced {
            self.prune_boundary_endpoint(old.from_node, &old.from_port);
        }

        let conn = Connection {
            from_node: from,
            from_port,
            to_node: to,
            to_port,
        };
        self.connections.push(conn.clone());
        Ok(conn)
    }

    /// Restore a connection verbatim, without validation or placeholder
    /// growth. Used when restoring a serialized session.
    pub(crate) fn push_connection(&mut self, conn: Connection) {
        self.connections.push(conn);
    }

    /// Remove a connection. Boundary ports left without any connection
    /// are pruned.
    pub fn disconnect(&mut self, conn: &Connection) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c != conn);
        if self.connections.len() == before {
            return false;
        }
        self.prune_boundary_endpoint(conn.from_node, &conn.from_port);
        self.prune_boundary_endpoint(conn.to_node, &conn.to_port);
        true
    }

    fn prune_boundary_endpoint(&mut self, node: NodeId, port: &str) {
        let still_used = self.connections.iter().any(|c| {
            (c.from_node == node && c.from_port == port)
                || (c.to_node == node && c.to_port == port)
        });
        if still_used {
            return;
        }
        if let Some(GraphNode::Boundary(proxy)) = self.nodes.get_mut(&node) {
            proxy.remove_port(port);
        }
    }

    /// Switch a polymorphic node to another variant, preserving what the
    /// new variant can still express.
    ///
    /// Property values survive when the input keeps its name and declared
    /// type; everything else resets to the coercion-table default.
    /// Connections survive when the peer's resolved type equals the new
    /// port type; the rest are dropped (and orphaned boundary ports
    /// pruned). Unknown variants warn and leave the node untouched.
    pub fn change_node_type(&mut self, id: NodeId, variant: &str) -> bool {
        let Some(GraphNode::Polymorphic(node)) = self.nodes.get(&id) else {
            warn!(%id, "retype target is not a definition-backed node");
            return false;
        };
        if node.current_variant() == variant {
            return true;
        }
        let old_props = node.properties().clone();
        let old_input_types: IndexMap<String, ValueType> = node
            .inputs()
            .iter()
            .map(|p| (p.name.clone(), p.ty.clone()))
            .collect();

        let Some(GraphNode::Polymorphic(node)) = self.nodes.get_mut(&id) else {
            return false;
        };
        if !node.set_variant(variant) {
            warn!(node = %node.name, variant, "unknown variant, keeping current type");
            return false;
        }
        debug!(node = %node.name, variant, "node retyped");

        let new_input_types: IndexMap<String, ValueType> = node
            .inputs()
            .iter()
            .map(|p| (p.name.clone(), p.ty.clone()))
            .collect();
        for (name, value) in &old_props {
            if name == VARIANT_PROP {
                continue;
            }
            if new_input_types.contains_key(name)
                && old_input_types.get(name) == new_input_types.get(name)
            {
                node.set_property(name, value.clone());
            }
        }

        let detached: Vec<Connection> = self
            .connections
            .iter()
            .filter(|c| c.from_node == id || c.to_node == id)
            .cloned()
            .collect();
        self.connections
            .retain(|c| c.from_node != id && c.to_node != id);
        for conn in detached {
            let compatible = if conn.to_node == id {
                let port = self
                    .nodes
                    .get(&id)
                    .and_then(|n| n.input_type(&conn.to_port).cloned());
                let peer = self
                    .nodes
                    .get(&conn.from_node)
                    .and_then(|n| n.output_type(&conn.from_port).cloned());
                matches!((port, peer), (Some(a), Some(b)) if a == b)
            } else {
                let port = self
                    .nodes
                    .get(&id)
                    .and_then(|n| n.output_type(&conn.from_port).cloned());
                let peer = self
                    .nodes
                    .get(&conn.to_node)
                    .and_then(|n| n.input_type(&conn.to_port).cloned());
                matches!((port, peer), (Some(a), Some(b)) if a == b)
            };
            if compatible {
                self.connections.push(conn);
            } else {
                debug!(
                    from = %conn.from_port,
                    to = %conn.to_port,
                    "connection incompatible with new type, dropped"
                );
                self.prune_boundary_endpoint(conn.from_node, &conn.from_port);
                self.prune_boundary_endpoint(conn.to_node, &conn.to_port);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::VariantTable;
    use matforge_mtlx::{DefInput, DefOutput, NodeDef, Value};
    use std::sync::Arc;

    fn constant_table() -> VariantTable {
        let mut table = VariantTable::new();
        for ty in [ValueType::Float, ValueType::Color3] {
            let mut def = NodeDef::new(format!("ND_constant_{}", ty.name()), "constant");
            def.inputs
                .push(DefInput::new("value", ty.clone()).with_default(Value::default_for(&ty)));
            def.outputs.push(DefOutput::new("out", ty.clone()));
            table.insert(ty.name().to_string(), Arc::new(def));
        }
        table
    }

    fn mix_table() -> VariantTable {
        let mut table = VariantTable::new();
        for ty in [ValueType::Float, ValueType::Color3] {
            let mut def = NodeDef::new(format!("ND_mix_{}", ty.name()), "mix");
            def.inputs.push(DefInput::new("fg", ty.clone()));
            def.inputs.push(DefInput::new("bg", ty.clone()));
            def.inputs.push(DefInput::new("mix", ValueType::Float));
            def.outputs.push(DefOutput::new("out", ty.clone()));
            table.insert(ty.name().to_string(), Arc::new(def));
        }
        table
    }

    fn constant(variant: &str) -> GraphNode {
        GraphNode::Polymorphic(PolymorphicNode::new(
            "constant",
            constant_table(),
            variant.into(),
        ))
    }

    #[test]
    fn display_names_are_unique() {
        let mut graph = NodeGraph::new("root");
        let a = graph.add_node(constant("float"));
        let b = graph.add_node(constant("float"));
        assert_eq!(graph.node(a).map(GraphNode::name), Some("constant"));
        assert_eq!(graph.node(b).map(GraphNode::name), Some("constant_1"));
    }

    #[test]
    fn connect_validates_endpoints() {
        let mut graph = NodeGraph::new("root");
        let a = graph.add_node(constant("float"));
        let b = graph.add_node(GraphNode::Polymorphic(PolymorphicNode::new(
            "mix",
            mix_table(),
            "float".into(),
        )));

        assert!(matches!(
            graph.connect(a, "out", a, "value"),
            Err(ConnectionError::SelfLoop(_))
        ));
        assert!(matches!(
            graph.connect(a, "missing", b, "fg"),
            Err(ConnectionError::UnknownPort { .. })
        ));
        graph.connect(a, "out", b, "fg").unwrap();
        assert_eq!(graph.connections().len(), 1);
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let mut graph = NodeGraph::new("root");
        let a = graph.add_node(constant("color3"));
        let b = graph.add_node(GraphNode::Polymorphic(PolymorphicNode::new(
            "mix",
            mix_table(),
            "float".into(),
        )));
        let err = graph.connect(a, "out", b, "fg").unwrap_err();
        assert_eq!(
            err,
            ConnectionError::TypeMismatch {
                from: ValueType::Color3,
                to: ValueType::Float,
            }
        );
        assert_eq!(err.to_string(), "cannot connect color3 output to float input");
    }

    #[test]
    fn second_connection_into_an_input_replaces_the_first() {
        let mut graph = NodeGraph::new("root");
        let a = graph.add_node(constant("float"));
        let b = graph.add_node(constant("float"));
        let mix = graph.add_node(GraphNode::Polymorphic(PolymorphicNode::new(
            "mix",
            mix_table(),
            "float".into(),
        )));

        graph.connect(a, "out", mix, "fg").unwrap();
        graph.connect(b, "out", mix, "fg").unwrap();
        assert_eq!(graph.connections().len(), 1);
        assert_eq!(graph.connection_into(mix, "fg").unwrap().from_node, b);
    }

    #[test]
    fn placeholder_connection_grows_a_named_port() {
        let mut graph = NodeGraph::subgraph("inside");
        let c = graph.add_node(constant("color3"));
        let (out_proxy, _) = graph.boundary(BoundaryKind::Output).unwrap();

        let conn = graph
            .connect(c, "out", out_proxy, crate::boundary::NEXT_OUTPUT)
            .unwrap();
        assert_eq!(conn.to_port, "out_constant");
        let proxy = graph.node(out_proxy).unwrap().as_boundary().unwrap();
        assert_eq!(proxy.named_ports().len(), 1);
        assert_eq!(proxy.port_type("out_constant"), Some(&ValueType::Color3));

        // the named port disappears with its connection
        graph.disconnect(&conn);
        let proxy = graph.node(out_proxy).unwrap().as_boundary().unwrap();
        assert_eq!(proxy.named_ports().len(), 0);
    }

    #[test]
    fn retype_preserves_compatible_values_and_drops_the_rest() {
        let mut graph = NodeGraph::new("root");
        let mix = graph.add_node(GraphNode::Polymorphic(PolymorphicNode::new(
            "mix",
            mix_table(),
            "color3".into(),
        )));
        {
            let node = graph.node_mut(mix).unwrap().as_polymorphic_mut().unwrap();
            node.set_property("mix", Value::Float(0.25));
            node.set_property("fg", Value::Color3([1.0, 0.0, 0.0]));
        }

        assert!(graph.change_node_type(mix, "float"));
        let node = graph.node(mix).unwrap().as_polymorphic().unwrap();
        // same name and type: survives
        assert_eq!(node.property("mix"), Some(&Value::Float(0.25)));
        // same name, different type: reset to default
        assert_eq!(node.property("fg"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn retype_keeps_connections_whose_types_still_agree() {
        let mut graph = NodeGraph::new("root");
        let float_src = graph.add_node(constant("float"));
        let color_src = graph.add_node(constant("color3"));
        let mix = graph.add_node(GraphNode::Polymorphic(PolymorphicNode::new(
            "mix",
            mix_table(),
            "color3".into(),
        )));

        graph.connect(color_src, "out", mix, "fg").unwrap();
        graph.connect(float_src, "out", mix, "mix").unwrap();
        assert_eq!(graph.connections().len(), 2);

        assert!(graph.change_node_type(mix, "float"));
        // the color3 feed is dropped, the float feed survives
        assert_eq!(graph.connections().len(), 1);
        assert_eq!(graph.connection_into(mix, "mix").unwrap().from_node, float_src);
        assert!(graph.connection_into(mix, "fg").is_none());
    }

    #[test]
    fn retype_to_unknown_variant_is_a_no_op() {
        let mut graph = NodeGraph::new("root");
        let c = graph.add_node(constant("float"));
        assert!(!graph.change_node_type(c, "matrix33"));
        let node = graph.node(c).unwrap().as_polymorphic().unwrap();
        assert_eq!(node.current_variant(), "float");
    }
}
