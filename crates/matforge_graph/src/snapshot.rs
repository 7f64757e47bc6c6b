// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session snapshots: a serde-friendly image of a graph, persisted as
//! RON text.
//!
//! Snapshots store category and variant keys rather than full
//! definitions; restoring resolves them against a [`DefinitionIndex`],
//! so a snapshot only loads against a library that still provides its
//! definitions. Unresolvable nodes are skipped with a warning.

use indexmap::IndexMap;
use matforge_mtlx::Value;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::boundary::{BoundaryKind, BoundaryNode};
use crate::defs::DefinitionIndex;
use crate::graph::{Connection, GraphNode, NodeGraph, NodeId};
use crate::group::GroupNode;
use crate::node::VARIANT_PROP;
use crate::port::Port;

/// Error reading or writing session text.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot could not be rendered as RON
    #[error("session serialization failed: {0}")]
    Serialize(#[from] ron::Error),

    /// The text is not a valid session snapshot
    #[error("session deserialization failed: {0}")]
    Deserialize(#[from] ron::error::SpannedError),
}

/// A serializable image of one graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// Graph name
    pub name: String,
    /// Nodes in insertion order
    pub nodes: Vec<SessionNode>,
    /// Connections in insertion order
    pub connections: Vec<SessionConnection>,
}

/// A serializable image of one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNode {
    /// Stable id, referenced by [`SessionConnection`]
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Editor position
    pub position: [f32; 2],
    /// Per-kind payload
    pub kind: SessionNodeKind,
}

/// Node payload by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionNodeKind {
    /// A definition-backed node: resolved against the index on restore
    Node {
        /// Node category
        category: String,
        /// Selected variant key
        variant: String,
        /// Property values, excluding the synthetic variant entry
        properties: IndexMap<String, Value>,
    },
    /// A group node with its nested session
    Group {
        /// External input values
        properties: IndexMap<String, Value>,
        /// The nested graph
        subgraph: Box<SessionData>,
    },
    /// A boundary proxy with its named ports
    Boundary {
        /// Which side of the interface
        side: BoundaryKind,
        /// Named ports in order, placeholder excluded
        ports: Vec<Port>,
    },
}

/// A serializable image of one connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConnection {
    /// Source node id
    pub from_node: NodeId,
    /// Source output port
    pub from_port: String,
    /// Destination node id
    pub to_node: NodeId,
    /// Destination input port
    pub to_port: String,
}

/// Snapshot a graph.
pub fn serialize_session(graph: &NodeGraph) -> SessionData {
    let nodes = graph
        .nodes()
        .map(|(id, node)| {
            let kind = match node {
                GraphNode::Polymorphic(n) => SessionNodeKind::Node {
                    category: n.category().to_string(),
                    variant: n.current_variant().to_string(),
                    properties: n
                        .properties()
                        .iter()
                        .filter(|(name, _)| name.as_str() != VARIANT_PROP)
                        .map(|(name, value)| (name.clone(), value.clone()))
                        .collect(),
                },
                GraphNode::Group(n) => SessionNodeKind::Group {
                    properties: n.properties().clone(),
                    subgraph: Box::new(serialize_session(n.subgraph())),
                },
                GraphNode::Boundary(n) => SessionNodeKind::Boundary {
                    side: n.kind(),
                    ports: n.named_ports().to_vec(),
                },
            };
            SessionNode {
                id,
                name: node.name().to_string(),
                position: node.position(),
                kind,
            }
        })
        .collect();

    let connections = graph
        .connections()
        .iter()
        .map(|c| SessionConnection {
            from_node: c.from_node,
            from_port: c.from_port.clone(),
            to_node: c.to_node,
            to_port: c.to_port.clone(),
        })
        .collect();

    SessionData {
        name: graph.name.clone(),
        nodes,
        connections,
    }
}

/// Rebuild a graph from a snapshot, resolving definitions against the
/// index. Nodes whose category or variant is gone are skipped, along
/// with their connections.
pub fn deserialize_session(data: &SessionData, index: &DefinitionIndex) -> NodeGraph {
    let mut graph = NodeGraph::new(data.name.clone());

    for entry in &data.nodes {
        let node = match &entry.kind {
            SessionNodeKind::Node {
                category,
                variant,
                properties,
            } => {
                let Some(mut node) = index.create_node(category, Some(variant)) else {
                    warn!(
                        name = %entry.name,
                        category,
                        variant,
                        "definition missing, node dropped from session"
                    );
                    continue;
                };
                for (name, value) in properties {
                    node.set_property(name, value.clone());
                }
                GraphNode::Polymorphic(node)
            }
            SessionNodeKind::Group {
                properties,
                subgraph,
            } => {
                let mut group = GroupNode::new(entry.name.clone());
                let inner = deserialize_session(subgraph, index);
                group.edit(|sub| *sub = inner);
                for (name, value) in properties {
                    group.set_property(name, value.clone());
                }
                GraphNode::Group(group)
            }
            SessionNodeKind::Boundary { side, ports } => {
                let mut proxy = BoundaryNode::new(*side);
                for port in ports {
                    proxy.add_named_port(&port.name, port.ty.clone());
                }
                GraphNode::Boundary(proxy)
            }
        };
        let mut node = node;
        node.set_name(entry.name.clone());
        node.set_position(entry.position);
        graph.insert_node(entry.id, node);
    }

    for conn in &data.connections {
        if graph.node(conn.from_node).is_none() || graph.node(conn.to_node).is_none() {
            warn!(
                from = %conn.from_port,
                to = %conn.to_port,
                "connection endpoint dropped, connection skipped"
            );
            continue;
        }
        graph.push_connection(Connection {
            from_node: conn.from_node,
            from_port: conn.from_port.clone(),
            to_node: conn.to_node,
            to_port: conn.to_port.clone(),
        });
    }

    graph
}

/// Render a snapshot as RON text.
pub fn session_to_ron(data: &SessionData) -> Result<String, SnapshotError> {
    Ok(ron::ser::to_string_pretty(
        data,
        ron::ser::PrettyConfig::default(),
    )?)
}

/// Parse RON text into a snapshot.
pub fn session_from_ron(text: &str) -> Result<SessionData, SnapshotError> {
    Ok(ron::from_str(text)?)
}
