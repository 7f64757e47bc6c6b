// SPDX-License-Identifier: MIT OR Apache-2.0
//! The hierarchical shading-network document tree.
//!
//! This is the serialization target and source of the graph translator: a
//! root [`Document`] holding nodes, materials and nested nodegraphs, each
//! node holding typed inputs (with a value or a connection binding) and
//! outputs. Persisted 2D positions travel as freeform `xpos`/`ypos` string
//! attributes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{Value, ValueType};

/// Name of the `xpos` position attribute.
pub const ATTR_XPOS: &str = "xpos";
/// Name of the `ypos` position attribute.
pub const ATTR_YPOS: &str = "ypos";

/// Document node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Ordinary function node
    Node,
    /// Material node
    Material,
}

/// How a document input receives its upstream value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputBinding {
    /// Connected to another node in the same scope.
    Node {
        /// Source node name
        node: String,
        /// Source output name, for multi-output sources
        output: Option<String>,
    },
    /// Connected to a declared output of a sibling nodegraph.
    NodeGraphOutput {
        /// Source nodegraph name
        nodegraph: String,
        /// Declared output name on that nodegraph
        output: String,
    },
    /// Forwarded to a named interface port of the enclosing nodegraph.
    InterfaceName(String),
}

/// A typed input on a document node or nodegraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocInput {
    /// Input name
    pub name: String,
    /// Semantic type
    pub ty: ValueType,
    /// Literal value, absent when connected
    pub value: Option<Value>,
    /// Upstream connection, if any
    pub binding: Option<InputBinding>,
    /// Freeform string attributes (colorspace, ...)
    pub attributes: IndexMap<String, String>,
}

impl DocInput {
    /// Create an unconnected input without a value.
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
            value: None,
            binding: None,
            attributes: IndexMap::new(),
        }
    }

    /// Set the literal value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

/// A typed output slot on a document node or nodegraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocOutput {
    /// Output name
    pub name: String,
    /// Semantic type
    pub ty: ValueType,
    /// For nodegraph outputs: the internal node feeding this output.
    pub connected_node: Option<String>,
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNode {
    /// Node name, unique within its scope
    pub name: String,
    /// Node category (the definition's node string, e.g. `constant`)
    pub category: String,
    /// Declared node type: the single output type, or `multioutput`
    pub ty: ValueType,
    /// Node or material
    pub kind: NodeKind,
    /// Freeform string attributes, including persisted positions
    pub attributes: IndexMap<String, String>,
    /// Inputs keyed by name
    pub inputs: IndexMap<String, DocInput>,
    /// Materialized outputs keyed by name
    pub outputs: IndexMap<String, DocOutput>,
}

impl DocNode {
    /// Create a node with no inputs or outputs.
    pub fn new(name: impl Into<String>, category: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ty,
            kind: NodeKind::Node,
            attributes: IndexMap::new(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Whether this node is declared multi-output.
    pub fn is_multi_output(&self) -> bool {
        self.ty == ValueType::MultiOutput
    }

    /// Add an input, replacing any existing input of the same name.
    pub fn add_input(&mut self, input: DocInput) -> &mut DocInput {
        let name = input.name.clone();
        self.inputs.insert(name.clone(), input);
        &mut self.inputs[&name]
    }

    /// Materialize an output slot if not already present.
    ///
    /// Multi-output document nodes only carry the outputs that are actually
    /// referenced; the first reference synthesizes the slot. Calling this
    /// twice for the same name is a no-op.
    pub fn ensure_output(&mut self, name: &str, ty: ValueType) -> &mut DocOutput {
        if !self.outputs.contains_key(name) {
            self.outputs.insert(
                name.to_string(),
                DocOutput {
                    name: name.to_string(),
                    ty,
                    connected_node: None,
                },
            );
        }
        &mut self.outputs[name]
    }

    /// Set a freeform string attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Get a freeform string attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Persisted position from the `xpos`/`ypos` attributes, unscaled.
    pub fn position_attrs(&self) -> Option<[f32; 2]> {
        let x = self.attribute(ATTR_XPOS)?.parse().ok()?;
        let y = self.attribute(ATTR_YPOS)?.parse().ok()?;
        Some([x, y])
    }

    /// Write the `xpos`/`ypos` attributes.
    pub fn set_position_attrs(&mut self, pos: [f32; 2]) {
        self.set_attribute(ATTR_XPOS, pos[0].to_string());
        self.set_attribute(ATTR_YPOS, pos[1].to_string());
    }
}

/// A nested nodegraph in the document tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocNodeGraph {
    /// Nodegraph name, unique within the document
    pub name: String,
    /// Freeform string attributes
    pub attributes: IndexMap<String, String>,
    /// Child nodes keyed by name
    pub nodes: IndexMap<String, DocNode>,
    /// Declared interface inputs keyed by name
    pub inputs: IndexMap<String, DocInput>,
    /// Declared outputs keyed by name
    pub outputs: IndexMap<String, DocOutput>,
}

impl DocNodeGraph {
    /// Create an empty nodegraph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a child node, returning a mutable reference to it.
    pub fn add_node(&mut self, node: DocNode) -> &mut DocNode {
        let name = node.name.clone();
        self.nodes.insert(name.clone(), node);
        &mut self.nodes[&name]
    }

    /// Declare an output fed by an internal node.
    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        ty: ValueType,
        connected_node: Option<String>,
    ) -> &mut DocOutput {
        let name = name.into();
        self.outputs.insert(
            name.clone(),
            DocOutput {
                name: name.clone(),
                ty,
                connected_node,
            },
        );
        &mut self.outputs[&name]
    }

    /// Declare an interface input.
    pub fn add_input(&mut self, input: DocInput) -> &mut DocInput {
        let name = input.name.clone();
        self.inputs.insert(name.clone(), input);
        &mut self.inputs[&name]
    }
}

/// The root document: top-level nodes, materials and nodegraphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Top-level nodes (including materials) keyed by name
    pub nodes: IndexMap<String, DocNode>,
    /// Nested nodegraphs keyed by name
    pub nodegraphs: IndexMap<String, DocNodeGraph>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level node, returning a mutable reference to it.
    pub fn add_node(&mut self, node: DocNode) -> &mut DocNode {
        let name = node.name.clone();
        self.nodes.insert(name.clone(), node);
        &mut self.nodes[&name]
    }

    /// Add a material node.
    pub fn add_material(&mut self, name: impl Into<String>, category: impl Into<String>) -> &mut DocNode {
        let mut node = DocNode::new(name, category, ValueType::Material);
        node.kind = NodeKind::Material;
        self.add_node(node)
    }

    /// Add an empty nodegraph, returning a mutable reference to it.
    pub fn add_nodegraph(&mut self, name: impl Into<String>) -> &mut DocNodeGraph {
        let graph = DocNodeGraph::new(name);
        let name = graph.name.clone();
        self.nodegraphs.insert(name.clone(), graph);
        &mut self.nodegraphs[&name]
    }

    /// Look up a top-level node by name.
    pub fn node(&self, name: &str) -> Option<&DocNode> {
        self.nodes.get(name)
    }

    /// Look up a nodegraph by name.
    pub fn nodegraph(&self, name: &str) -> Option<&DocNodeGraph> {
        self.nodegraphs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_output_is_idempotent() {
        let mut node = DocNode::new("tex", "image", ValueType::MultiOutput);
        node.ensure_output("out", ValueType::Color3);
        node.ensure_output("out", ValueType::Color3);
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.outputs["out"].ty, ValueType::Color3);
    }

    #[test]
    fn position_attrs_round_trip() {
        let mut node = DocNode::new("n", "constant", ValueType::Float);
        assert_eq!(node.position_attrs(), None);
        node.set_position_attrs([1.5, -2.0]);
        assert_eq!(node.position_attrs(), Some([1.5, -2.0]));
    }

    #[test]
    fn material_nodes_have_material_kind() {
        let mut doc = Document::new();
        doc.add_material("mat", "surfacematerial");
        assert_eq!(doc.node("mat").unwrap().kind, NodeKind::Material);
        assert_eq!(doc.node("mat").unwrap().ty, ValueType::Material);
    }
}
