// SPDX-License-Identifier: MIT OR Apache-2.0
//! MaterialX XML (de)serialization.
//!
//! Documents read and write the `.mtlx` wire format through a small
//! intermediate element tree; definition libraries are parsed from the
//! same format via [`parse_nodedefs`].

use std::path::Path;

use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::document::{
    DocInput, DocNode, DocNodeGraph, DocOutput, Document, InputBinding, NodeKind,
};
use crate::nodedef::{DefInput, DefOutput, NodeDef, DEFAULT_NODE_GROUP};
use crate::types::{Value, ValueType};

/// Document format version written to the root element.
const MATERIALX_VERSION: &str = "1.38";

/// Error reading or writing document XML.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Underlying XML syntax error
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute
    #[error("malformed XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Structurally invalid document content
    #[error("invalid document: {0}")]
    Invalid(String),

    /// Filesystem error
    #[error("document I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Output was not valid UTF-8
    #[error("document is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Generic XML element used as the parse/serialize intermediate.
#[derive(Debug, Default)]
struct Element {
    tag: String,
    attrs: IndexMap<String, String>,
    children: Vec<Element>,
}

impl Element {
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn require_attr(&self, name: &str) -> Result<&str, DocumentError> {
        self.attr(name).ok_or_else(|| {
            DocumentError::Invalid(format!("<{}> is missing the '{name}' attribute", self.tag))
        })
    }

    fn set(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.insert(name.to_string(), value.into());
    }
}

fn parse_root(text: &str) -> Result<Element, DocumentError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DocumentError::Invalid("unbalanced end tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Eof => break,
            // Text content, comments and processing instructions carry no
            // document semantics in this format.
            _ => {}
        }
    }

    root.ok_or_else(|| DocumentError::Invalid("empty document".into()))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, DocumentError> {
    let tag = String::from_utf8(start.name().as_ref().to_vec())?;
    let mut element = Element::new(tag);
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8(attr.key.as_ref().to_vec())?;
        let value = attr.unescape_value()?.into_owned();
        element.attrs.insert(key, value);
    }
    Ok(element)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), DocumentError> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            write_element(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    }
    Ok(())
}

impl Document {
    /// Parse a document from MaterialX XML text.
    pub fn from_xml_str(text: &str) -> Result<Self, DocumentError> {
        let root = parse_root(text)?;
        if root.tag != "materialx" {
            return Err(DocumentError::Invalid(format!(
                "expected <materialx> root, found <{}>",
                root.tag
            )));
        }

        let mut doc = Document::new();
        for child in &root.children {
            match child.tag.as_str() {
                "nodegraph" => {
                    let graph = nodegraph_from_element(child)?;
                    doc.nodegraphs.insert(graph.name.clone(), graph);
                }
                // Definitions and implementations live in library files and
                // are handled by `parse_nodedefs`.
                "nodedef" | "implementation" | "attributedef" => {}
                _ => {
                    let node = node_from_element(child)?;
                    doc.nodes.insert(node.name.clone(), node);
                }
            }
        }
        Ok(doc)
    }

    /// Serialize to MaterialX XML text.
    pub fn to_xml_string(&self) -> Result<String, DocumentError> {
        let mut root = Element::new("materialx");
        root.set("version", MATERIALX_VERSION);

        for graph in self.nodegraphs.values() {
            root.children.push(nodegraph_to_element(graph));
        }
        for node in self.nodes.values() {
            root.children.push(node_to_element(node));
        }

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        write_element(&mut writer, &root)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// Read a document from a `.mtlx` file.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        Self::from_xml_str(&std::fs::read_to_string(path)?)
    }

    /// Write a document to a `.mtlx` file.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_xml_string()?)?;
        Ok(())
    }
}

const INPUT_KEYS: [&str; 7] = [
    "name",
    "type",
    "value",
    "nodename",
    "nodegraph",
    "output",
    "interfacename",
];

fn input_from_element(element: &Element) -> Result<DocInput, DocumentError> {
    let name = element.require_attr("name")?.to_string();
    let ty = ValueType::from_name(element.require_attr("type")?);

    let binding = if let Some(interface) = element.attr("interfacename") {
        Some(InputBinding::InterfaceName(interface.to_string()))
    } else if let Some(nodegraph) = element.attr("nodegraph") {
        Some(InputBinding::NodeGraphOutput {
            nodegraph: nodegraph.to_string(),
            output: element.require_attr("output")?.to_string(),
        })
    } else {
        element.attr("nodename").map(|node| InputBinding::Node {
            node: node.to_string(),
            output: element.attr("output").map(ToString::to_string),
        })
    };

    let value = element.attr("value").and_then(|text| Value::parse(&ty, text));

    let mut input = DocInput::new(name, ty);
    input.value = value;
    input.binding = binding;
    for (key, attr_value) in &element.attrs {
        if !INPUT_KEYS.contains(&key.as_str()) {
            input.attributes.insert(key.clone(), attr_value.clone());
        }
    }
    Ok(input)
}

fn input_to_element(input: &DocInput) -> Element {
    let mut element = Element::new("input");
    element.set("name", &input.name);
    element.set("type", input.ty.name());
    if let Some(value) = &input.value {
        element.set("value", value.to_value_string());
    }
    match &input.binding {
        Some(InputBinding::Node { node, output }) => {
            element.set("nodename", node);
            if let Some(output) = output {
                element.set("output", output);
            }
        }
        Some(InputBinding::NodeGraphOutput { nodegraph, output }) => {
            element.set("nodegraph", nodegraph);
            element.set("output", output);
        }
        Some(InputBinding::InterfaceName(name)) => {
            element.set("interfacename", name);
        }
        None => {}
    }
    for (key, value) in &input.attributes {
        element.set(key, value);
    }
    element
}

fn output_from_element(element: &Element) -> Result<DocOutput, DocumentError> {
    Ok(DocOutput {
        name: element.require_attr("name")?.to_string(),
        ty: ValueType::from_name(element.require_attr("type")?),
        connected_node: element.attr("nodename").map(ToString::to_string),
    })
}

fn output_to_element(output: &DocOutput) -> Element {
    let mut element = Element::new("output");
    element.set("name", &output.name);
    element.set("type", output.ty.name());
    if let Some(node) = &output.connected_node {
        element.set("nodename", node);
    }
    element
}

fn node_from_element(element: &Element) -> Result<DocNode, DocumentError> {
    let name = element.require_attr("name")?.to_string();
    let ty = ValueType::from_name(element.require_attr("type")?);
    let mut node = DocNode::new(name, element.tag.clone(), ty.clone());
    if ty == ValueType::Material {
        node.kind = NodeKind::Material;
    }

    for (key, value) in &element.attrs {
        if !matches!(key.as_str(), "name" | "type" | "version") {
            node.attributes.insert(key.clone(), value.clone());
        }
    }

    for child in &element.children {
        match child.tag.as_str() {
            "input" => {
                let input = input_from_element(child)?;
                node.inputs.insert(input.name.clone(), input);
            }
            "output" => {
                let output = output_from_element(child)?;
                node.outputs.insert(output.name.clone(), output);
            }
            _ => {}
        }
    }
    Ok(node)
}

fn node_to_element(node: &DocNode) -> Element {
    let mut element = Element::new(node.category.as_str());
    element.set("name", &node.name);
    element.set("type", node.ty.name());
    for (key, value) in &node.attributes {
        element.set(key, value);
    }
    for input in node.inputs.values() {
        element.children.push(input_to_element(input));
    }
    for output in node.outputs.values() {
        element.children.push(output_to_element(output));
    }
    element
}

fn nodegraph_from_element(element: &Element) -> Result<DocNodeGraph, DocumentError> {
    let mut graph = DocNodeGraph::new(element.require_attr("name")?);
    for (key, value) in &element.attrs {
        if key != "name" {
            graph.attributes.insert(key.clone(), value.clone());
        }
    }

    for child in &element.children {
        match child.tag.as_str() {
            "input" => {
                let input = input_from_element(child)?;
                graph.inputs.insert(input.name.clone(), input);
            }
            "output" => {
                let output = output_from_element(child)?;
                graph.outputs.insert(output.name.clone(), output);
            }
            _ => {
                let node = node_from_element(child)?;
                graph.nodes.insert(node.name.clone(), node);
            }
        }
    }
    Ok(graph)
}

fn nodegraph_to_element(graph: &DocNodeGraph) -> Element {
    let mut element = Element::new("nodegraph");
    element.set("name", &graph.name);
    for (key, value) in &graph.attributes {
        element.set(key, value);
    }
    for input in graph.inputs.values() {
        element.children.push(input_to_element(input));
    }
    for node in graph.nodes.values() {
        element.children.push(node_to_element(node));
    }
    for output in graph.outputs.values() {
        element.children.push(output_to_element(output));
    }
    element
}

/// Parse every `<nodedef>` in a library file's XML text.
pub fn parse_nodedefs(text: &str) -> Result<Vec<NodeDef>, DocumentError> {
    let root = parse_root(text)?;
    if root.tag != "materialx" {
        return Err(DocumentError::Invalid(format!(
            "expected <materialx> root, found <{}>",
            root.tag
        )));
    }

    let mut defs = Vec::new();
    for child in &root.children {
        if child.tag != "nodedef" {
            continue;
        }

        let mut def = NodeDef::new(child.require_attr("name")?, child.require_attr("node")?);
        def.node_group = child
            .attr("nodegroup")
            .filter(|group| !group.is_empty())
            .unwrap_or(DEFAULT_NODE_GROUP)
            .to_string();

        for grandchild in &child.children {
            match grandchild.tag.as_str() {
                "input" => {
                    let name = grandchild.require_attr("name")?;
                    let ty = ValueType::from_name(grandchild.require_attr("type")?);
                    let mut input = DefInput::new(name, ty.clone());
                    input.default = grandchild
                        .attr("value")
                        .and_then(|text| Value::parse(&ty, text));
                    input.is_geom_prop = grandchild.attr("defaultgeomprop").is_some();
                    if matches!(ty, ValueType::Float | ValueType::Integer) {
                        let min = grandchild.attr("uimin").and_then(|v| v.parse().ok());
                        let max = grandchild.attr("uimax").and_then(|v| v.parse().ok());
                        if let (Some(min), Some(max)) = (min, max) {
                            input.range = Some((min, max));
                        }
                    }
                    def.inputs.push(input);
                }
                "output" => {
                    def.outputs.push(DefOutput::new(
                        grandchild.require_attr("name")?,
                        ValueType::from_name(grandchild.require_attr("type")?),
                    ));
                }
                _ => {}
            }
        }
        defs.push(def);
    }
    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<materialx version="1.38">
  <nodegraph name="NG_main">
    <image name="tex" type="color3" xpos="1.5" ypos="-2">
      <input name="file" type="filename" value="textures/base.png" colorspace="srgb_texture"/>
    </image>
    <output name="output_tex_out" type="color3" nodename="tex"/>
  </nodegraph>
  <standard_surface name="surf" type="surfaceshader">
    <input name="base_color" type="color3" nodegraph="NG_main" output="output_tex_out"/>
    <input name="specular_roughness" type="float" value="0.4"/>
  </standard_surface>
  <surfacematerial name="mat" type="material">
    <input name="surfaceshader" type="surfaceshader" nodename="surf"/>
  </surfacematerial>
</materialx>
"#;

    #[test]
    fn parses_nodes_graphs_and_bindings() {
        let doc = Document::from_xml_str(SAMPLE).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodegraphs.len(), 1);

        let surf = doc.node("surf").unwrap();
        assert_eq!(surf.category, "standard_surface");
        assert_eq!(
            surf.inputs["base_color"].binding,
            Some(InputBinding::NodeGraphOutput {
                nodegraph: "NG_main".into(),
                output: "output_tex_out".into()
            })
        );
        assert_eq!(surf.inputs["specular_roughness"].value, Some(Value::Float(0.4)));

        let mat = doc.node("mat").unwrap();
        assert_eq!(mat.kind, NodeKind::Material);

        let graph = doc.nodegraph("NG_main").unwrap();
        let tex = &graph.nodes["tex"];
        assert_eq!(tex.position_attrs(), Some([1.5, -2.0]));
        assert_eq!(
            tex.inputs["file"].attributes.get("colorspace").map(String::as_str),
            Some("srgb_texture")
        );
        assert_eq!(graph.outputs["output_tex_out"].connected_node.as_deref(), Some("tex"));
    }

    #[test]
    fn xml_round_trips() {
        let doc = Document::from_xml_str(SAMPLE).unwrap();
        let text = doc.to_xml_string().unwrap();
        let again = Document::from_xml_str(&text).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn parses_nodedefs() {
        let text = r#"<?xml version="1.0"?>
<materialx version="1.38">
  <nodedef name="ND_constant_float" node="constant" nodegroup="procedural">
    <input name="value" type="float" value="0" uimin="0" uimax="1"/>
    <output name="out" type="float"/>
  </nodedef>
  <nodedef name="ND_constant_color3" node="constant" nodegroup="procedural">
    <input name="value" type="color3" value="0, 0, 0"/>
    <output name="out" type="color3"/>
  </nodedef>
</materialx>
"#;
        let defs = parse_nodedefs(text).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].variant_key(), "float");
        assert_eq!(defs[0].inputs[0].range, Some((0.0, 1.0)));
        assert_eq!(defs[1].inputs[0].default, Some(Value::Color3([0.0; 3])));
    }
}
