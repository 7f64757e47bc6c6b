// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural and type validation of documents.
//!
//! Validation is advisory: translation and saving never block on a failed
//! report, the result is surfaced to the user as a status message.

use crate::document::{DocInput, DocNode, DocNodeGraph, Document, InputBinding};
use crate::types::ValueType;

/// Outcome of validating a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Human-readable problems, empty when the document is valid
    pub messages: Vec<String>,
}

impl ValidationReport {
    /// Whether the document passed validation.
    pub fn valid(&self) -> bool {
        self.messages.is_empty()
    }

    /// All problems joined into one status message.
    pub fn message(&self) -> String {
        self.messages.join("\n")
    }

    fn problem(&mut self, message: String) {
        self.messages.push(message);
    }
}

/// Validate a document's structure and types.
pub fn validate(doc: &Document) -> ValidationReport {
    let mut report = ValidationReport::default();

    for node in doc.nodes.values() {
        for input in node.inputs.values() {
            check_binding(doc, None, &node.name, input, &mut report);
        }
    }

    for graph in doc.nodegraphs.values() {
        for node in graph.nodes.values() {
            for input in node.inputs.values() {
                check_binding(doc, Some(graph), &node.name, input, &mut report);
            }
        }

        for output in graph.outputs.values() {
            match &output.connected_node {
                None => report.problem(format!(
                    "nodegraph '{}' output '{}' is not connected to an internal node",
                    graph.name, output.name
                )),
                Some(source) => {
                    if let Some(source_node) = graph.nodes.get(source) {
                        check_source_type(
                            &format!("nodegraph '{}' output '{}'", graph.name, output.name),
                            source_node,
                            None,
                            &output.ty,
                            &mut report,
                        );
                    } else {
                        report.problem(format!(
                            "nodegraph '{}' output '{}' references missing node '{source}'",
                            graph.name, output.name
                        ));
                    }
                }
            }
        }
    }

    report
}

fn check_binding(
    doc: &Document,
    scope: Option<&DocNodeGraph>,
    node_name: &str,
    input: &DocInput,
    report: &mut ValidationReport,
) {
    let context = format!("input '{}' of node '{node_name}'", input.name);
    match &input.binding {
        None => {}
        Some(InputBinding::Node { node, output }) => {
            let sibling = match scope {
                Some(graph) => graph.nodes.get(node),
                None => doc.nodes.get(node),
            };
            match sibling {
                None => report.problem(format!("{context} references missing node '{node}'")),
                Some(source) => {
                    check_source_type(&context, source, output.as_deref(), &input.ty, report);
                }
            }
        }
        Some(InputBinding::NodeGraphOutput { nodegraph, output }) => {
            match doc.nodegraph(nodegraph) {
                None => {
                    report.problem(format!("{context} references missing nodegraph '{nodegraph}'"));
                }
                Some(graph) => match graph.outputs.get(output) {
                    None => report.problem(format!(
                        "{context} references missing output '{output}' of nodegraph '{nodegraph}'"
                    )),
                    Some(graph_output) => {
                        if graph_output.ty != input.ty {
                            report.problem(format!(
                                "{context} has type {} but nodegraph output '{output}' has type {}",
                                input.ty, graph_output.ty
                            ));
                        }
                    }
                },
            }
        }
        Some(InputBinding::InterfaceName(name)) => match scope {
            None => report.problem(format!(
                "{context} uses interface name '{name}' outside a nodegraph"
            )),
            Some(graph) => {
                if !graph.inputs.contains_key(name) {
                    report.problem(format!(
                        "{context} references undeclared interface '{name}' of nodegraph '{}'",
                        graph.name
                    ));
                }
            }
        },
    }
}

fn check_source_type(
    context: &str,
    source: &DocNode,
    output: Option<&str>,
    expected: &ValueType,
    report: &mut ValidationReport,
) {
    let source_ty = if source.is_multi_output() {
        let Some(output_name) = output else {
            report.problem(format!(
                "{context} connects to multi-output node '{}' without naming an output",
                source.name
            ));
            return;
        };
        match source.outputs.get(output_name) {
            Some(out) => &out.ty,
            None => {
                report.problem(format!(
                    "{context} references missing output '{output_name}' of node '{}'",
                    source.name
                ));
                return;
            }
        }
    } else {
        &source.ty
    };

    if source_ty != expected && !matches!(source_ty, ValueType::Custom(_)) {
        report.problem(format!(
            "{context} has type {expected} but source '{}' produces {source_ty}",
            source.name
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocInput, DocNode};
    use crate::types::Value;

    fn surface_doc() -> Document {
        let mut doc = Document::new();
        let mut surf = DocNode::new("surf", "standard_surface", ValueType::SurfaceShader);
        surf.add_input(
            DocInput::new("base", ValueType::Float).with_value(Value::Float(0.8)),
        );
        doc.add_node(surf);

        let mat = doc.add_material("mat", "surfacematerial");
        let input = mat.add_input(DocInput::new("surfaceshader", ValueType::SurfaceShader));
        input.binding = Some(InputBinding::Node {
            node: "surf".into(),
            output: None,
        });
        doc
    }

    #[test]
    fn valid_document_passes() {
        let report = validate(&surface_doc());
        assert!(report.valid(), "{}", report.message());
    }

    #[test]
    fn dangling_connection_is_reported() {
        let mut doc = surface_doc();
        doc.nodes["mat"].inputs["surfaceshader"].binding = Some(InputBinding::Node {
            node: "missing".into(),
            output: None,
        });
        let report = validate(&doc);
        assert!(!report.valid());
        assert!(report.message().contains("missing node 'missing'"));
    }

    #[test]
    fn type_mismatch_is_reported() {
        let mut doc = surface_doc();
        doc.nodes["mat"].inputs["surfaceshader"].ty = ValueType::Color3;
        let report = validate(&doc);
        assert!(!report.valid());
        assert!(report.message().contains("type color3"));
    }

    #[test]
    fn interface_name_outside_nodegraph_is_reported() {
        let mut doc = surface_doc();
        doc.nodes["surf"].inputs["base"].binding =
            Some(InputBinding::InterfaceName("base".into()));
        let report = validate(&doc);
        assert!(!report.valid());
    }
}
