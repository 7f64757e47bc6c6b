// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end translation scenarios.

use std::sync::Arc;

use matforge_graph::{
    BoundaryKind, DefinitionIndex, DocumentTranslator, GraphNode, GroupNode, NodeGraph,
    TranslationOptions, MAIN_NODEGRAPH,
};
use matforge_mtlx::{
    DefInput, DefOutput, DocInput, DocNode, Document, InputBinding, NodeDef, Value, ValueType,
};

fn index() -> DefinitionIndex {
    let mut index = DefinitionIndex::new();

    let mut image = NodeDef::new("ND_image_color3", "image");
    image.node_group = "texture2d".to_string();
    image.inputs.push(DefInput::new("file", ValueType::Filename));
    let mut texcoord = DefInput::new("texcoord", ValueType::Vector2);
    texcoord.is_geom_prop = true;
    image.inputs.push(texcoord);
    image.outputs.push(DefOutput::new("out", ValueType::Color3));
    index.add_definition(Arc::new(image));

    let mut surface = NodeDef::new("ND_standard_surface_surfaceshader", "standard_surface");
    surface.node_group = "pbr".to_string();
    surface
        .inputs
        .push(DefInput::new("base", ValueType::Float).with_default(Value::Float(0.8)));
    surface
        .inputs
        .push(DefInput::new("base_color", ValueType::Color3));
    surface
        .outputs
        .push(DefOutput::new("out", ValueType::SurfaceShader));
    index.add_definition(Arc::new(surface));

    let mut material = NodeDef::new("ND_surfacematerial", "surfacematerial");
    material.node_group = "material".to_string();
    material
        .inputs
        .push(DefInput::new("surfaceshader", ValueType::SurfaceShader));
    material.outputs.push(DefOutput::new("out", ValueType::Material));
    index.add_definition(Arc::new(material));

    for ty in [ValueType::Float, ValueType::Color3] {
        let mut constant = NodeDef::new(format!("ND_constant_{}", ty.name()), "constant");
        constant.node_group = "procedural".to_string();
        constant
            .inputs
            .push(DefInput::new("value", ty.clone()).with_default(Value::default_for(&ty)));
        constant.outputs.push(DefOutput::new("out", ty.clone()));
        index.add_definition(Arc::new(constant));
    }

    let mut separate = NodeDef::new("ND_separate3_vector3", "separate3");
    separate.node_group = "channel".to_string();
    separate.inputs.push(DefInput::new("in", ValueType::Vector3));
    separate.outputs.push(DefOutput::new("outx", ValueType::Float));
    separate.outputs.push(DefOutput::new("outy", ValueType::Float));
    separate.outputs.push(DefOutput::new("outz", ValueType::Float));
    index.add_definition(Arc::new(separate));

    let mut add = NodeDef::new("ND_add_float", "add");
    add.node_group = "math".to_string();
    add.inputs.push(DefInput::new("in1", ValueType::Float));
    add.inputs.push(DefInput::new("in2", ValueType::Float));
    add.outputs.push(DefOutput::new("out", ValueType::Float));
    index.add_definition(Arc::new(add));

    index
}

#[test]
fn textured_material_export() {
    let index = index();
    let options = TranslationOptions::default();
    let translator = DocumentTranslator::new(&index, &options);

    let mut graph = NodeGraph::new("root");
    let img = graph.add_node(GraphNode::Polymorphic(
        index.create_node("image", None).unwrap(),
    ));
    graph
        .node_mut(img)
        .unwrap()
        .as_polymorphic_mut()
        .unwrap()
        .set_property("file", Value::String("textures/wood.png".into()));
    let surf = graph.add_node(GraphNode::Polymorphic(
        index.create_node("standard_surface", None).unwrap(),
    ));
    let mat = graph.add_node(GraphNode::Polymorphic(
        index.create_node("surfacematerial", None).unwrap(),
    ));
    graph.connect(img, "out", surf, "base_color").unwrap();
    graph.connect(surf, "out", mat, "surfaceshader").unwrap();

    let (doc, report) = translator.graph_to_document(&graph);
    assert!(report.valid(), "{}", report.message());

    // the image node is wrapped, shaders and materials stay at the root
    let wrapper = doc.nodegraph(MAIN_NODEGRAPH).unwrap();
    let image = &wrapper.nodes["image"];
    assert!(doc.node("image").is_none());
    assert!(doc.node("standard_surface").is_some());
    assert_eq!(
        doc.node("surfacematerial").unwrap().ty,
        ValueType::Material
    );

    // the wrapped output is re-exposed through the wrapper interface
    let exposed = &wrapper.outputs["output_image_out"];
    assert_eq!(exposed.ty, ValueType::Color3);
    assert_eq!(exposed.connected_node.as_deref(), Some("image"));
    assert_eq!(
        doc.node("standard_surface").unwrap().inputs["base_color"].binding,
        Some(InputBinding::NodeGraphOutput {
            nodegraph: MAIN_NODEGRAPH.to_string(),
            output: "output_image_out".to_string(),
        })
    );
    assert_eq!(
        doc.node("surfacematerial").unwrap().inputs["surfaceshader"].binding,
        Some(InputBinding::Node {
            node: "standard_surface".to_string(),
            output: None,
        })
    );

    // geometric-property inputs stay unserialized, filenames get a
    // source colorspace
    assert!(!image.inputs.contains_key("texcoord"));
    let file = &image.inputs["file"];
    assert_eq!(file.value, Some(Value::String("textures/wood.png".into())));
    assert_eq!(
        file.attributes.get("colorspace").map(String::as_str),
        Some("srgb_texture")
    );

    // unconnected defaulted inputs keep their values
    assert_eq!(
        doc.node("standard_surface").unwrap().inputs["base"].value,
        Some(Value::Float(0.8))
    );
}

fn textured_document() -> Document {
    let mut doc = Document::new();

    let ng = doc.add_nodegraph("NG_tex");
    ng.add_input(
        DocInput::new("tex_file", ValueType::Filename)
            .with_value(Value::String("wood.png".into())),
    );
    let mut image = DocNode::new("image", "image", ValueType::Color3);
    let mut file = DocInput::new("file", ValueType::Filename);
    file.binding = Some(InputBinding::InterfaceName("tex_file".into()));
    image.add_input(file);
    ng.add_node(image);
    ng.add_output("out", ValueType::Color3, Some("image".into()));

    let mut surf = DocNode::new("surf", "standard_surface", ValueType::SurfaceShader);
    surf.add_input(DocInput::new("base", ValueType::Float).with_value(Value::Float(0.5)));
    let mut base_color = DocInput::new("base_color", ValueType::Color3);
    base_color.binding = Some(InputBinding::NodeGraphOutput {
        nodegraph: "NG_tex".into(),
        output: "out".into(),
    });
    surf.add_input(base_color);
    doc.add_node(surf);

    let mat = doc.add_material("mat", "surfacematerial");
    let shader_input = mat.add_input(DocInput::new("surfaceshader", ValueType::SurfaceShader));
    shader_input.binding = Some(InputBinding::Node {
        node: "surf".into(),
        output: None,
    });

    doc
}

#[test]
fn document_round_trip_preserves_structure() {
    let index = index();
    let options = TranslationOptions::default();
    let translator = DocumentTranslator::new(&index, &options);

    let graph = translator.document_to_graph(&textured_document()).unwrap();

    // the nodegraph came back as a group node
    let (_, group) = graph.find_by_name("NG_tex").unwrap();
    let group = group.as_group().unwrap();
    assert_eq!(group.inputs().len(), 1);
    assert_eq!(group.inputs()[0].name, "tex_file");
    assert_eq!(group.outputs().len(), 1);
    assert_eq!(
        group.property("tex_file"),
        Some(&Value::String("wood.png".into()))
    );

    let (doc, report) = translator.graph_to_document(&graph);
    assert!(report.valid(), "{}", report.message());

    // a group disables the abstraction pass, so the root layout survives
    assert!(doc.nodegraph(MAIN_NODEGRAPH).is_none());
    let ng = doc.nodegraph("NG_tex").unwrap();
    assert_eq!(
        ng.inputs["tex_file"].value,
        Some(Value::String("wood.png".into()))
    );
    assert_eq!(
        ng.nodes["image"].inputs["file"].binding,
        Some(InputBinding::InterfaceName("tex_file".into()))
    );
    assert_eq!(ng.outputs["out"].connected_node.as_deref(), Some("image"));

    let surf = doc.node("surf").unwrap();
    assert_eq!(surf.inputs["base"].value, Some(Value::Float(0.5)));
    assert_eq!(
        surf.inputs["base_color"].binding,
        Some(InputBinding::NodeGraphOutput {
            nodegraph: "NG_tex".into(),
            output: "out".into(),
        })
    );
    assert_eq!(
        doc.node("mat").unwrap().inputs["surfaceshader"].binding,
        Some(InputBinding::Node {
            node: "surf".into(),
            output: None,
        })
    );
}

#[test]
fn shared_interface_name_is_declared_once() {
    let index = index();
    let options = TranslationOptions::default();
    let translator = DocumentTranslator::new(&index, &options);

    let mut doc = Document::new();
    let ng = doc.add_nodegraph("NG_tex");
    ng.add_input(
        DocInput::new("tex_file", ValueType::Filename)
            .with_value(Value::String("shared.png".into())),
    );
    for name in ["image_a", "image_b"] {
        let mut image = DocNode::new(name, "image", ValueType::Color3);
        let mut file = DocInput::new("file", ValueType::Filename);
        file.binding = Some(InputBinding::InterfaceName("tex_file".into()));
        image.add_input(file);
        ng.add_node(image);
    }
    ng.add_output("out", ValueType::Color3, Some("image_a".into()));

    let graph = translator.document_to_graph(&doc).unwrap();
    let (_, group) = graph.find_by_name("NG_tex").unwrap();
    let group = group.as_group().unwrap();
    // one external port, referenced twice inside
    assert_eq!(group.inputs().len(), 1);
    let sub = group.subgraph();
    let (proxy_id, _) = sub.boundary(BoundaryKind::Input).unwrap();
    assert_eq!(sub.connections_from(proxy_id).count(), 2);

    let (exported, _) = translator.graph_to_document(&graph);
    let ng = exported.nodegraph("NG_tex").unwrap();
    assert_eq!(ng.inputs.len(), 1);
    assert_eq!(
        ng.inputs["tex_file"].value,
        Some(Value::String("shared.png".into()))
    );
    for name in ["image_a", "image_b"] {
        assert_eq!(
            ng.nodes[name].inputs["file"].binding,
            Some(InputBinding::InterfaceName("tex_file".into()))
        );
        // a bound input carries no duplicated value
        assert_eq!(ng.nodes[name].inputs["file"].value, None);
    }
}

#[test]
fn group_input_connection_round_trips() {
    let index = index();
    let options = TranslationOptions::default();
    let translator = DocumentTranslator::new(&index, &options);

    let mut graph = NodeGraph::new("root");
    let c = graph.add_node(GraphNode::Polymorphic(
        index.create_node("constant", Some("float")).unwrap(),
    ));
    let mut group = GroupNode::new("NG_grade");
    group.declare_input("tint", ValueType::Float, Some(Value::Float(0.25)));
    group.edit(|sub| {
        let add = sub.add_node(GraphNode::Polymorphic(
            index.create_node("add", None).unwrap(),
        ));
        let (in_proxy, _) = sub.boundary(BoundaryKind::Input).unwrap();
        sub.connect(in_proxy, "tint", add, "in1").unwrap();
    });
    let gid = graph.add_node(GraphNode::Group(group));
    graph.connect(c, "out", gid, "tint").unwrap();

    let (doc, report) = translator.graph_to_document(&graph);
    assert!(report.valid(), "{}", report.message());
    // the fed interface input carries a binding, not a value
    let ng = doc.nodegraph("NG_grade").unwrap();
    assert_eq!(ng.inputs["tint"].value, None);
    assert_eq!(
        ng.inputs["tint"].binding,
        Some(InputBinding::Node {
            node: "constant".to_string(),
            output: None,
        })
    );

    let restored = translator.document_to_graph(&doc).unwrap();
    let (gid, _) = restored.find_by_name("NG_grade").unwrap();
    let conn = restored
        .connection_into(gid, "tint")
        .expect("group input should be reconnected");
    let (src, _) = restored.find_by_name("constant").unwrap();
    assert_eq!(conn.from_node, src);
}

#[test]
fn multi_output_completion_is_idempotent() {
    let index = index();
    let options = TranslationOptions::default();
    let translator = DocumentTranslator::new(&index, &options);

    let mut doc = Document::new();
    let mut sep = DocNode::new("sep", "separate3", ValueType::MultiOutput);
    sep.add_input(
        DocInput::new("in", ValueType::Vector3).with_value(Value::Vector3([1.0, 2.0, 3.0])),
    );
    doc.add_node(sep);
    let mut add = DocNode::new("sum", "add", ValueType::Float);
    for input_name in ["in1", "in2"] {
        let mut input = DocInput::new(input_name, ValueType::Float);
        input.binding = Some(InputBinding::Node {
            node: "sep".into(),
            output: Some("outx".into()),
        });
        add.add_input(input);
    }
    doc.add_node(add);

    let graph = translator.document_to_graph(&doc).unwrap();
    let (exported, report) = translator.graph_to_document(&graph);
    assert!(report.valid(), "{}", report.message());

    // both references materialize the same single output slot
    let wrapper = exported.nodegraph(MAIN_NODEGRAPH).unwrap();
    let sep = &wrapper.nodes["sep"];
    assert!(sep.is_multi_output());
    assert_eq!(sep.outputs.len(), 1);
    assert_eq!(sep.outputs["outx"].ty, ValueType::Float);
    for input_name in ["in1", "in2"] {
        assert_eq!(
            wrapper.nodes["sum"].inputs[input_name].binding,
            Some(InputBinding::Node {
                node: "sep".into(),
                output: Some("outx".into()),
            })
        );
    }
}

#[test]
fn positions_round_trip_scaled() {
    let index = index();
    let options = TranslationOptions {
        nodegraph_abstraction: false,
        base_dir: None,
    };
    let translator = DocumentTranslator::new(&index, &options);

    let mut graph = NodeGraph::new("root");
    let c = graph.add_node(GraphNode::Polymorphic(
        index.create_node("constant", Some("float")).unwrap(),
    ));
    graph.node_mut(c).unwrap().set_position([300.0, -150.0]);

    let (doc, _) = translator.graph_to_document(&graph);
    assert_eq!(doc.node("constant").unwrap().position_attrs(), Some([3.0, -1.5]));

    let restored = translator.document_to_graph(&doc).unwrap();
    let (_, node) = restored.find_by_name("constant").unwrap();
    assert_eq!(node.position(), [300.0, -150.0]);
}
