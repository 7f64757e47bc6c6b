// SPDX-License-Identifier: MIT OR Apache-2.0
//! Polymorphic nodes: one node instance covering every type variant of
//! its category.

use std::sync::Arc;

use indexmap::IndexMap;
use matforge_mtlx::{NodeDef, Value, ValueType};
use tracing::warn;

use crate::defs::VariantTable;
use crate::port::Port;

/// Name of the synthetic variant-selection property, present on nodes
/// with more than one variant.
pub const VARIANT_PROP: &str = "variant";

/// A graph node instantiated from a node definition.
///
/// The node carries the full variant table of its category; switching
/// variants rebuilds ports and properties from the newly selected
/// definition. Built-in state (name, position, variant selection) is
/// structurally separate from the definition-derived property bag, so a
/// definition input named like a built-in cannot shadow it.
#[derive(Debug, Clone)]
pub struct PolymorphicNode {
    /// Display and serialization name, unique within the graph
    pub name: String,
    /// Editor position
    pub position: [f32; 2],
    category: String,
    variants: VariantTable,
    current: String,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    properties: IndexMap<String, Value>,
}

impl PolymorphicNode {
    /// Create a node on the given variant of its table.
    ///
    /// The caller guarantees `current` is a key of `variants`; the
    /// definition index upholds this.
    pub fn new(category: impl Into<String>, variants: VariantTable, current: String) -> Self {
        let mut node = Self {
            name: String::new(),
            position: [0.0, 0.0],
            category: category.into(),
            variants,
            current,
            inputs: Vec::new(),
            outputs: Vec::new(),
            properties: IndexMap::new(),
        };
        node.rebuild_ports();
        node
    }

    /// The node category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The selected variant key.
    pub fn current_variant(&self) -> &str {
        &self.current
    }

    /// The selected definition.
    pub fn definition(&self) -> &Arc<NodeDef> {
        &self.variants[&self.current]
    }

    /// All variant keys of this node's category.
    pub fn variant_keys(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// Whether this node offers more than one variant.
    pub fn is_polymorphic(&self) -> bool {
        self.variants.len() > 1
    }

    /// Input ports of the selected definition.
    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    /// Output ports of the selected definition.
    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// The type of a named input port.
    pub fn input_type(&self, name: &str) -> Option<&ValueType> {
        self.inputs.iter().find(|p| p.name == name).map(|p| &p.ty)
    }

    /// The type of a named output port.
    pub fn output_type(&self, name: &str) -> Option<&ValueType> {
        self.outputs.iter().find(|p| p.name == name).map(|p| &p.ty)
    }

    /// The property bag: one value per definition input, plus the
    /// synthetic variant property on polymorphic nodes.
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// A property value.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Set a property value. Unknown names warn and are ignored; the
    /// variant property is routed through the graph, not set directly.
    pub fn set_property(&mut self, name: &str, value: Value) {
        if name == VARIANT_PROP {
            return;
        }
        if let Some(slot) = self.properties.get_mut(name) {
            *slot = value;
        } else {
            warn!(node = %self.name, property = name, "no such input on the current variant");
        }
    }

    /// Select a variant and rebuild ports and properties from its
    /// definition. Returns false when the key is not in the table.
    ///
    /// This drops all property values; callers wanting preservation
    /// snapshot and restore around it (the graph's retype operation does).
    pub fn set_variant(&mut self, key: &str) -> bool {
        if !self.variants.contains_key(key) {
            return false;
        }
        self.current = key.to_string();
        self.rebuild_ports();
        true
    }

    /// Rebuild ports and the property bag from the selected definition.
    fn rebuild_ports(&mut self) {
        let def = Arc::clone(&self.variants[&self.current]);
        self.inputs = def
            .inputs
            .iter()
            .map(|input| Port::input(&input.name, input.ty.clone()))
            .collect();
        self.outputs = def
            .outputs
            .iter()
            .map(|output| Port::output(&output.name, output.ty.clone()))
            .collect();

        self.properties.clear();
        if self.is_polymorphic() {
            self.properties
                .insert(VARIANT_PROP.to_string(), Value::String(self.current.clone()));
        }
        for input in &def.inputs {
            self.properties
                .insert(input.name.clone(), def.input_default(input));
        }
    }
}
