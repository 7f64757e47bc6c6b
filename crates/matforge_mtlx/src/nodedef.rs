// SPDX-License-Identifier: MIT OR Apache-2.0
//! Immutable node definition descriptors.

use serde::{Deserialize, Serialize};

use crate::types::{Value, ValueType};

/// Fallback semantic group for definitions that declare none.
pub const DEFAULT_NODE_GROUP: &str = "Other";

/// A typed input declared by a node definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefInput {
    /// Input name
    pub name: String,
    /// Semantic type
    pub ty: ValueType,
    /// Declared default value, if any
    pub default: Option<Value>,
    /// Declared UI range (`uimin`/`uimax`), for numeric scalars
    pub range: Option<(f64, f64)>,
    /// Whether the input defaults to a geometric property
    /// (`defaultgeomprop`); such inputs are not serialized unless connected.
    pub is_geom_prop: bool,
}

impl DefInput {
    /// Create an input with no default and no range.
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            range: None,
            is_geom_prop: false,
        }
    }

    /// Set the declared default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// A typed output declared by a node definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefOutput {
    /// Output name
    pub name: String,
    /// Semantic type
    pub ty: ValueType,
}

impl DefOutput {
    /// Create an output.
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// An immutable node definition.
///
/// Definitions sharing a category but differing in type signature are
/// variants of one conceptual node; [`NodeDef::variant_key`] derives the
/// key used to tell them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    /// Full definition identifier (`ND_<category>_<type>` by convention)
    pub name: String,
    /// Node category (the node string, e.g. `constant`)
    pub category: String,
    /// Semantic group (e.g. `procedural`), [`DEFAULT_NODE_GROUP`] if absent
    pub node_group: String,
    /// Ordered typed inputs
    pub inputs: Vec<DefInput>,
    /// Ordered typed outputs
    pub outputs: Vec<DefOutput>,
}

impl NodeDef {
    /// Create a definition with the default node group.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            node_group: DEFAULT_NODE_GROUP.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// The variant key: the definition name with the conventional
    /// `ND_<category>_` prefix stripped (fallback: bare `ND_`, then the
    /// full name).
    pub fn variant_key(&self) -> String {
        let with_category = format!("ND_{}_", self.category);
        if let Some(stripped) = self.name.strip_prefix(&with_category) {
            stripped.to_string()
        } else if let Some(stripped) = self.name.strip_prefix("ND_") {
            stripped.to_string()
        } else {
            self.name.clone()
        }
    }

    /// Look up a declared input by name.
    pub fn input(&self, name: &str) -> Option<&DefInput> {
        self.inputs.iter().find(|i| i.name == name)
    }

    /// Look up a declared output by name.
    pub fn output(&self, name: &str) -> Option<&DefOutput> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Whether this definition declares more than one output.
    pub fn is_multi_output(&self) -> bool {
        self.outputs.len() > 1
    }

    /// The declared document node type: the single output's type, or
    /// `multioutput` for definitions with several outputs.
    pub fn node_type(&self) -> ValueType {
        if self.is_multi_output() {
            ValueType::MultiOutput
        } else {
            self.outputs
                .first()
                .map(|o| o.ty.clone())
                .unwrap_or(ValueType::Custom("none".to_string()))
        }
    }

    /// The default property value for a declared input, applying the value
    /// coercion table when the definition declares no default.
    pub fn input_default(&self, input: &DefInput) -> Value {
        input
            .default
            .clone()
            .unwrap_or_else(|| Value::default_for(&input.ty))
    }
}
