// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use matforge_mtlx::ValueType;
use serde::{Deserialize, Serialize};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// A named, typed port on a graph node.
///
/// Ports are addressed by name within their node; connections store
/// (node id, port name) pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port name, unique per direction within the node
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Semantic type
    pub ty: ValueType,
    /// Display color, derived from the type string
    pub color: [u8; 3],
}

impl Port {
    /// Create an input port colored by its type.
    pub fn input(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Input,
            color: ty.port_color(),
            ty,
        }
    }

    /// Create an output port colored by its type.
    pub fn output(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Output,
            color: ty.port_color(),
            ty,
        }
    }
}
