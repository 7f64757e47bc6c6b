// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interface boundary nodes of a subgraph.
//!
//! Each subgraph session contains one input proxy and one output proxy.
//! A proxy carries the named interface ports plus one trailing
//! placeholder port; connecting to the placeholder grows a new named
//! port, keeping the placeholder last.

use matforge_mtlx::ValueType;
use serde::{Deserialize, Serialize};

use crate::port::Port;

/// Placeholder port name on the input proxy.
pub const NEXT_INPUT: &str = "Next Input";
/// Placeholder port name on the output proxy.
pub const NEXT_OUTPUT: &str = "Next Output";

/// Which side of the subgraph interface a proxy represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    /// Forwards the enclosing node's external inputs inward
    Input,
    /// Collects internal results into the enclosing node's outputs
    Output,
}

impl BoundaryKind {
    /// The placeholder port name for this side.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Input => NEXT_INPUT,
            Self::Output => NEXT_OUTPUT,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Input => "in",
            Self::Output => "out",
        }
    }
}

/// An interface proxy node inside a subgraph session.
///
/// The input proxy exposes interface ports as outputs (feeding internal
/// nodes); the output proxy exposes them as inputs. Named ports mirror
/// the enclosing group node's external ports one to one.
#[derive(Debug, Clone)]
pub struct BoundaryNode {
    /// Display name inside the subgraph
    pub name: String,
    /// Editor position
    pub position: [f32; 2],
    kind: BoundaryKind,
    ports: Vec<Port>,
}

impl BoundaryNode {
    /// Create a proxy with only the placeholder port.
    pub fn new(kind: BoundaryKind) -> Self {
        let placeholder = match kind {
            BoundaryKind::Input => Port::output(kind.placeholder(), ValueType::Custom(String::new())),
            BoundaryKind::Output => Port::input(kind.placeholder(), ValueType::Custom(String::new())),
        };
        Self {
            name: match kind {
                BoundaryKind::Input => "Inputs".to_string(),
                BoundaryKind::Output => "Outputs".to_string(),
            },
            position: [0.0, 0.0],
            kind,
            ports: vec![placeholder],
        }
    }

    /// Which side this proxy represents.
    pub fn kind(&self) -> BoundaryKind {
        self.kind
    }

    /// All ports, named ports first, placeholder last.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// The named interface ports, excluding the placeholder.
    pub fn named_ports(&self) -> &[Port] {
        &self.ports[..self.ports.len() - 1]
    }

    /// Whether the given port name is this proxy's placeholder.
    pub fn is_placeholder(&self, port: &str) -> bool {
        port == self.kind.placeholder()
    }

    /// The type of a named port, `None` for the untyped placeholder.
    pub fn port_type(&self, name: &str) -> Option<&ValueType> {
        if self.is_placeholder(name) {
            return None;
        }
        self.ports.iter().find(|p| p.name == name).map(|p| &p.ty)
    }

    /// Grow a new named port for a connection from `peer_name`, keeping
    /// the placeholder last. Returns the new port's name.
    ///
    /// Names follow `in_<peer>` / `out_<peer>`, with a numeric suffix on
    /// collision.
    pub fn grow(&mut self, peer_name: &str, ty: ValueType) -> String {
        let base = format!("{}_{peer_name}", self.kind.prefix());
        let mut name = base.clone();
        let mut counter = 1;
        while self.ports.iter().any(|p| p.name == name) {
            name = format!("{base}_{counter}");
            counter += 1;
        }

        let port = match self.kind {
            BoundaryKind::Input => Port::output(&name, ty),
            BoundaryKind::Output => Port::input(&name, ty),
        };
        let placeholder_index = self.ports.len() - 1;
        self.ports.insert(placeholder_index, port);
        name
    }

    /// Add a named port with an explicit name, keeping the placeholder
    /// last. Used when rebuilding a subgraph from a document.
    pub fn add_named_port(&mut self, name: impl Into<String>, ty: ValueType) {
        let name = name.into();
        if self.ports.iter().any(|p| p.name == name) {
            return;
        }
        let port = match self.kind {
            BoundaryKind::Input => Port::output(name, ty),
            BoundaryKind::Output => Port::input(name, ty),
        };
        let placeholder_index = self.ports.len() - 1;
        self.ports.insert(placeholder_index, port);
    }

    /// Remove a named port. The placeholder cannot be removed.
    pub fn remove_port(&mut self, name: &str) -> bool {
        if self.is_placeholder(name) {
            return false;
        }
        let before = self.ports.len();
        self.ports.retain(|p| p.name != name);
        self.ports.len() != before
    }
}
