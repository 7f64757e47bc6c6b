// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editable node graph core for `MatForge`.
//!
//! The graph is the in-memory editing model: definition-backed
//! polymorphic nodes, group nodes owning nested subgraphs, and interface
//! boundary proxies, connected through typed ports. The
//! [`translate::DocumentTranslator`] maps the graph to and from the
//! `matforge_mtlx` document tree; [`session::GraphSession`] wires graph,
//! definition index and translation into one editing surface with an
//! outbound event queue.

pub mod boundary;
pub mod defs;
pub mod graph;
pub mod group;
pub mod layout;
pub mod node;
pub mod port;
pub mod session;
pub mod snapshot;
pub mod translate;

pub use boundary::{BoundaryKind, BoundaryNode, NEXT_INPUT, NEXT_OUTPUT};
pub use defs::{DefinitionIndex, VariantTable};
pub use graph::{Connection, ConnectionError, GraphNode, NodeGraph, NodeId};
pub use group::GroupNode;
pub use layout::auto_layout;
pub use node::{PolymorphicNode, VARIANT_PROP};
pub use port::{Port, PortDirection};
pub use session::{GraphSession, SessionError, SessionEvent};
pub use snapshot::{
    deserialize_session, serialize_session, session_from_ron, session_to_ron, SessionData,
    SnapshotError,
};
pub use translate::{DocumentTranslator, TranslateError, TranslationOptions, MAIN_NODEGRAPH};
