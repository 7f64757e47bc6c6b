// SPDX-License-Identifier: MIT OR Apache-2.0
//! MaterialX document model for `MatForge`.
//!
//! This crate owns the serialized side of the editor:
//! - Typed values and the MaterialX type vocabulary
//! - The hierarchical document tree (nodes, nodegraphs, materials)
//! - XML (de)serialization of `.mtlx` files
//! - Node definition descriptors and definition-library loading
//! - Structural + type validation
//!
//! The editable node graph lives in `matforge_graph` and talks to this
//! crate exclusively through [`Document`] and [`NodeDef`].

pub mod document;
pub mod library;
pub mod nodedef;
pub mod types;
pub mod validate;
pub mod xml;

pub use document::{DocInput, DocNode, DocNodeGraph, DocOutput, Document, InputBinding, NodeKind};
pub use library::{LibraryError, STDLIB_NAMESPACES};
pub use nodedef::{DefInput, DefOutput, NodeDef};
pub use types::{Value, ValueType};
pub use validate::{validate, ValidationReport};
pub use xml::{parse_nodedefs, DocumentError};
