// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bidirectional translation between the editable graph and the
//! document tree.
//!
//! Both directions are best-effort: items that cannot be expressed on
//! the other side (unresolvable definitions, dangling peers) are logged
//! and skipped, never propagated as errors. The graph side is built into
//! a scratch graph, so a fatal error leaves the caller's state alone.

mod from_document;
mod to_document;

use std::path::PathBuf;

use crate::defs::DefinitionIndex;

/// Positions persist scaled down, as freeform `xpos`/`ypos` attributes.
pub(crate) const POSITION_SCALE: f32 = 0.01;

/// Name of the synthetic wrapper nodegraph used by the abstraction pass.
pub const MAIN_NODEGRAPH: &str = "NG_main";

/// Knobs of a translation run.
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Wrap top-level non-shader nodes into a [`MAIN_NODEGRAPH`]
    /// nodegraph on export. Skipped when the graph already contains a
    /// group node.
    pub nodegraph_abstraction: bool,
    /// Base directory against which relative filename values are
    /// absolutized on import.
    pub base_dir: Option<PathBuf>,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            nodegraph_abstraction: true,
            base_dir: None,
        }
    }
}

/// Fatal translation failure.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// No definitions are loaded, so no document node can be resolved
    #[error("cannot translate a document without loaded node definitions")]
    EmptyIndex,
}

/// Translates between [`crate::graph::NodeGraph`] and
/// [`matforge_mtlx::Document`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentTranslator<'a> {
    pub(crate) index: &'a DefinitionIndex,
    pub(crate) options: &'a TranslationOptions,
}

impl<'a> DocumentTranslator<'a> {
    /// Create a translator over the given index and options.
    pub fn new(index: &'a DefinitionIndex, options: &'a TranslationOptions) -> Self {
        Self { index, options }
    }
}
