// SPDX-License-Identifier: MIT OR Apache-2.0
//! The root editing session: graph, definitions, translation and the
//! outbound event queue.

use std::path::{Path, PathBuf};

use matforge_mtlx::library::{stdlib_search_paths, LibraryError};
use matforge_mtlx::{Document, DocumentError, ValidationReport, Value};
use tracing::{info, warn};

use crate::defs::DefinitionIndex;
use crate::graph::{GraphNode, NodeGraph, NodeId};
use crate::node::VARIANT_PROP;
use crate::translate::{DocumentTranslator, TranslateError, TranslationOptions};

/// Outbound notifications to the embedding editor.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The serialized document changed
    DocumentUpdated {
        /// The document as MaterialX XML text
        xml: String,
        /// Whether the preview should rebuild (structural change) rather
        /// than just re-read parameters
        needs_refresh: bool,
    },
    /// A single parameter changed without structural impact
    ParameterChanged {
        /// Display name of the node
        node: String,
        /// Property name
        name: String,
        /// New value
        value: Value,
    },
    /// Advisory validation outcome
    Validated(ValidationReport),
}

/// Fatal session failure.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The definition library could not be located or loaded
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// A document could not be read or written
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A document could not be translated
    #[error(transparent)]
    Translate(#[from] TranslateError),
}

/// The root editing session.
///
/// Owns the graph, the definition index and the translation options.
/// Mutations queue [`SessionEvent`]s; [`GraphSession::take_events`]
/// drains them. While [`GraphSession::blocked`] is active, document
/// synchronization is suppressed; the depth counter makes blocking
/// reentrant.
pub struct GraphSession {
    graph: NodeGraph,
    index: DefinitionIndex,
    options: TranslationOptions,
    /// Re-serialize the document after every structural edit
    pub auto_update_document: bool,
    /// Emit parameter events on property mutation
    pub auto_update_properties: bool,
    block_save: usize,
    events: Vec<SessionEvent>,
    search_paths: Vec<PathBuf>,
    library_folders: Vec<String>,
}

impl GraphSession {
    /// Create a session, discovering and loading the standard definition
    /// library under the given roots. Fails when no library is found.
    pub fn new(search_roots: &[PathBuf]) -> Result<Self, SessionError> {
        let search_paths = stdlib_search_paths(search_roots)?;
        let library_folders = Vec::new();
        let mut index = DefinitionIndex::new();
        let loaded = index.load(&search_paths, &library_folders)?;
        info!(definitions = loaded.len(), "session ready");
        Ok(Self {
            graph: NodeGraph::new("root"),
            index,
            options: TranslationOptions::default(),
            auto_update_document: false,
            auto_update_properties: true,
            block_save: 0,
            events: Vec::new(),
            search_paths,
            library_folders,
        })
    }

    /// The root graph.
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// The definition index.
    pub fn index(&self) -> &DefinitionIndex {
        &self.index
    }

    /// The translation options.
    pub fn options(&self) -> &TranslationOptions {
        &self.options
    }

    /// Mutably access the translation options.
    pub fn options_mut(&mut self) -> &mut TranslationOptions {
        &mut self.options
    }

    /// Edit the graph structurally, then synchronize the document when
    /// auto-update is on.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut NodeGraph) -> R) -> R {
        let result = f(&mut self.graph);
        if self.auto_update_document {
            self.sync_document(true);
        }
        result
    }

    /// Instantiate a node from the index and add it to the root graph.
    pub fn add_node(&mut self, category: &str, variant: Option<&str>) -> Option<NodeId> {
        let node = self.index.create_node(category, variant)?;
        let id = self.graph.add_node(GraphNode::Polymorphic(node));
        if self.auto_update_document {
            self.sync_document(true);
        }
        Some(id)
    }

    /// Run `f` with document synchronization suppressed. Reentrant.
    pub fn blocked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.block_save += 1;
        let result = f(self);
        self.block_save -= 1;
        result
    }

    /// Whether document synchronization is currently suppressed.
    pub fn is_blocked(&self) -> bool {
        self.block_save > 0
    }

    /// Set a node property.
    ///
    /// The synthetic variant property routes through the graph's retype
    /// operation; plain properties emit a parameter event plus an
    /// advisory validation, both suppressed while blocked.
    pub fn set_node_property(&mut self, id: NodeId, name: &str, value: Value) {
        if name == VARIANT_PROP {
            if let Value::String(variant) = &value {
                self.change_node_type(id, variant);
                return;
            }
            warn!("variant property takes a string value");
            return;
        }

        let Some(node) = self.graph.node_mut(id) else {
            warn!(%id, "no such node");
            return;
        };
        let node_name = node.name().to_string();
        match node {
            GraphNode::Polymorphic(n) => n.set_property(name, value.clone()),
            GraphNode::Group(g) => g.set_property(name, value.clone()),
            GraphNode::Boundary(_) => {
                warn!(node = %node_name, "boundary proxies carry no properties");
                return;
            }
        }

        if self.block_save == 0 && self.auto_update_properties {
            self.events.push(SessionEvent::ParameterChanged {
                node: node_name,
                name: name.to_string(),
                value,
            });
            let (_, report) = self.translate();
            self.events.push(SessionEvent::Validated(report));
        }
    }

    /// Switch a node to another variant, synchronizing the document on
    /// success.
    pub fn change_node_type(&mut self, id: NodeId, variant: &str) -> bool {
        let changed = self.graph.change_node_type(id, variant);
        if changed {
            self.sync_document(true);
        }
        changed
    }

    /// The current graph as a document, with its advisory validation.
    pub fn document(&self) -> (Document, ValidationReport) {
        self.translate()
    }

    fn translate(&self) -> (Document, ValidationReport) {
        DocumentTranslator::new(&self.index, &self.options).graph_to_document(&self.graph)
    }

    /// Serialize the graph and queue a document-updated event, unless
    /// blocked.
    pub fn sync_document(&mut self, needs_refresh: bool) {
        if self.block_save > 0 {
            return;
        }
        let (doc, report) = self.translate();
        match doc.to_xml_string() {
            Ok(xml) => self.events.push(SessionEvent::DocumentUpdated { xml, needs_refresh }),
            Err(err) => warn!(%err, "document could not be rendered as XML"),
        }
        self.events.push(SessionEvent::Validated(report));
    }

    /// Replace the graph with one built from a document. The graph is
    /// built into scratch state first, so failure leaves the session
    /// unchanged.
    pub fn load_document(&mut self, doc: &Document) -> Result<(), SessionError> {
        let graph =
            DocumentTranslator::new(&self.index, &self.options).document_to_graph(doc)?;
        self.graph = graph;
        self.sync_document(true);
        Ok(())
    }

    /// Load a `.mtlx` file. Relative filename values resolve against the
    /// file's directory unless a base directory was configured.
    pub fn load_file(&mut self, path: &Path) -> Result<(), SessionError> {
        let doc = Document::read_file(path)?;
        if self.options.base_dir.is_none() {
            self.options.base_dir = path.parent().map(Path::to_path_buf);
        }
        self.load_document(&doc)
    }

    /// Save the graph as a `.mtlx` file, returning the advisory
    /// validation of what was written.
    pub fn save_file(&self, path: &Path) -> Result<ValidationReport, SessionError> {
        let (doc, report) = self.translate();
        if !report.valid() {
            warn!(problems = report.messages.len(), "saving a document that failed validation");
        }
        doc.write_file(path)?;
        Ok(report)
    }

    /// Validate the current document.
    pub fn validate_now(&self) -> ValidationReport {
        self.translate().1
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop and reload every definition from the configured search paths.
    pub fn reload_definitions(&mut self) -> Result<(), SessionError> {
        self.index.unload();
        let loaded = self.index.load(&self.search_paths, &self.library_folders)?;
        info!(definitions = loaded.len(), "definitions reloaded");
        Ok(())
    }
}
