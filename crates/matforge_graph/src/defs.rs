// SPDX-License-Identifier: MIT OR Apache-2.0
//! The typed node-definition index.
//!
//! Definitions loaded from libraries are indexed twice: by semantic
//! group (for palette menus) and flat by category (for variant lookup).
//! Definitions sharing a category are variants of one conceptual node,
//! keyed by [`NodeDef::variant_key`].

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use matforge_mtlx::library::{load_library, LibraryError};
use matforge_mtlx::{DocNode, NodeDef, ValueType};
use tracing::{debug, warn};

use crate::node::PolymorphicNode;

/// Variant table of one category: variant key to definition.
pub type VariantTable = IndexMap<String, Arc<NodeDef>>;

/// Index of all loaded node definitions.
///
/// Owned by the session that loaded it; nothing here is global. Loading
/// is idempotent per definition name, so re-running [`DefinitionIndex::load`]
/// over overlapping libraries is safe.
#[derive(Debug, Default)]
pub struct DefinitionIndex {
    /// group -> category -> variant key -> definition
    groups: IndexMap<String, IndexMap<String, VariantTable>>,
    /// category -> variant key -> definition
    categories: IndexMap<String, VariantTable>,
    /// Definition names already indexed
    loaded: Vec<String>,
}

impl DefinitionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every definition found under the given search paths into the
    /// index, returning the definitions that were newly added.
    pub fn load(
        &mut self,
        search_paths: &[PathBuf],
        library_folders: &[String],
    ) -> Result<Vec<Arc<NodeDef>>, LibraryError> {
        let mut added = Vec::new();
        for path in search_paths {
            for def in load_library(path, library_folders)? {
                if self.loaded.iter().any(|name| *name == def.name) {
                    continue;
                }
                let def = Arc::new(def);
                self.insert(Arc::clone(&def));
                added.push(def);
            }
        }
        debug!(added = added.len(), total = self.loaded.len(), "indexed node definitions");
        Ok(added)
    }

    /// Register a definition directly, bypassing library files. Later
    /// registrations win variant-key collisions, as with [`Self::load`].
    pub fn add_definition(&mut self, def: Arc<NodeDef>) {
        if self.loaded.iter().any(|name| *name == def.name) {
            return;
        }
        self.insert(def);
    }

    fn insert(&mut self, def: Arc<NodeDef>) {
        let variant = def.variant_key();

        let by_category = self.categories.entry(def.category.clone()).or_default();
        if by_category.contains_key(&variant) {
            // Last definition wins, matching library load order.
            warn!(
                category = %def.category,
                variant = %variant,
                def = %def.name,
                "variant key collision, replacing earlier definition"
            );
        }
        by_category.insert(variant.clone(), Arc::clone(&def));

        self.groups
            .entry(def.node_group.clone())
            .or_default()
            .entry(def.category.clone())
            .or_default()
            .insert(variant, Arc::clone(&def));

        self.loaded.push(def.name.clone());
    }

    /// Drop every indexed definition.
    pub fn unload(&mut self) {
        self.groups.clear();
        self.categories.clear();
        self.loaded.clear();
    }

    /// Whether any definitions are loaded.
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Semantic groups, in load order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &IndexMap<String, VariantTable>)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The variant table of a category.
    pub fn variants(&self, category: &str) -> Option<&VariantTable> {
        self.categories.get(category)
    }

    /// Look up a definition by category, and variant key when given.
    /// Without a variant key the first variant of the category is returned.
    pub fn definition(&self, category: &str, variant: Option<&str>) -> Option<&Arc<NodeDef>> {
        let table = self.categories.get(category)?;
        match variant {
            Some(key) => table.get(key),
            None => table.first().map(|(_, def)| def),
        }
    }

    /// Instantiate a node of the given category, on the given variant
    /// (or the category's first variant).
    pub fn create_node(&self, category: &str, variant: Option<&str>) -> Option<PolymorphicNode> {
        let table = self.categories.get(category)?;
        let current = match variant {
            Some(key) if table.contains_key(key) => key.to_string(),
            Some(key) => {
                warn!(category, variant = key, "unknown variant, node not created");
                return None;
            }
            None => table.first()?.0.clone(),
        };
        Some(PolymorphicNode::new(category, table.clone(), current))
    }

    /// Resolve which variant of `category` a document node was written
    /// against.
    ///
    /// Resolution order: structural match of the node's declared inputs
    /// against each variant's input signature (name and type must agree;
    /// ties break to the lexicographically smallest variant key), then the
    /// variant key equal to the node's declared type name, then the variant
    /// key equal to the category itself.
    pub fn resolve_variant(&self, category: &str, node: &DocNode) -> Option<String> {
        let table = self.categories.get(category)?;

        if !node.inputs.is_empty() {
            let mut candidates: Vec<&str> = table
                .iter()
                .filter(|(_, def)| signature_matches(node, def))
                .map(|(key, _)| key.as_str())
                .collect();
            candidates.sort_unstable();
            if let Some(key) = candidates.first() {
                return Some((*key).to_string());
            }
        }

        let ty_name = node.ty.name();
        if table.contains_key(ty_name) {
            return Some(ty_name.to_string());
        }
        if table.contains_key(category) {
            return Some(category.to_string());
        }

        warn!(category, node = %node.name, "no variant matches the document node");
        None
    }
}

/// Whether every declared input of the document node exists on the
/// definition with the same type. Outputs must agree too, unless the
/// document node's type is multioutput.
fn signature_matches(node: &DocNode, def: &NodeDef) -> bool {
    let inputs_match = node.inputs.values().all(|input| {
        def.input(&input.name)
            .is_some_and(|decl| decl.ty == input.ty)
    });
    let output_matches = node.ty == ValueType::MultiOutput || def.node_type() == node.ty;
    inputs_match && output_matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use matforge_mtlx::{DefInput, DefOutput, DocInput, Value};

    fn constant(ty: ValueType) -> NodeDef {
        let mut def = NodeDef::new(format!("ND_constant_{}", ty.name()), "constant");
        def.inputs
            .push(DefInput::new("value", ty.clone()).with_default(Value::default_for(&ty)));
        def.outputs.push(DefOutput::new("out", ty));
        def
    }

    fn index_with_constants() -> DefinitionIndex {
        let mut index = DefinitionIndex::new();
        index.insert(Arc::new(constant(ValueType::Float)));
        index.insert(Arc::new(constant(ValueType::Color3)));
        index
    }

    #[test]
    fn variants_are_keyed_by_type_suffix() {
        let index = index_with_constants();
        let table = index.variants("constant").unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), ["float", "color3"]);
    }

    #[test]
    fn create_node_defaults_to_first_variant() {
        let index = index_with_constants();
        let node = index.create_node("constant", None).unwrap();
        assert_eq!(node.current_variant(), "float");
        let node = index.create_node("constant", Some("color3")).unwrap();
        assert_eq!(node.current_variant(), "color3");
        assert!(index.create_node("constant", Some("matrix33")).is_none());
    }

    #[test]
    fn resolve_variant_prefers_structural_match() {
        let index = index_with_constants();
        let mut node = DocNode::new("c1", "constant", ValueType::Color3);
        node.add_input(DocInput::new("value", ValueType::Color3));
        assert_eq!(index.resolve_variant("constant", &node), Some("color3".into()));
    }

    #[test]
    fn resolve_variant_falls_back_to_type_name() {
        let index = index_with_constants();
        let node = DocNode::new("c1", "constant", ValueType::Float);
        assert_eq!(index.resolve_variant("constant", &node), Some("float".into()));
    }

    #[test]
    fn duplicate_definition_names_load_once() {
        let mut index = DefinitionIndex::new();
        index.insert(Arc::new(constant(ValueType::Float)));
        let before = index.variants("constant").unwrap().len();
        // Same name re-inserted through load() is skipped; direct insert
        // exercises the collision path instead.
        index.insert(Arc::new(constant(ValueType::Float)));
        assert_eq!(index.variants("constant").unwrap().len(), before);
    }
}
