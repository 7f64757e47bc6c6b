// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fallback grid layout for graphs loaded without persisted positions.

use indexmap::IndexMap;

use crate::graph::{NodeGraph, NodeId};

const COLUMN_SPACING: f32 = 220.0;
const ROW_SPACING: f32 = 120.0;

/// Arrange nodes on a grid: columns by topological depth (longest path
/// from any source), rows by insertion order within a column.
pub fn auto_layout(graph: &mut NodeGraph) {
    let ids: Vec<NodeId> = graph.nodes().map(|(id, _)| id).collect();
    let mut depth: IndexMap<NodeId, usize> = ids.iter().map(|id| (*id, 0)).collect();

    // Relax edges; iteration is capped so a cycle cannot hang us.
    for _ in 0..ids.len() {
        let mut changed = false;
        for conn in graph.connections() {
            let candidate = depth[&conn.from_node] + 1;
            if depth[&conn.to_node] < candidate {
                depth[&conn.to_node] = candidate;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut rows: IndexMap<usize, usize> = IndexMap::new();
    for id in ids {
        let column = depth[&id];
        let row = rows.entry(column).or_insert(0);
        let position = [column as f32 * COLUMN_SPACING, *row as f32 * ROW_SPACING];
        *row += 1;
        if let Some(node) = graph.node_mut(id) {
            node.set_position(position);
        }
    }
}
