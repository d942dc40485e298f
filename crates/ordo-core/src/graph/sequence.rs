//! Deterministic sequencing.
//!
//! The canonical order groups nodes by level (ascending) and, within a
//! level, ranks them by score descending with ties broken by id ascending.
//! Because levels respect every dependency edge, the order is a valid
//! topological order, and because the tie-breaks are total it is identical
//! across runs for identical input.

use std::cmp::Ordering;
use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::graph::DependencyGraph;
use crate::graph::build::ActionGraph;
use crate::model::Node;

/// Score descending, then id ascending.
pub(crate) fn rank_order(a: &Node, b: &Node) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

/// Compute the canonical order over all nodes.
pub(crate) fn canonical_order(
    graph: &ActionGraph,
    levels: &HashMap<NodeIndex, usize>,
) -> Vec<NodeIndex> {
    let mut order: Vec<NodeIndex> = graph.node_indices().collect();
    order.sort_by(|a, b| {
        let level_a = levels.get(a).copied().unwrap_or(0);
        let level_b = levels.get(b).copied().unwrap_or(0);
        level_a
            .cmp(&level_b)
            .then_with(|| rank_order(&graph[*a], &graph[*b]))
    });
    order
}

impl DependencyGraph {
    /// Every node in canonical order.
    #[must_use]
    pub fn sequence(&self) -> Vec<&Node> {
        self.sequence.iter().map(|idx| &self.graph[*idx]).collect()
    }

    /// Identifiers in canonical order.
    #[must_use]
    pub fn sequence_ids(&self) -> Vec<&str> {
        self.sequence
            .iter()
            .map(|idx| self.graph[*idx].id.as_str())
            .collect()
    }

    /// Nodes grouped by level, lowest level first. Members of a group have no
    /// dependency on each other and can be worked on together.
    #[must_use]
    pub fn parallel_groups(&self) -> Vec<Vec<&Node>> {
        let mut groups: Vec<Vec<&Node>> = vec![Vec::new(); self.level_count()];
        // The canonical order is already level-major and ranked within a level.
        for idx in &self.sequence {
            let level = self.levels.get(idx).copied().unwrap_or(0);
            if let Some(group) = groups.get_mut(level) {
                group.push(&self.graph[*idx]);
            }
        }
        groups
    }

    /// Canonical position of every node, for restricting other results to
    /// canonical order.
    pub(crate) fn sequence_positions(&self) -> HashMap<NodeIndex, usize> {
        self.sequence
            .iter()
            .enumerate()
            .map(|(pos, idx)| (*idx, pos))
            .collect()
    }
}
