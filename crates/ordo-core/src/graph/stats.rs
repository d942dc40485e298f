//! Summary statistics for a built graph.
//!
//! - **node_count** / **edge_count**: retained nodes and dependency edges.
//! - **level_count**: number of distinct levels (length of the longest
//!   chain, in nodes).
//! - **root_count**: nodes with no dependencies (foundations).
//! - **isolated_count**: nodes with neither dependencies nor dependents.
//! - **max_parallelism**: size of the largest parallel group.
//! - **density**: `edge_count / (node_count * (node_count - 1))`, zero for
//!   graphs with fewer than two nodes.
//! - **removed_edges** / **dropped_edges**: edges lost to cycle repair and
//!   to unknown endpoints, duplicates or unmet conditions during the build.

use petgraph::Direction;
use serde::Serialize;

use crate::graph::DependencyGraph;

/// Summary statistics for a [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub level_count: usize,
    pub root_count: usize,
    pub isolated_count: usize,
    pub max_parallelism: usize,
    pub density: f64,
    pub removed_edges: usize,
    pub dropped_edges: usize,
}

impl DependencyGraph {
    /// Compute summary statistics.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        let node_count = self.graph.node_count();
        let edge_count = self.graph.edge_count();

        let mut root_count = 0;
        let mut isolated_count = 0;
        for idx in self.graph.node_indices() {
            let no_deps = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .next()
                .is_none();
            let no_dependents = self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none();
            if no_deps {
                root_count += 1;
                if no_dependents {
                    isolated_count += 1;
                }
            }
        }

        let density = if node_count < 2 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = edge_count as f64 / (node_count * (node_count - 1)) as f64;
            ratio
        };

        let max_parallelism = self
            .parallel_groups()
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0);

        let diagnostics = self.diagnostics();
        GraphSummary {
            node_count,
            edge_count,
            level_count: self.level_count(),
            root_count,
            isolated_count,
            max_parallelism,
            density,
            removed_edges: diagnostics.repair.removed.len(),
            dropped_edges: diagnostics.dropped_edges.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RepairConfig;
    use crate::graph::DependencyGraph;
    use crate::model::{ActionSpec, EdgeKind, ScoreMap};

    #[test]
    fn empty_graph_summary() {
        let actions: [ActionSpec; 0] = [];
        let graph =
            DependencyGraph::from_actions(&actions, &ScoreMap::new(), &RepairConfig::default())
                .expect("build graph");
        let summary = graph.summary();

        assert_eq!(summary.node_count, 0);
        assert_eq!(summary.level_count, 0);
        assert_eq!(summary.max_parallelism, 0);
        assert!(summary.density.abs() < f64::EPSILON);
    }

    #[test]
    fn summary_counts_structure_and_repairs() {
        let actions = [
            ActionSpec::new("A", 1.0, "c").depends_on("B", EdgeKind::Hard),
            ActionSpec::new("B", 1.0, "c").depends_on("A", EdgeKind::Hard),
            ActionSpec::new("C", 1.0, "c").depends_on("B", EdgeKind::Hard),
            ActionSpec::new("D", 1.0, "c").depends_on("ghost", EdgeKind::Soft),
        ];
        let graph =
            DependencyGraph::from_actions(&actions, &ScoreMap::new(), &RepairConfig::default())
                .expect("build graph");
        let summary = graph.summary();

        // B -> A removed; A -> B and C -> B remain.
        assert_eq!(summary.node_count, 4);
        assert_eq!(summary.edge_count, 2);
        assert_eq!(summary.level_count, 2);
        assert_eq!(summary.root_count, 2);
        assert_eq!(summary.isolated_count, 1);
        assert_eq!(summary.max_parallelism, 2);
        assert_eq!(summary.removed_edges, 1);
        assert_eq!(summary.dropped_edges, 1);
        assert!((summary.density - 2.0 / 12.0).abs() < 1e-9);
    }
}
