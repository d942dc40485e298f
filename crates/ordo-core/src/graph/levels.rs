//! Layering: the dependency depth of every node.
//!
//! Level 0 holds the roots (nodes with no dependencies). Expansion is
//! breadth-first from the roots; a dependent joins the next frontier only
//! once **all** of its dependencies carry a level, so for every retained
//! edge `a depends-on b` we get `level(a) > level(b)`. On an acyclic graph
//! every node is reached; anything left over defaults to level 0.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::NodeIndex;

use crate::graph::DependencyGraph;
use crate::graph::build::{ActionGraph, ordered_neighbors};

/// Compute levels for an acyclic graph.
pub(crate) fn compute_levels(graph: &ActionGraph) -> HashMap<NodeIndex, usize> {
    let mut levels: HashMap<NodeIndex, usize> = HashMap::with_capacity(graph.node_count());

    let mut frontier: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|idx| {
            graph
                .neighbors_directed(*idx, Direction::Outgoing)
                .next()
                .is_none()
        })
        .collect();
    let mut level = 0;

    while !frontier.is_empty() {
        for idx in &frontier {
            levels.entry(*idx).or_insert(level);
        }

        let mut next = Vec::new();
        let mut queued: HashSet<NodeIndex> = HashSet::new();
        for idx in &frontier {
            for dependent in ordered_neighbors(graph, *idx, Direction::Incoming) {
                if levels.contains_key(&dependent) {
                    continue;
                }
                let ready = graph
                    .neighbors_directed(dependent, Direction::Outgoing)
                    .all(|dep| levels.contains_key(&dep));
                if ready && queued.insert(dependent) {
                    next.push(dependent);
                }
            }
        }

        frontier = next;
        level += 1;
    }

    for idx in graph.node_indices() {
        levels.entry(idx).or_insert(0);
    }
    levels
}

impl DependencyGraph {
    /// Level of `id`, or `None` for unknown ids.
    #[must_use]
    pub fn level(&self, id: &str) -> Option<usize> {
        self.index(id).and_then(|idx| self.levels.get(&idx).copied())
    }

    /// Level of every node, keyed by id.
    #[must_use]
    pub fn levels(&self) -> HashMap<&str, usize> {
        self.levels
            .iter()
            .map(|(idx, level)| (self.graph[*idx].id.as_str(), *level))
            .collect()
    }

    /// Number of distinct levels (`0` for an empty graph).
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.values().max().map_or(0, |max| max + 1)
    }
}
