//! Read-only queries over a built [`DependencyGraph`].
//!
//! Every query is total: an unknown id yields an empty result (or `None`),
//! never an error. Results that return several nodes come back in canonical
//! sequence order unless documented otherwise.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::config::QueryConfig;
use crate::graph::DependencyGraph;
use crate::graph::build::ordered_neighbors;
use crate::graph::sequence::rank_order;
use crate::model::{EdgeKind, Node};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A direct neighbour together with the connecting edge's attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor<'a> {
    pub node: &'a Node,
    pub kind: EdgeKind,
    pub strength: f64,
}

/// What completing one action contributes, directly and through everything
/// it enables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactReport {
    pub id: String,
    /// The action's own impact attributes.
    pub direct: BTreeMap<String, f64>,
    /// Direct impact plus the decayed impact of every descendant.
    pub total: BTreeMap<String, f64>,
    /// Number of descendants (actions this one transitively enables).
    pub enabled_count: usize,
    /// Sum of descendant scores, decayed.
    pub unlocked_value: f64,
}

impl DependencyGraph {
    // -----------------------------------------------------------------------
    // Closures
    // -----------------------------------------------------------------------

    /// Everything `id` transitively depends on.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> BTreeSet<&str> {
        self.index(id)
            .map(|idx| self.ids_of(self.closure(idx, Direction::Outgoing)))
            .unwrap_or_default()
    }

    /// Everything that transitively depends on `id`.
    #[must_use]
    pub fn descendants(&self, id: &str) -> BTreeSet<&str> {
        self.index(id)
            .map(|idx| self.ids_of(self.closure(idx, Direction::Incoming)))
            .unwrap_or_default()
    }

    /// Ancestors of `id` as node records, in canonical order.
    #[must_use]
    pub fn prerequisites(&self, id: &str) -> Vec<&Node> {
        self.index(id)
            .map(|idx| self.in_sequence(&self.closure(idx, Direction::Outgoing)))
            .unwrap_or_default()
    }

    /// Descendants of `id` as node records, in canonical order.
    #[must_use]
    pub fn enabled_by(&self, id: &str) -> Vec<&Node> {
        self.index(id)
            .map(|idx| self.in_sequence(&self.closure(idx, Direction::Incoming)))
            .unwrap_or_default()
    }

    /// Iterative transitive closure from `start` (exclusive) along `dir`.
    pub(crate) fn closure(&self, start: NodeIndex, dir: Direction) -> HashSet<NodeIndex> {
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeIndex> = self.graph.neighbors_directed(start, dir).collect();
        while let Some(idx) = stack.pop() {
            if seen.insert(idx) {
                stack.extend(self.graph.neighbors_directed(idx, dir));
            }
        }
        seen
    }

    fn ids_of(&self, set: HashSet<NodeIndex>) -> BTreeSet<&str> {
        set.into_iter()
            .map(|idx| self.graph[idx].id.as_str())
            .collect()
    }

    /// Restrict the canonical order to `set`.
    pub(crate) fn in_sequence(&self, set: &HashSet<NodeIndex>) -> Vec<&Node> {
        self.sequence
            .iter()
            .filter(|idx| set.contains(idx))
            .map(|idx| &self.graph[*idx])
            .collect()
    }

    // -----------------------------------------------------------------------
    // Direct adjacency
    // -----------------------------------------------------------------------

    /// Direct dependencies of `id`, in declaration order.
    #[must_use]
    pub fn dependencies_of(&self, id: &str) -> Vec<Neighbor<'_>> {
        self.neighbors_of(id, Direction::Outgoing)
    }

    /// Direct dependents of `id`, in declaration order.
    #[must_use]
    pub fn dependents_of(&self, id: &str) -> Vec<Neighbor<'_>> {
        self.neighbors_of(id, Direction::Incoming)
    }

    fn neighbors_of(&self, id: &str, dir: Direction) -> Vec<Neighbor<'_>> {
        let Some(idx) = self.index(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| {
                let other = match dir {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other, *e.weight())
            })
            .collect();
        edges.sort_unstable_by_key(|(edge, _, _)| *edge);
        edges
            .into_iter()
            .map(|(_, other, dep)| Neighbor {
                node: &self.graph[other],
                kind: dep.kind,
                strength: dep.strength,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Impact
    // -----------------------------------------------------------------------

    /// Impact of completing `id`, with default decay.
    #[must_use]
    pub fn impact(&self, id: &str) -> Option<ImpactReport> {
        self.impact_with_config(id, &QueryConfig::default())
    }

    /// Impact of completing `id`: its own impact attributes plus
    /// `impact_decay` times the attributes of every descendant, per
    /// dimension.
    #[must_use]
    pub fn impact_with_config(&self, id: &str, config: &QueryConfig) -> Option<ImpactReport> {
        let idx = self.index(id)?;
        let node = &self.graph[idx];
        let descendants = self.closure(idx, Direction::Incoming);

        let mut total = node.impacts.clone();
        let mut unlocked_value = 0.0;
        // Canonical order keeps float summation deterministic.
        for enabled in self.in_sequence(&descendants) {
            for (dimension, value) in &enabled.impacts {
                *total.entry(dimension.clone()).or_insert(0.0) += value * config.impact_decay;
            }
            unlocked_value += enabled.score * config.impact_decay;
        }

        Some(ImpactReport {
            id: node.id.clone(),
            direct: node.impacts.clone(),
            total,
            enabled_count: descendants.len(),
            unlocked_value,
        })
    }

    // -----------------------------------------------------------------------
    // Ranked listings
    // -----------------------------------------------------------------------

    /// Cheap actions with at most one dependency, best score first.
    #[must_use]
    pub fn quick_wins(&self, max_effort: f64) -> Vec<&Node> {
        self.quick_wins_with_config(&QueryConfig {
            quick_win_max_effort: max_effort,
            ..QueryConfig::default()
        })
    }

    /// Like [`Self::quick_wins`] with the effort and dependency limits taken
    /// from `config`.
    #[must_use]
    pub fn quick_wins_with_config(&self, config: &QueryConfig) -> Vec<&Node> {
        let mut wins: Vec<&Node> = self
            .graph
            .node_indices()
            .filter(|idx| {
                let node = &self.graph[*idx];
                let deps = self
                    .graph
                    .neighbors_directed(*idx, Direction::Outgoing)
                    .count();
                node.effort_cost <= config.quick_win_max_effort
                    && deps <= config.quick_win_max_dependencies
            })
            .map(|idx| &self.graph[idx])
            .collect();
        wins.sort_by(|a, b| rank_order(a, b));
        wins
    }

    /// Roots of the graph (no dependencies), best score first.
    #[must_use]
    pub fn foundation_nodes(&self) -> Vec<&Node> {
        let mut roots: Vec<&Node> = self
            .graph
            .node_indices()
            .filter(|idx| {
                self.graph
                    .neighbors_directed(*idx, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.graph[idx])
            .collect();
        roots.sort_by(|a, b| rank_order(a, b));
        roots
    }

    // -----------------------------------------------------------------------
    // Ordered subsets
    // -----------------------------------------------------------------------

    /// Canonical order restricted to `start_ids`, optionally widened with
    /// their prerequisites. An empty `start_ids` yields the full sequence;
    /// unknown ids are ignored.
    #[must_use]
    pub fn execution_order<S: AsRef<str>>(
        &self,
        start_ids: &[S],
        include_prerequisites: bool,
    ) -> Vec<&Node> {
        if start_ids.is_empty() {
            return self.sequence();
        }

        let mut wanted: HashSet<NodeIndex> = HashSet::new();
        for id in start_ids {
            let Some(idx) = self.index(id.as_ref()) else {
                continue;
            };
            wanted.insert(idx);
            if include_prerequisites {
                wanted.extend(self.closure(idx, Direction::Outgoing));
            }
        }
        self.in_sequence(&wanted)
    }

    /// Everything needed to reach `target`: its prerequisites in canonical
    /// order, then `target` itself.
    #[must_use]
    pub fn minimum_path(&self, target: &str) -> Vec<&Node> {
        let Some(idx) = self.index(target) else {
            return Vec::new();
        };
        let mut path = self.in_sequence(&self.closure(idx, Direction::Outgoing));
        path.push(&self.graph[idx]);
        path
    }

    /// Direct dependencies of `idx` in declaration order.
    pub(crate) fn dependency_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        ordered_neighbors(&self.graph, idx, Direction::Outgoing)
    }
}
