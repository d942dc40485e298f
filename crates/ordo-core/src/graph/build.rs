//! Graph construction from action declarations.
//!
//! # Edge Direction
//!
//! An edge `A → B` in the graph means "A **depends on** B": B must be done
//! before A. Outgoing edges of a node are therefore its dependencies and
//! incoming edges are its dependents. petgraph keeps both directions of every
//! edge in one structure, so the forward and reverse views can never drift
//! apart.
//!
//! # Build Pipeline
//!
//! ```text
//! ActionSpec records + Edge list + ScoreMap
//!        ↓  validate (hard failure on malformed records)
//! register nodes (duplicate ids overwrite in place)
//!        ↓  insert edges (unknown endpoints and duplicates dropped)
//! possibly cyclic graph
//!        ↓  cycles::repair_cycles
//! acyclic graph
//!        ↓  levels::compute_levels → sequence::canonical_order
//! DependencyGraph (read-only)
//! ```
//!
//! Every dropped edge and every removed cycle edge is recorded in
//! [`BuildDiagnostics`] and logged; none of them is an error.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use petgraph::Direction;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::RepairConfig;
use crate::error::{GraphError, Result};
use crate::graph::cycles::{self, CycleRepair};
use crate::graph::{levels, sequence};
use crate::model::{ActionSpec, Dependency, Edge, EdgeKind, Node, ScoreMap};
use crate::predicate::FactContext;

/// Underlying petgraph type: node weights are actions, edges point from a
/// dependent to its dependency.
pub type ActionGraph = StableDiGraph<Node, Dependency>;

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Why a declared edge did not make it into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The dependency target is not part of this build.
    UnknownTarget,
    /// The dependent itself is not part of this build.
    UnknownSource,
    /// The same `(from, to)` pair was already declared.
    Duplicate,
    /// The edge's condition was not met in the build context.
    ConditionUnmet,
}

impl DropReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownTarget => "unknown_target",
            Self::UnknownSource => "unknown_source",
            Self::Duplicate => "duplicate",
            Self::ConditionUnmet => "condition_unmet",
        }
    }
}

/// A declared edge that was not inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub reason: DropReason,
}

/// Non-fatal findings collected while building.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildDiagnostics {
    pub dropped_edges: Vec<DroppedEdge>,
    /// Identifiers declared more than once (later declarations won).
    pub duplicate_ids: Vec<String>,
    pub repair: CycleRepair,
}

impl BuildDiagnostics {
    /// Return `true` if nothing was dropped, overwritten or repaired.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped_edges.is_empty() && self.duplicate_ids.is_empty() && self.repair.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// An acyclic dependency graph over one build's actions.
///
/// Built fresh for every scoring pass and read-only afterwards. Levels and
/// the canonical sequence are computed once during the build and cached.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub(crate) graph: ActionGraph,
    pub(crate) node_map: HashMap<String, NodeIndex>,
    pub(crate) levels: HashMap<NodeIndex, usize>,
    pub(crate) sequence: Vec<NodeIndex>,
    diagnostics: BuildDiagnostics,
    content_hash: String,
}

impl DependencyGraph {
    /// Build a graph from node declarations and an explicit edge list.
    ///
    /// Only `edges` are inserted; dependencies embedded in the specs are
    /// ignored here (see [`Self::from_actions`]). Scores come from `scores`,
    /// falling back to each spec's own `score`, then `0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if a node has an empty id or category, a
    /// negative or non-finite effort, or an edge has a strength outside
    /// `[0, 1]`.
    #[instrument(skip_all)]
    pub fn build<'a, I>(
        nodes: I,
        edges: &[Edge],
        scores: &ScoreMap,
        config: &RepairConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ActionSpec>,
    {
        let specs: Vec<&ActionSpec> = nodes.into_iter().collect();
        for edge in edges {
            validate_edge(edge)?;
        }
        Self::assemble(&specs, edges, scores, config, Vec::new())
    }

    /// Build a graph from action records, using their embedded dependencies.
    ///
    /// When an id is declared more than once, only the dependencies of the
    /// last declaration are used. Conditions on dependencies are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`Self::build`].
    #[instrument(skip_all)]
    pub fn from_actions<'a, I>(actions: I, scores: &ScoreMap, config: &RepairConfig) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ActionSpec>,
    {
        let specs: Vec<&ActionSpec> = actions.into_iter().collect();
        let (edges, dropped) = embedded_edges(&specs, None)?;
        Self::assemble(&specs, &edges, scores, config, dropped)
    }

    /// Like [`Self::from_actions`], but drops dependencies whose condition
    /// is not met in `facts`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::build`].
    #[instrument(skip_all)]
    pub fn from_actions_in_context<'a, I>(
        actions: I,
        scores: &ScoreMap,
        facts: &FactContext,
        config: &RepairConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ActionSpec>,
    {
        let specs: Vec<&ActionSpec> = actions.into_iter().collect();
        let (edges, dropped) = embedded_edges(&specs, Some(facts))?;
        Self::assemble(&specs, &edges, scores, config, dropped)
    }

    fn assemble(
        specs: &[&ActionSpec],
        edges: &[Edge],
        scores: &ScoreMap,
        config: &RepairConfig,
        mut dropped_edges: Vec<DroppedEdge>,
    ) -> Result<Self> {
        let nodes = specs
            .iter()
            .enumerate()
            .map(|(position, spec)| validate_node(position, spec, scores))
            .collect::<Result<Vec<_>>>()?;

        // Step 1: register nodes. A repeated id overwrites the earlier record
        // but keeps its registration position.
        let mut graph = ActionGraph::with_capacity(nodes.len(), edges.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(nodes.len());
        let mut duplicate_ids = Vec::new();

        for node in nodes {
            if let Some(&idx) = node_map.get(&node.id) {
                warn!(id = %node.id, "duplicate action id; later declaration wins");
                duplicate_ids.push(node.id.clone());
                graph[idx] = node;
            } else {
                let id = node.id.clone();
                let idx = graph.add_node(node);
                node_map.insert(id, idx);
            }
        }

        // Step 2: insert edges whose endpoints are both registered.
        for edge in edges {
            let reason = match (node_map.get(&edge.from), node_map.get(&edge.to)) {
                (None, _) => Some(DropReason::UnknownSource),
                (_, None) => Some(DropReason::UnknownTarget),
                (Some(&from), Some(&to)) => {
                    if graph.find_edge(from, to).is_some() {
                        Some(DropReason::Duplicate)
                    } else {
                        graph.add_edge(
                            from,
                            to,
                            Dependency {
                                kind: edge.kind,
                                strength: edge.strength,
                            },
                        );
                        None
                    }
                }
            };

            if let Some(reason) = reason {
                match reason {
                    DropReason::Duplicate => {
                        debug!(from = %edge.from, to = %edge.to, "duplicate dependency ignored");
                    }
                    _ => warn!(
                        from = %edge.from,
                        to = %edge.to,
                        ?reason,
                        "dependency dropped"
                    ),
                }
                dropped_edges.push(DroppedEdge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    kind: edge.kind,
                    reason,
                });
            }
        }

        // Step 3: restore acyclicity before anyone else looks at the graph.
        let repair = cycles::repair_cycles(&mut graph, config);

        // Step 4: levels and canonical order, cached for the graph's lifetime.
        let levels = levels::compute_levels(&graph);
        let sequence = sequence::canonical_order(&graph, &levels);
        let content_hash = compute_content_hash(&graph);

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dropped = dropped_edges.len(),
            removed = repair.removed.len(),
            "dependency graph built"
        );

        Ok(Self {
            graph,
            node_map,
            levels,
            sequence,
            diagnostics: BuildDiagnostics {
                dropped_edges,
                duplicate_ids,
                repair,
            },
            content_hash,
        })
    }

    /// Return the number of nodes (actions) in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of retained dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Look up a node record by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index(id).map(|idx| &self.graph[idx])
    }

    /// All nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// Forward adjacency: each id mapped to its dependencies in declaration
    /// order.
    #[must_use]
    pub fn adjacency(&self) -> BTreeMap<&str, Vec<&str>> {
        self.adjacency_in(Direction::Outgoing)
    }

    /// Reverse adjacency: each id mapped to its dependents.
    #[must_use]
    pub fn reverse_adjacency(&self) -> BTreeMap<&str, Vec<&str>> {
        self.adjacency_in(Direction::Incoming)
    }

    fn adjacency_in(&self, dir: Direction) -> BTreeMap<&str, Vec<&str>> {
        self.graph
            .node_indices()
            .map(|idx| {
                let neighbors = ordered_neighbors(&self.graph, idx, dir)
                    .into_iter()
                    .map(|n| self.graph[n].id.as_str())
                    .collect();
                (self.graph[idx].id.as_str(), neighbors)
            })
            .collect()
    }

    /// Return `true` if any dependency cycle remains. Always `false` after a
    /// successful build.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    #[must_use]
    pub fn diagnostics(&self) -> &BuildDiagnostics {
        &self.diagnostics
    }

    /// BLAKE3 hash of the normalized node and edge set (`blake3:<hex>`).
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub(crate) fn index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Neighbors of `idx` in `dir`, in edge insertion (declaration) order.
///
/// petgraph iterates adjacency lists newest-first; sorting by the stable edge
/// index restores the order edges were declared in.
pub(crate) fn ordered_neighbors(
    graph: &ActionGraph,
    idx: NodeIndex,
    dir: Direction,
) -> Vec<NodeIndex> {
    let mut edges: Vec<(EdgeIndex, NodeIndex)> = graph
        .edges_directed(idx, dir)
        .map(|e| {
            let other = match dir {
                Direction::Outgoing => e.target(),
                Direction::Incoming => e.source(),
            };
            (e.id(), other)
        })
        .collect();
    edges.sort_unstable_by_key(|(edge, _)| *edge);
    edges.into_iter().map(|(_, node)| node).collect()
}

fn validate_node(position: usize, spec: &ActionSpec, scores: &ScoreMap) -> Result<Node> {
    if spec.id.trim().is_empty() {
        return Err(GraphError::EmptyIdentifier { position });
    }
    let invalid = |reason: &str| GraphError::InvalidNode {
        id: spec.id.clone(),
        reason: reason.to_string(),
    };
    if spec.category.trim().is_empty() {
        return Err(invalid("category is empty"));
    }
    if !spec.effort_cost.is_finite() {
        return Err(invalid("effort_cost is not a finite number"));
    }
    if spec.effort_cost < 0.0 {
        return Err(invalid("effort_cost is negative"));
    }

    let score = scores
        .get(&spec.id)
        .copied()
        .or(spec.score)
        .filter(|s| s.is_finite())
        .unwrap_or(0.0);

    Ok(Node {
        id: spec.id.clone(),
        effort_cost: spec.effort_cost,
        category: spec.category.clone(),
        score,
        impacts: spec.impacts.clone(),
    })
}

fn validate_edge(edge: &Edge) -> Result<()> {
    if !edge.strength.is_finite() || !(0.0..=1.0).contains(&edge.strength) {
        return Err(GraphError::InvalidEdge {
            from: edge.from.clone(),
            to: edge.to.clone(),
            reason: format!("strength {} is outside [0, 1]", edge.strength),
        });
    }
    Ok(())
}

/// Flatten embedded dependencies of the surviving declaration of each id.
fn embedded_edges(
    specs: &[&ActionSpec],
    facts: Option<&FactContext>,
) -> Result<(Vec<Edge>, Vec<DroppedEdge>)> {
    let last: HashMap<&str, usize> = specs
        .iter()
        .enumerate()
        .map(|(position, spec)| (spec.id.as_str(), position))
        .collect();

    let mut edges = Vec::new();
    let mut dropped = Vec::new();

    for (position, spec) in specs.iter().enumerate() {
        if last.get(spec.id.as_str()) != Some(&position) {
            continue;
        }
        for (edge, dep) in spec.edges().zip(&spec.dependencies) {
            validate_edge(&edge)?;
            let unmet = match (facts, &dep.condition) {
                (Some(facts), Some(condition)) => !condition.evaluate(facts).is_met(),
                _ => false,
            };
            if unmet {
                debug!(from = %edge.from, to = %edge.to, "conditional dependency not active");
                dropped.push(DroppedEdge {
                    from: edge.from,
                    to: edge.to,
                    kind: edge.kind,
                    reason: DropReason::ConditionUnmet,
                });
            } else {
                edges.push(edge);
            }
        }
    }

    Ok((edges, dropped))
}

/// Compute a BLAKE3 hash over node ids (registration order) and the sorted
/// retained edge list.
fn compute_content_hash(graph: &ActionGraph) -> String {
    let mut hasher = blake3::Hasher::new();
    for idx in graph.node_indices() {
        hasher.update(graph[idx].id.as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");

    let mut edges: Vec<(&str, &str, &'static str)> = graph
        .edge_references()
        .map(|e| {
            (
                graph[e.source()].id.as_str(),
                graph[e.target()].id.as_str(),
                e.weight().kind.as_str(),
            )
        })
        .collect();
    edges.sort_unstable();

    for (from, to, kind) in edges {
        hasher.update(from.as_bytes());
        hasher.update(b"\x00");
        hasher.update(to.as_bytes());
        hasher.update(b"\x00");
        hasher.update(kind.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
