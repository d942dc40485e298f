//! Cycle detection and repair.
//!
//! Action sources are hand-maintained and occasionally declare circular
//! prerequisites. Rather than rejecting the build, the repair removes the
//! closing edge of every cycle it finds and records what it removed.
//!
//! # Algorithm
//!
//! Each pass is an iterative depth-first traversal starting from every
//! unvisited node in registration order, following dependencies in
//! declaration order. Reaching a node that is still on the active path
//! records the cycle `path[pos..] + [node]`; the edge between its last two
//! entries is removed and the rest of that start node's traversal tree is
//! abandoned for the pass.
//!
//! Passes repeat until one finds nothing or [`RepairConfig::max_passes`] is
//! reached. If cycles remain at the cap, a final sweep removes every back
//! edge of one complete traversal, which always leaves the graph acyclic.

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RepairConfig;
use crate::graph::build::{ActionGraph, ordered_neighbors};
use crate::model::EdgeKind;

/// An edge removed to break a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    /// 1-based pass that removed the edge.
    pub pass: usize,
    /// The cycle that was broken, closing id repeated at the end.
    pub cycle: Vec<String>,
}

/// Outcome of cycle repair for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleRepair {
    pub removed: Vec<RemovedEdge>,
    /// Detection passes run.
    pub passes: usize,
    /// `true` if the pass cap was reached and the back-edge sweep ran.
    pub capped: bool,
}

impl CycleRepair {
    /// Return `true` if no edge had to be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    /// Stop exploring a start node's tree at its first back edge.
    FirstPerTree,
    /// Record every back edge of one complete traversal.
    AllBackEdges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Remove edges until `graph` is acyclic.
pub fn repair_cycles(graph: &mut ActionGraph, config: &RepairConfig) -> CycleRepair {
    let mut repair = CycleRepair::default();

    while repair.passes < config.max_passes {
        repair.passes += 1;
        let cycles = scan(graph, ScanMode::FirstPerTree);
        if cycles.is_empty() {
            return repair;
        }
        debug!(pass = repair.passes, cycles = cycles.len(), "cycles detected");
        remove_closing_edges(graph, &cycles, repair.passes, &mut repair.removed);
    }

    let cycles = scan(graph, ScanMode::AllBackEdges);
    if !cycles.is_empty() {
        warn!(
            max_passes = config.max_passes,
            back_edges = cycles.len(),
            "cycle repair hit its pass cap; removing all remaining back edges"
        );
        repair.capped = true;
        remove_closing_edges(graph, &cycles, repair.passes + 1, &mut repair.removed);
    }

    repair
}

fn remove_closing_edges(
    graph: &mut ActionGraph,
    cycles: &[Vec<NodeIndex>],
    pass: usize,
    removed: &mut Vec<RemovedEdge>,
) {
    for cycle in cycles {
        let [.., from, to] = cycle.as_slice() else {
            continue;
        };
        // An earlier cycle in the same pass may already have taken this edge.
        let Some(edge) = graph.find_edge(*from, *to) else {
            continue;
        };
        let Some(dependency) = graph.remove_edge(edge) else {
            continue;
        };

        let ids: Vec<String> = cycle.iter().map(|idx| graph[*idx].id.clone()).collect();
        let record = RemovedEdge {
            from: graph[*from].id.clone(),
            to: graph[*to].id.clone(),
            kind: dependency.kind,
            pass,
            cycle: ids,
        };
        warn!(
            from = %record.from,
            to = %record.to,
            cycle = %record.cycle.join(" -> "),
            "removed dependency to break cycle"
        );
        removed.push(record);
    }
}

/// Depth-first scan returning the cycles found, each as the active path
/// slice from the repeated node plus the repeated node itself.
fn scan(graph: &ActionGraph, mode: ScanMode) -> Vec<Vec<NodeIndex>> {
    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    let mut cycles = Vec::new();

    for start in graph.node_indices() {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }

        // Explicit stack of (node, its ordered dependencies, next cursor).
        let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
        let mut path: Vec<NodeIndex> = Vec::new();

        marks[start.index()] = Mark::OnPath;
        path.push(start);
        stack.push((
            start,
            ordered_neighbors(graph, start, Direction::Outgoing),
            0,
        ));

        let mut abandoned = false;
        while let Some((node, deps, cursor)) = stack.last_mut() {
            let Some(&next) = deps.get(*cursor) else {
                marks[node.index()] = Mark::Done;
                stack.pop();
                path.pop();
                continue;
            };
            *cursor += 1;

            match marks[next.index()] {
                Mark::Unvisited => {
                    marks[next.index()] = Mark::OnPath;
                    path.push(next);
                    stack.push((next, ordered_neighbors(graph, next, Direction::Outgoing), 0));
                }
                Mark::OnPath => {
                    let pos = path.iter().position(|n| *n == next).unwrap_or(0);
                    let mut cycle = path[pos..].to_vec();
                    cycle.push(next);
                    cycles.push(cycle);
                    if mode == ScanMode::FirstPerTree {
                        abandoned = true;
                        break;
                    }
                }
                Mark::Done => {}
            }
        }

        if abandoned {
            // Nodes left on the abandoned path become eligible start nodes
            // only in the next pass.
            for node in path {
                marks[node.index()] = Mark::Done;
            }
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dependency, Node};
    use std::collections::BTreeMap;

    fn graph_with(ids: &[&str], edges: &[(&str, &str)]) -> ActionGraph {
        let mut graph = ActionGraph::default();
        let idx: BTreeMap<&str, NodeIndex> = ids
            .iter()
            .map(|id| {
                let node = Node {
                    id: (*id).to_string(),
                    effort_cost: 1.0,
                    category: "c".to_string(),
                    score: 0.0,
                    impacts: BTreeMap::new(),
                };
                (*id, graph.add_node(node))
            })
            .collect();
        for (from, to) in edges {
            graph.add_edge(
                idx[from],
                idx[to],
                Dependency {
                    kind: EdgeKind::Hard,
                    strength: 1.0,
                },
            );
        }
        graph
    }

    fn remaining(graph: &ActionGraph) -> Vec<(String, String)> {
        let mut edges: Vec<(String, String)> = graph
            .edge_indices()
            .filter_map(|e| graph.edge_endpoints(e))
            .map(|(a, b)| (graph[a].id.clone(), graph[b].id.clone()))
            .collect();
        edges.sort();
        edges
    }

    #[test]
    fn acyclic_graph_is_untouched() {
        let mut graph = graph_with(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        let repair = repair_cycles(&mut graph, &RepairConfig::default());

        assert!(repair.is_empty());
        assert_eq!(repair.passes, 1);
        assert!(!repair.capped);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn two_node_cycle_loses_closing_edge() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let repair = repair_cycles(&mut graph, &RepairConfig::default());

        assert_eq!(repair.removed.len(), 1);
        let removed = &repair.removed[0];
        assert_eq!((removed.from.as_str(), removed.to.as_str()), ("B", "A"));
        assert_eq!(removed.cycle, vec!["A", "B", "A"]);
        assert_eq!(removed.pass, 1);
        assert_eq!(remaining(&graph), vec![("A".to_string(), "B".to_string())]);
        assert!(!petgraph::algo::is_cyclic_directed(&graph));
    }

    #[test]
    fn self_dependency_is_removed() {
        let mut graph = graph_with(&["A"], &[("A", "A")]);
        let repair = repair_cycles(&mut graph, &RepairConfig::default());

        assert_eq!(repair.removed.len(), 1);
        assert_eq!(repair.removed[0].cycle, vec!["A", "A"]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn overlapping_cycles_need_multiple_passes() {
        // A→B→C→A and B→A share the start node's tree; the first pass only
        // sees one of them.
        let mut graph = graph_with(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("B", "A")],
        );
        let repair = repair_cycles(&mut graph, &RepairConfig::default());

        assert_eq!(repair.removed.len(), 2);
        assert_eq!(repair.removed[0].pass, 1);
        assert_eq!(repair.removed[1].pass, 2);
        assert!(repair.passes >= 3);
        assert!(!repair.capped);
        assert!(!petgraph::algo::is_cyclic_directed(&graph));
    }

    #[test]
    fn pass_cap_falls_back_to_sweep() {
        let mut graph = graph_with(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("B", "A")],
        );
        let repair = repair_cycles(&mut graph, &RepairConfig { max_passes: 1 });

        assert!(repair.capped);
        assert_eq!(repair.passes, 1);
        assert!(repair.removed.iter().any(|r| r.pass == 2));
        assert!(!petgraph::algo::is_cyclic_directed(&graph));
    }

    #[test]
    fn zero_passes_still_yields_acyclic_graph() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let repair = repair_cycles(&mut graph, &RepairConfig { max_passes: 0 });

        assert!(repair.capped);
        assert_eq!(repair.removed.len(), 1);
        assert!(!petgraph::algo::is_cyclic_directed(&graph));
    }

    #[test]
    fn disjoint_cycles_are_repaired_in_one_pass() {
        let mut graph = graph_with(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "A"), ("C", "D"), ("D", "C")],
        );
        let repair = repair_cycles(&mut graph, &RepairConfig::default());

        assert_eq!(repair.removed.len(), 2);
        assert!(repair.removed.iter().all(|r| r.pass == 1));
        assert_eq!(repair.passes, 2);
        assert_eq!(graph.edge_count(), 2);
    }
}
