//! Budgeted greedy selection of actions.
//!
//! # Algorithm
//!
//! 1. Walk the graph's canonical sequence (level-major, best score first).
//! 2. Stop once `max_actions` nodes are selected.
//! 3. Skip a node whose own effort no longer fits the remaining budget.
//! 4. Otherwise gather its **bundle**: every not-yet-selected ancestor plus
//!    the node itself. Admit the bundle (ancestors first, in canonical order)
//!    only if its total effort fits the remaining budget and its size fits
//!    the remaining count; partial bundles are never admitted.
//! 5. **Category coverage**: for each required category still without a
//!    representative, admit the first unselected action of that category
//!    that fits the remaining budget. It is admitted on its own, so it may
//!    lack prerequisites; with `close_category_prerequisites` its bundle is
//!    admitted instead and must fit as a whole. The count cap may be
//!    exceeded here only when `allow_category_overflow` is set; the effort
//!    budget never is.
//!
//! The result is greedy, not optimal: a high-ranked expensive action can
//! crowd out several cheaper ones that together would score higher.

use std::collections::HashSet;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SelectorConfig;
use crate::graph::DependencyGraph;
use crate::model::Node;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Why an action entered the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdmissionReason {
    /// Selected on its own rank in the canonical sequence.
    Ranked,
    /// Pulled in because a selected action depends on it.
    Prerequisite { of: String },
    /// Selected to give a required category a representative.
    CategoryCoverage { category: String },
}

/// One selected action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Admission<'a> {
    pub node: &'a Node,
    pub reason: AdmissionReason,
}

/// Result of [`select_actions`], in admission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection<'a> {
    pub admitted: Vec<Admission<'a>>,
    pub total_effort: f64,
    /// Budget left over (`max_effort - total_effort`).
    pub remaining_effort: f64,
    /// `true` if the category pass went over `max_actions`.
    pub exceeded_count_cap: bool,
    /// Required categories that could not be covered within budget.
    pub uncovered_categories: Vec<String>,
}

impl<'a> Selection<'a> {
    /// Selected identifiers in admission order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'a str> {
        self.admitted.iter().map(|a| a.node.id.as_str()).collect()
    }

    /// Selected node records in admission order.
    #[must_use]
    pub fn nodes(&self) -> Vec<&'a Node> {
        self.admitted.iter().map(|a| a.node).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.admitted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.admitted.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.admitted.iter().any(|a| a.node.id == id)
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

struct SelectorState<'g, 'c> {
    graph: &'g DependencyGraph,
    config: &'c SelectorConfig,
    selected: HashSet<NodeIndex>,
    admitted: Vec<Admission<'g>>,
    total_effort: f64,
}

impl SelectorState<'_, '_> {
    /// Whether admitting `bundle` keeps the running total within budget.
    ///
    /// Sums in admission order so the check matches the total `admit`
    /// will actually reach.
    fn fits_budget(&self, bundle: &[NodeIndex]) -> bool {
        let total = bundle
            .iter()
            .fold(self.total_effort, |acc, idx| acc + self.graph.graph[*idx].effort_cost);
        total <= self.config.max_effort
    }

    fn fits_count(&self, extra: usize) -> bool {
        self.admitted.len() + extra <= self.config.max_actions
    }

    /// Unselected ancestors of `idx` in canonical order, followed by `idx`.
    fn bundle(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let missing: HashSet<NodeIndex> = self
            .graph
            .closure(idx, Direction::Outgoing)
            .into_iter()
            .filter(|dep| !self.selected.contains(dep))
            .collect();
        let mut bundle: Vec<NodeIndex> = self
            .graph
            .sequence
            .iter()
            .copied()
            .filter(|dep| missing.contains(dep))
            .collect();
        bundle.push(idx);
        bundle
    }

    /// Admit `bundle`; its last entry is the head and gets `head_reason`.
    fn admit(&mut self, bundle: &[NodeIndex], head_reason: AdmissionReason) {
        let Some((&head, prerequisites)) = bundle.split_last() else {
            return;
        };
        let graph = self.graph;
        let head_node = &graph.graph[head];
        for idx in prerequisites {
            self.push(
                *idx,
                AdmissionReason::Prerequisite {
                    of: head_node.id.clone(),
                },
            );
        }
        self.push(head, head_reason);
    }

    fn push(&mut self, idx: NodeIndex, reason: AdmissionReason) {
        let graph = self.graph;
        let node = &graph.graph[idx];
        debug!(id = %node.id, ?reason, "action admitted");
        self.selected.insert(idx);
        self.total_effort += node.effort_cost;
        self.admitted.push(Admission { node, reason });
    }

    fn has_category(&self, category: &str) -> bool {
        self.admitted.iter().any(|a| a.node.category == category)
    }
}

/// Select a dependency-closed subset of actions under a count cap and an
/// effort budget.
///
/// See the module docs for the exact admission rules.
#[must_use]
pub fn select_actions<'a>(graph: &'a DependencyGraph, config: &SelectorConfig) -> Selection<'a> {
    let mut state = SelectorState {
        graph,
        config,
        selected: HashSet::new(),
        admitted: Vec::new(),
        total_effort: 0.0,
    };

    // --- Ranked pass ---
    for &idx in &graph.sequence {
        if !state.fits_count(1) {
            break;
        }
        if state.selected.contains(&idx) {
            continue;
        }
        let node = &graph.graph[idx];
        if !state.fits_budget(&[idx]) {
            debug!(id = %node.id, effort = node.effort_cost, "skipped: over budget");
            continue;
        }

        let bundle = state.bundle(idx);
        if state.fits_budget(&bundle) && state.fits_count(bundle.len()) {
            state.admit(&bundle, AdmissionReason::Ranked);
        } else {
            debug!(
                id = %node.id,
                bundle = bundle.len(),
                "skipped: prerequisites do not fit"
            );
        }
    }

    // --- Category coverage pass ---
    let mut exceeded_count_cap = false;
    let mut uncovered_categories = Vec::new();
    let mut seen_categories: HashSet<&str> = HashSet::new();

    for category in &config.required_categories {
        if !seen_categories.insert(category.as_str()) || state.has_category(category) {
            continue;
        }

        let mut covered = false;
        for &idx in &graph.sequence {
            let node = &graph.graph[idx];
            if node.category != *category || state.selected.contains(&idx) {
                continue;
            }
            let bundle = if config.close_category_prerequisites {
                state.bundle(idx)
            } else {
                vec![idx]
            };
            if !state.fits_budget(&bundle) {
                continue;
            }
            let within_cap = state.fits_count(bundle.len());
            if !within_cap && !config.allow_category_overflow {
                continue;
            }

            if !within_cap {
                warn!(%category, id = %node.id, "category coverage exceeds max_actions");
                exceeded_count_cap = true;
            }
            state.admit(
                &bundle,
                AdmissionReason::CategoryCoverage {
                    category: category.clone(),
                },
            );
            covered = true;
            break;
        }

        if !covered {
            warn!(%category, "required category left uncovered");
            uncovered_categories.push(category.clone());
        }
    }

    let total_effort = state.total_effort;
    info!(
        selected = state.admitted.len(),
        total_effort,
        uncovered = uncovered_categories.len(),
        "selection complete"
    );

    Selection {
        admitted: state.admitted,
        total_effort,
        remaining_effort: config.max_effort - total_effort,
        exceeded_count_cap,
        uncovered_categories,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
