//! Critical path to a target action.
//!
//! The critical path of `target` is the longest dependency chain, counted in
//! nodes, that starts at a root and ends at `target`. Items on it are the
//! ones that cannot be parallelised away: every step must finish before the
//! next can start.
//!
//! # Algorithm
//!
//! 1. Collect `target` and all of its ancestors.
//! 2. Visit them in canonical order (level-major, so every dependency is
//!    seen before its dependents) and record, per node, the length of the
//!    longest chain ending there and the dependency it came through.
//! 3. Walk the recorded predecessors back from `target`.
//!
//! Ties between equally long chains go to the dependency declared first.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::NodeIndex;

use crate::graph::DependencyGraph;
use crate::model::Node;

impl DependencyGraph {
    /// Longest root-to-`target` chain, root first.
    ///
    /// Returns just `[target]` when it has no dependencies and an empty list
    /// for unknown ids.
    #[must_use]
    pub fn critical_path(&self, target: &str) -> Vec<&Node> {
        let Some(target_idx) = self.index(target) else {
            return Vec::new();
        };

        let mut members = self.closure(target_idx, Direction::Outgoing);
        members.insert(target_idx);

        // node -> (chain length ending here, predecessor on that chain)
        let mut best: HashMap<NodeIndex, (usize, Option<NodeIndex>)> =
            HashMap::with_capacity(members.len());

        for idx in self.sequence.iter().filter(|idx| members.contains(idx)) {
            let mut entry = (1, None);
            for dep in self.dependency_indices(*idx) {
                let Some(&(len, _)) = best.get(&dep) else {
                    continue;
                };
                if len + 1 > entry.0 {
                    entry = (len + 1, Some(dep));
                }
            }
            best.insert(*idx, entry);
        }

        let mut path = Vec::with_capacity(best.get(&target_idx).map_or(1, |(len, _)| *len));
        let mut cursor = Some(target_idx);
        while let Some(idx) = cursor {
            path.push(&self.graph[idx]);
            cursor = best.get(&idx).and_then(|(_, pred)| *pred);
        }
        path.reverse();
        path
    }
}
