//! Dependency graph over scored actions.
//!
//! # Overview
//!
//! This module turns action declarations into an acyclic petgraph-based
//! dependency graph and answers every ordering question asked of it: levels,
//! the canonical sequence, parallel groups, closures, critical paths, impact
//! and ranked listings. The selector in [`crate::schedule`] runs on top of it.
//!
//! ## Pipeline
//!
//! ```text
//! ActionSpec records + ScoreMap
//!        ↓  build::DependencyGraph::from_actions()
//! nodes + edges (dangling and duplicate edges dropped)
//!        ↓  cycles::repair_cycles()
//! acyclic graph
//!        ↓  levels::compute_levels()
//! level per node
//!        ↓  sequence::canonical_order()
//! DependencyGraph (read-only; queries in query.rs, critical_path.rs, stats.rs)
//! ```
//!
//! ## Cache Invalidation
//!
//! [`DependencyGraph::content_hash`] is a BLAKE3 hash of the node ids and
//! retained edge set. Two builds over the same input produce the same hash.

pub mod build;
pub mod critical_path;
pub mod cycles;
pub mod levels;
pub mod query;
pub mod sequence;
pub mod stats;

// Re-export primary types at module level for convenience.
pub use build::{BuildDiagnostics, DependencyGraph, DropReason, DroppedEdge};
pub use cycles::{CycleRepair, RemovedEdge};
pub use query::{ImpactReport, Neighbor};
pub use stats::GraphSummary;
