#![forbid(unsafe_code)]
//! ordo-core library.
//!
//! Orders scored candidate actions that declare dependencies on each other:
//! a deterministic execution sequence, "can run together" layers, graph
//! queries and a budgeted greedy selection.
//!
//! # Conventions
//!
//! - **Errors**: build-time validation failures are [`GraphError`]; config
//!   and file loading use `anyhow::Result`. Everything else is total.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//!
//! # Typical Usage
//!
//! ```rust
//! use ordo_core::config::EngineConfig;
//! use ordo_core::graph::DependencyGraph;
//! use ordo_core::model::{ActionSpec, EdgeKind, ScoreMap};
//! use ordo_core::schedule::select_actions;
//!
//! let actions = vec![
//!     ActionSpec::new("budget", 1.0, "planning"),
//!     ActionSpec::new("emergency-fund", 4.0, "savings").depends_on("budget", EdgeKind::Hard),
//! ];
//! let scores = ScoreMap::from([("emergency-fund".to_string(), 80.0)]);
//! let config = EngineConfig::default();
//!
//! let graph = DependencyGraph::from_actions(&actions, &scores, &config.repair)?;
//! assert_eq!(graph.sequence_ids(), vec!["budget", "emergency-fund"]);
//!
//! let selection = select_actions(&graph, &config.selector);
//! assert_eq!(selection.ids(), vec!["budget", "emergency-fund"]);
//! # Ok::<(), ordo_core::GraphError>(())
//! ```

pub mod applicability;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod predicate;
pub mod schedule;

pub use error::{ErrorCode, GraphError, Result};
