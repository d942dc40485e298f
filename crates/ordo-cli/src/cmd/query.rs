//! `ordo query`: single-action graph queries.
//!
//! Unknown ids are not an error: set-valued queries return an empty list
//! and `impact` returns `null`.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use ordo_core::config::EngineConfig;
use ordo_core::graph::{DependencyGraph, ImpactReport, Neighbor};
use ordo_core::model::{EdgeKind, Node};
use serde::Serialize;
use tracing::debug;

use crate::output::{OutputMode, render, section};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryKind {
    /// Everything the action transitively depends on.
    Ancestors,
    /// Everything that transitively depends on the action.
    Descendants,
    /// Longest dependency chain ending at the action.
    CriticalPath,
    /// Direct and propagated value of the action.
    Impact,
    /// All prerequisites plus the action, in sequence order.
    MinimumPath,
    /// Direct dependencies.
    Dependencies,
    /// Direct dependents.
    Dependents,
}

/// Arguments for `ordo query`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Plan document (TOML, or JSON with a `.json` extension).
    pub file: PathBuf,

    /// Which query to run.
    #[arg(value_enum)]
    pub kind: QueryKind,

    /// Action id to query.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct NeighborEntry<'a> {
    id: &'a str,
    kind: EdgeKind,
    strength: f64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum QueryResult<'a> {
    Ids(Vec<&'a str>),
    Neighbors(Vec<NeighborEntry<'a>>),
    Impact(Option<ImpactReport>),
}

#[derive(Debug, Serialize)]
struct QueryOutput<'a> {
    id: &'a str,
    query: &'static str,
    known: bool,
    result: QueryResult<'a>,
}

const fn query_name(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::Ancestors => "ancestors",
        QueryKind::Descendants => "descendants",
        QueryKind::CriticalPath => "critical-path",
        QueryKind::Impact => "impact",
        QueryKind::MinimumPath => "minimum-path",
        QueryKind::Dependencies => "dependencies",
        QueryKind::Dependents => "dependents",
    }
}

fn node_ids(nodes: Vec<&Node>) -> Vec<&str> {
    nodes.into_iter().map(|node| node.id.as_str()).collect()
}

fn neighbor_entries(neighbors: Vec<Neighbor<'_>>) -> Vec<NeighborEntry<'_>> {
    neighbors
        .into_iter()
        .map(|neighbor| NeighborEntry {
            id: &neighbor.node.id,
            kind: neighbor.kind,
            strength: neighbor.strength,
        })
        .collect()
}

fn run_query<'a>(
    graph: &'a DependencyGraph,
    kind: QueryKind,
    id: &str,
    config: &EngineConfig,
) -> QueryResult<'a> {
    match kind {
        QueryKind::Ancestors => QueryResult::Ids(node_ids(graph.prerequisites(id))),
        QueryKind::Descendants => QueryResult::Ids(node_ids(graph.enabled_by(id))),
        QueryKind::CriticalPath => QueryResult::Ids(node_ids(graph.critical_path(id))),
        QueryKind::MinimumPath => QueryResult::Ids(node_ids(graph.minimum_path(id))),
        QueryKind::Dependencies => QueryResult::Neighbors(neighbor_entries(graph.dependencies_of(id))),
        QueryKind::Dependents => QueryResult::Neighbors(neighbor_entries(graph.dependents_of(id))),
        QueryKind::Impact => QueryResult::Impact(graph.impact_with_config(id, &config.query)),
    }
}

/// Execute `ordo query`.
pub fn run_query_cmd(
    args: &QueryArgs,
    output: OutputMode,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let loaded = super::load_plan(&args.file, config)?;
    let graph = &loaded.graph;

    let known = graph.contains(&args.id);
    if !known {
        debug!(id = %args.id, "query for unknown action");
    }

    let payload = QueryOutput {
        id: &args.id,
        query: query_name(args.kind),
        known,
        result: run_query(graph, args.kind, &args.id, config),
    };
    render(output, &payload, render_query_text)
}

fn render_query_text(payload: &QueryOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    if !payload.known {
        writeln!(w, "unknown action: {}", payload.id)?;
        return Ok(());
    }
    section(w, &format!("{} of {}", payload.query, payload.id))?;
    match &payload.result {
        QueryResult::Ids(ids) if ids.is_empty() => writeln!(w, "  (none)")?,
        QueryResult::Ids(ids) => {
            for id in ids {
                writeln!(w, "  {id}")?;
            }
        }
        QueryResult::Neighbors(neighbors) if neighbors.is_empty() => writeln!(w, "  (none)")?,
        QueryResult::Neighbors(neighbors) => {
            for neighbor in neighbors {
                writeln!(
                    w,
                    "  {}  ({:?}, strength {:.2})",
                    neighbor.id, neighbor.kind, neighbor.strength
                )?;
            }
        }
        QueryResult::Impact(None) => writeln!(w, "  (none)")?,
        QueryResult::Impact(Some(report)) => {
            for (dimension, value) in &report.total {
                let direct = report.direct.get(dimension).copied().unwrap_or(0.0);
                writeln!(w, "  {dimension}: {value:.2} (direct {direct:.2})")?;
            }
            writeln!(
                w,
                "  enables {} actions, unlocked value {:.2}",
                report.enabled_count, report.unlocked_value
            )?;
        }
    }
    Ok(())
}
