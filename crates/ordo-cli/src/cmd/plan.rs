//! `ordo plan`: canonical sequence, parallel groups and build diagnostics.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use ordo_core::config::EngineConfig;
use ordo_core::graph::{BuildDiagnostics, GraphSummary};
use serde::Serialize;

use crate::output::{OutputMode, render, section};

/// Arguments for `ordo plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Plan document (TOML, or JSON with a `.json` extension).
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct SequenceEntry<'a> {
    id: &'a str,
    level: usize,
    score: f64,
    effort_cost: f64,
    category: &'a str,
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    content_hash: &'a str,
    sequence: Vec<SequenceEntry<'a>>,
    groups: Vec<Vec<&'a str>>,
    summary: GraphSummary,
    diagnostics: &'a BuildDiagnostics,
    skipped: &'a [String],
}

/// Execute `ordo plan`.
pub fn run_plan(args: &PlanArgs, output: OutputMode, config: &EngineConfig) -> anyhow::Result<()> {
    let loaded = super::load_plan(&args.file, config)?;
    let graph = &loaded.graph;

    let sequence = graph
        .sequence()
        .into_iter()
        .map(|node| SequenceEntry {
            id: &node.id,
            level: graph.level(&node.id).unwrap_or(0),
            score: node.score,
            effort_cost: node.effort_cost,
            category: &node.category,
        })
        .collect();
    let groups = graph
        .parallel_groups()
        .into_iter()
        .map(|group| group.into_iter().map(|node| node.id.as_str()).collect())
        .collect();

    let payload = PlanOutput {
        content_hash: graph.content_hash(),
        sequence,
        groups,
        summary: graph.summary(),
        diagnostics: graph.diagnostics(),
        skipped: &loaded.skipped,
    };

    render(output, &payload, render_plan_text)
}

fn render_plan_text(payload: &PlanOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    section(w, "sequence")?;
    for (pos, entry) in payload.sequence.iter().enumerate() {
        writeln!(
            w,
            "  {:>3}. {}  (level {}, score {:.1}, effort {:.1}, {})",
            pos + 1,
            entry.id,
            entry.level,
            entry.score,
            entry.effort_cost,
            entry.category
        )?;
    }

    section(w, "groups")?;
    for (level, group) in payload.groups.iter().enumerate() {
        writeln!(w, "  level {level}: {}", group.join(", "))?;
    }

    let diagnostics = payload.diagnostics;
    if !diagnostics.is_clean() || !payload.skipped.is_empty() {
        section(w, "warnings")?;
        for removed in &diagnostics.repair.removed {
            writeln!(
                w,
                "  removed {} -> {} (cycle {})",
                removed.from,
                removed.to,
                removed.cycle.join(" -> ")
            )?;
        }
        for dropped in &diagnostics.dropped_edges {
            writeln!(
                w,
                "  dropped {} -> {} ({})",
                dropped.from,
                dropped.to,
                dropped.reason.as_str()
            )?;
        }
        for id in &diagnostics.duplicate_ids {
            writeln!(w, "  duplicate id {id}")?;
        }
        for id in payload.skipped {
            writeln!(w, "  not applicable {id}")?;
        }
    }

    writeln!(
        w,
        "{} actions, {} dependencies, {} levels, {}",
        payload.summary.node_count,
        payload.summary.edge_count,
        payload.summary.level_count,
        payload.content_hash
    )
}
