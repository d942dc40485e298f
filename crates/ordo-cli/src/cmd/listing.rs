//! Ranked and ordered listings: `quick-wins`, `foundations` and `order`.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use ordo_core::config::EngineConfig;
use ordo_core::model::Node;
use serde::Serialize;

use crate::output::{OutputMode, render, section};

/// Arguments for `ordo quick-wins`.
#[derive(Args, Debug)]
pub struct QuickWinsArgs {
    /// Plan document (TOML, or JSON with a `.json` extension).
    pub file: PathBuf,

    /// Effort ceiling for a quick win (overrides the configured value).
    #[arg(long)]
    pub max_effort: Option<f64>,
}

/// Arguments for `ordo foundations`.
#[derive(Args, Debug)]
pub struct FoundationsArgs {
    /// Plan document (TOML, or JSON with a `.json` extension).
    pub file: PathBuf,
}

/// Arguments for `ordo order`.
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Plan document (TOML, or JSON with a `.json` extension).
    pub file: PathBuf,

    /// Actions to order. Empty means the whole plan.
    pub ids: Vec<String>,

    /// Also include every prerequisite of the named actions.
    #[arg(long)]
    pub with_prerequisites: bool,
}

#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    id: &'a str,
    score: f64,
    effort_cost: f64,
    category: &'a str,
}

#[derive(Debug, Serialize)]
struct ListOutput<'a> {
    title: &'static str,
    actions: Vec<ListEntry<'a>>,
}

fn entries(nodes: Vec<&Node>) -> Vec<ListEntry<'_>> {
    nodes
        .into_iter()
        .map(|node| ListEntry {
            id: &node.id,
            score: node.score,
            effort_cost: node.effort_cost,
            category: &node.category,
        })
        .collect()
}

fn render_list_text(payload: &ListOutput<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    section(w, payload.title)?;
    if payload.actions.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for entry in &payload.actions {
        writeln!(
            w,
            "  {}  (score {:.1}, effort {:.1}, {})",
            entry.id, entry.score, entry.effort_cost, entry.category
        )?;
    }
    Ok(())
}

/// Execute `ordo quick-wins`.
pub fn run_quick_wins(
    args: &QuickWinsArgs,
    output: OutputMode,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let loaded = super::load_plan(&args.file, config)?;
    let mut query = config.query.clone();
    if let Some(max_effort) = args.max_effort {
        query.quick_win_max_effort = max_effort;
    }

    let payload = ListOutput {
        title: "quick wins",
        actions: entries(loaded.graph.quick_wins_with_config(&query)),
    };
    render(output, &payload, render_list_text)
}

/// Execute `ordo foundations`.
pub fn run_foundations(
    args: &FoundationsArgs,
    output: OutputMode,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let loaded = super::load_plan(&args.file, config)?;
    let payload = ListOutput {
        title: "foundations",
        actions: entries(loaded.graph.foundation_nodes()),
    };
    render(output, &payload, render_list_text)
}

/// Execute `ordo order`.
pub fn run_order(args: &OrderArgs, output: OutputMode, config: &EngineConfig) -> anyhow::Result<()> {
    let loaded = super::load_plan(&args.file, config)?;
    let payload = ListOutput {
        title: "order",
        actions: entries(
            loaded
                .graph
                .execution_order(&args.ids, args.with_prerequisites),
        ),
    };
    render(output, &payload, render_list_text)
}
