//! `ordo select`: budgeted greedy selection over the canonical sequence.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use ordo_core::config::{EngineConfig, SelectorConfig};
use ordo_core::schedule::{AdmissionReason, Selection, select_actions};

use crate::output::{OutputMode, render, section};

/// Arguments for `ordo select`.
#[derive(Args, Debug, Default)]
pub struct SelectArgs {
    /// Plan document (TOML, or JSON with a `.json` extension).
    pub file: PathBuf,

    /// Maximum number of actions to select.
    #[arg(long)]
    pub max_actions: Option<usize>,

    /// Total effort budget.
    #[arg(long)]
    pub max_effort: Option<f64>,

    /// Category that must be represented (repeatable).
    #[arg(long = "require", value_name = "CATEGORY")]
    pub require: Vec<String>,

    /// Never exceed `--max-actions`, even for required categories.
    #[arg(long)]
    pub no_category_overflow: bool,
}

impl SelectArgs {
    /// Overlay the command-line flags on the configured selector settings.
    fn selector_config(&self, base: &SelectorConfig) -> SelectorConfig {
        let mut config = base.clone();
        if let Some(max_actions) = self.max_actions {
            config.max_actions = max_actions;
        }
        if let Some(max_effort) = self.max_effort {
            config.max_effort = max_effort;
        }
        if !self.require.is_empty() {
            config.required_categories.clone_from(&self.require);
        }
        if self.no_category_overflow {
            config.allow_category_overflow = false;
        }
        config
    }
}

/// Execute `ordo select`.
pub fn run_select(
    args: &SelectArgs,
    output: OutputMode,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let selector = args.selector_config(&config.selector);
    if !selector.max_effort.is_finite() || selector.max_effort < 0.0 {
        anyhow::bail!("--max-effort must be a finite, non-negative number");
    }

    let loaded = super::load_plan(&args.file, config)?;
    let selection = select_actions(&loaded.graph, &selector);

    render(output, &selection, render_selection_text)
}

fn render_selection_text(selection: &Selection<'_>, w: &mut dyn Write) -> std::io::Result<()> {
    section(w, "selected")?;
    if selection.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for (pos, admission) in selection.admitted.iter().enumerate() {
        let reason = match &admission.reason {
            AdmissionReason::Ranked => "ranked".to_string(),
            AdmissionReason::Prerequisite { of } => format!("prerequisite of {of}"),
            AdmissionReason::CategoryCoverage { category } => format!("covers {category}"),
        };
        writeln!(
            w,
            "  {:>3}. {}  (effort {:.1}, {})  {reason}",
            pos + 1,
            admission.node.id,
            admission.node.effort_cost,
            admission.node.category
        )?;
    }

    if !selection.uncovered_categories.is_empty() {
        section(w, "uncovered")?;
        for category in &selection.uncovered_categories {
            writeln!(w, "  {category}")?;
        }
    }

    write!(
        w,
        "{} actions, effort {:.1} used, {:.1} left",
        selection.len(),
        selection.total_effort,
        selection.remaining_effort
    )?;
    if selection.exceeded_count_cap {
        write!(w, " (count cap exceeded for category coverage)")?;
    }
    writeln!(w)
}
