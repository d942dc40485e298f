//! Plan documents: the actions, scores and facts one invocation works on.
//!
//! A plan is read from TOML or JSON, picked by file extension
//! (`.json` → JSON, anything else → TOML).
//!
//! ```toml
//! [[actions]]
//! id = "budget"
//! effort_cost = 1.0
//! category = "planning"
//!
//! [[actions]]
//! id = "emergency-fund"
//! effort_cost = 4.0
//! category = "savings"
//! dependencies = [{ target_id = "budget", kind = "hard" }]
//!
//! [scores]
//! emergency-fund = 80.0
//!
//! [context]
//! monthly_income = 5200
//! has_employer_match = true
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use ordo_core::applicability::{self, ApplicabilityMap};
use ordo_core::config::RepairConfig;
use ordo_core::graph::DependencyGraph;
use ordo_core::model::{ActionSpec, ScoreMap};
use ordo_core::predicate::FactContext;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanDocument {
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
    #[serde(default)]
    pub scores: ScoreMap,
    /// Facts for conditional actions and dependencies. Empty means "no
    /// context": conditions are not evaluated at all.
    #[serde(default)]
    pub context: FactContext,
}

/// A built graph plus the actions left out of it.
#[derive(Debug)]
pub struct LoadedPlan {
    pub graph: DependencyGraph,
    /// Ids whose conditions were not met, in declaration order.
    pub skipped: Vec<String>,
}

/// Read and parse a plan document.
pub fn read_plan(path: &Path) -> Result<PlanDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let doc: PlanDocument = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse plan {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse plan {}", path.display()))?
    };
    debug!(
        path = %path.display(),
        actions = doc.actions.len(),
        facts = doc.context.len(),
        "plan loaded"
    );
    Ok(doc)
}

impl PlanDocument {
    /// Build the dependency graph for this plan.
    ///
    /// With a non-empty context, actions whose conditions are not met are
    /// left out and conditional dependencies are evaluated; without one,
    /// every action and dependency is used.
    pub fn build_graph(&self, config: &RepairConfig) -> Result<LoadedPlan> {
        if self.context.is_empty() {
            let graph = DependencyGraph::from_actions(&self.actions, &self.scores, config)
                .context("failed to build dependency graph")?;
            return Ok(LoadedPlan {
                graph,
                skipped: Vec::new(),
            });
        }

        let map: ApplicabilityMap = applicability::assess(&self.actions, &self.context);
        let skipped: Vec<String> = self
            .actions
            .iter()
            .filter(|action| map.get(&action.id).is_some_and(|a| !a.applicable))
            .map(|action| action.id.clone())
            .collect();
        if !skipped.is_empty() {
            info!(skipped = skipped.len(), "actions not applicable in context");
        }

        let graph = DependencyGraph::from_actions_in_context(
            applicability::applicable_actions(&self.actions, &map),
            &self.scores,
            &self.context,
            config,
        )
        .context("failed to build dependency graph")?;

        Ok(LoadedPlan { graph, skipped })
    }
}
