pub mod completions;
pub mod listing;
pub mod plan;
pub mod query;
pub mod select;

use std::path::Path;

use ordo_core::config::EngineConfig;

use crate::input::{self, LoadedPlan};

/// Read the plan at `path` and build its graph with `config`.
pub fn load_plan(path: &Path, config: &EngineConfig) -> anyhow::Result<LoadedPlan> {
    input::read_plan(path)?.build_graph(&config.repair)
}
