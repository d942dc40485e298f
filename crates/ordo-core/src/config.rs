//! Engine configuration.
//!
//! [`EngineConfig`] is constructed by the caller and passed by reference to
//! each component that needs it. There is no process-wide config state.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub selector: SelectorConfig,
}

/// Cycle repair bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Detect-and-remove passes before falling back to a full back-edge sweep.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Weight applied to every enabled descendant in impact reports.
    #[serde(default = "default_impact_decay")]
    pub impact_decay: f64,
    #[serde(default = "default_quick_win_max_effort")]
    pub quick_win_max_effort: f64,
    #[serde(default = "default_quick_win_max_dependencies")]
    pub quick_win_max_dependencies: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            impact_decay: default_impact_decay(),
            quick_win_max_effort: default_quick_win_max_effort(),
            quick_win_max_dependencies: default_quick_win_max_dependencies(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_max_actions")]
    pub max_actions: usize,
    #[serde(default = "default_max_effort")]
    pub max_effort: f64,
    #[serde(default)]
    pub required_categories: Vec<String>,
    /// Let the category coverage pass exceed `max_actions`.
    #[serde(default = "default_true")]
    pub allow_category_overflow: bool,
    /// Bring a category pick's missing prerequisites in with it. Off, the
    /// pick is admitted on its own.
    #[serde(default)]
    pub close_category_prerequisites: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_actions: default_max_actions(),
            max_effort: default_max_effort(),
            required_categories: Vec::new(),
            allow_category_overflow: default_true(),
            close_category_prerequisites: false,
        }
    }
}

/// Load an [`EngineConfig`] from a TOML file.
///
/// A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

const fn default_true() -> bool {
    true
}

const fn default_max_passes() -> usize {
    8
}

const fn default_impact_decay() -> f64 {
    0.5
}

const fn default_quick_win_max_effort() -> f64 {
    5.0
}

const fn default_quick_win_max_dependencies() -> usize {
    1
}

const fn default_max_actions() -> usize {
    10
}

const fn default_max_effort() -> f64 {
    100.0
}
