//! Input records and graph node/edge types.
//!
//! [`ActionSpec`] is what the action source hands over: already-parsed
//! declarations with embedded dependencies. The graph validates them and
//! indexes an immutable [`Node`] per identifier; caller records are never
//! mutated.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::predicate::{Condition, Predicate};

/// Externally computed desirability score per action identifier.
///
/// Supplied once per graph build and treated as opaque.
pub type ScoreMap = HashMap<String, f64>;

// ---------------------------------------------------------------------------
// Edge kinds
// ---------------------------------------------------------------------------

/// Relationship carried by a dependency edge.
///
/// Every kind participates in ordering; the kind is kept so callers can
/// distinguish strict from advisory precedence in their output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Must be completed before.
    #[default]
    Hard,
    /// Recommended before, not required.
    Soft,
    /// Can be done together.
    Parallel,
    /// Cannot be done together.
    Exclusive,
}

impl EdgeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
            Self::Parallel => "parallel",
            Self::Exclusive => "exclusive",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// A dependency declared inside an [`ActionSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub target_id: String,
    #[serde(default)]
    pub kind: EdgeKind,
    #[serde(default = "default_strength")]
    pub strength: f64,
    /// Only honoured when the graph is built against a fact context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Predicate>,
}

/// One candidate action as declared by the action source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub id: String,
    pub effort_cost: f64,
    pub category: String,
    /// Fallback score used when the build's score map has no entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Per-dimension impact attributes (e.g. `debt`, `savings`).
    #[serde(default)]
    pub impacts: BTreeMap<String, f64>,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ActionSpec {
    #[must_use]
    pub fn new(id: impl Into<String>, effort_cost: f64, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            effort_cost,
            category: category.into(),
            score: None,
            impacts: BTreeMap::new(),
            dependencies: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Declare that this action depends on `target_id` with full strength.
    #[must_use]
    pub fn depends_on(mut self, target_id: impl Into<String>, kind: EdgeKind) -> Self {
        self.dependencies.push(DependencySpec {
            target_id: target_id.into(),
            kind,
            strength: default_strength(),
            condition: None,
        });
        self
    }

    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    #[must_use]
    pub fn with_impact(mut self, dimension: impl Into<String>, value: f64) -> Self {
        self.impacts.insert(dimension.into(), value);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Edges implied by the embedded dependency declarations.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.dependencies.iter().map(|dep| Edge {
            from: self.id.clone(),
            to: dep.target_id.clone(),
            kind: dep.kind,
            strength: dep.strength,
        })
    }
}

/// A directed dependency: `from` depends on `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub kind: EdgeKind,
    #[serde(default = "default_strength")]
    pub strength: f64,
}

impl Edge {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            strength: default_strength(),
        }
    }

    /// Shorthand for a full-strength [`EdgeKind::Hard`] edge.
    #[must_use]
    pub fn hard(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, EdgeKind::Hard)
    }
}

const fn default_strength() -> f64 {
    1.0
}

// ---------------------------------------------------------------------------
// Graph-owned records
// ---------------------------------------------------------------------------

/// A validated action indexed by the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub effort_cost: f64,
    pub category: String,
    pub score: f64,
    pub impacts: BTreeMap<String, f64>,
}

/// Attributes carried on a retained graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dependency {
    pub kind: EdgeKind,
    pub strength: f64,
}
