//! Typed applicability predicates.
//!
//! Conditions are a closed set of predicate variants evaluated against a
//! [`FactContext`] by exhaustive matching. There is no expression language
//! and nothing to sandbox.
//!
//! Evaluation is three-valued: a leaf that names a missing fact, or a fact
//! of the wrong type, is [`Outcome::Unresolved`]. Unresolved never counts as
//! met.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single known fact about the caller's situation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fact {
    Flag(bool),
    Number(f64),
}

/// Facts keyed by field name.
pub type FactContext = BTreeMap<String, Fact>;

/// Comparison operator for [`Predicate::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    fn apply(self, lhs: f64, rhs: f64) -> bool {
        let equal = (lhs - rhs).abs() <= f64::EPSILON;
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs < rhs || equal,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs > rhs || equal,
            Self::Eq => equal,
            Self::Ne => !equal,
        }
    }
}

/// Result of evaluating a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Met,
    Unmet,
    Unresolved,
}

impl Outcome {
    #[must_use]
    pub const fn is_met(self) -> bool {
        matches!(self, Self::Met)
    }

    const fn from_bool(met: bool) -> Self {
        if met { Self::Met } else { Self::Unmet }
    }

    const fn negate(self) -> Self {
        match self {
            Self::Met => Self::Unmet,
            Self::Unmet => Self::Met,
            Self::Unresolved => Self::Unresolved,
        }
    }
}

/// A typed condition over facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// `fact <op> value` for a numeric fact.
    Compare {
        field: String,
        op: CompareOp,
        value: f64,
    },
    /// `min <= fact <= max` for a numeric fact.
    InRange { field: String, min: f64, max: f64 },
    /// A boolean fact that must be `true`.
    IsTrue { field: String },
    All { of: Vec<Predicate> },
    Any { of: Vec<Predicate> },
    Not { predicate: Box<Predicate> },
}

impl Predicate {
    #[must_use]
    pub fn compare(field: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value,
        }
    }

    #[must_use]
    pub fn in_range(field: impl Into<String>, min: f64, max: f64) -> Self {
        Self::InRange {
            field: field.into(),
            min,
            max,
        }
    }

    /// Evaluate against `ctx`.
    #[must_use]
    pub fn evaluate(&self, ctx: &FactContext) -> Outcome {
        match self {
            Self::Compare { field, op, value } => match ctx.get(field) {
                Some(Fact::Number(actual)) => Outcome::from_bool(op.apply(*actual, *value)),
                _ => Outcome::Unresolved,
            },
            Self::InRange { field, min, max } => match ctx.get(field) {
                Some(Fact::Number(actual)) => {
                    Outcome::from_bool(*min <= *actual && *actual <= *max)
                }
                _ => Outcome::Unresolved,
            },
            Self::IsTrue { field } => match ctx.get(field) {
                Some(Fact::Flag(flag)) => Outcome::from_bool(*flag),
                _ => Outcome::Unresolved,
            },
            Self::All { of } => {
                let mut outcome = Outcome::Met;
                for predicate in of {
                    match predicate.evaluate(ctx) {
                        Outcome::Unmet => return Outcome::Unmet,
                        Outcome::Unresolved => outcome = Outcome::Unresolved,
                        Outcome::Met => {}
                    }
                }
                outcome
            }
            Self::Any { of } => {
                let mut outcome = Outcome::Unmet;
                for predicate in of {
                    match predicate.evaluate(ctx) {
                        Outcome::Met => return Outcome::Met,
                        Outcome::Unresolved => outcome = Outcome::Unresolved,
                        Outcome::Unmet => {}
                    }
                }
                outcome
            }
            Self::Not { predicate } => predicate.evaluate(ctx).negate(),
        }
    }
}

/// A described predicate gating whether an action applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub predicate: Predicate,
    pub description: String,
}

impl Condition {
    #[must_use]
    pub fn new(predicate: Predicate, description: impl Into<String>) -> Self {
        Self {
            predicate,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn evaluate(&self, ctx: &FactContext) -> Outcome {
        self.predicate.evaluate(ctx)
    }
}
