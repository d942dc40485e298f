//! Per-request applicability annotations.
//!
//! [`assess`] evaluates each action's [`Condition`](crate::predicate::Condition)s
//! against a fact context and records the outcome in an
//! [`ApplicabilityMap`] keyed by action id. The action records themselves
//! are left untouched; [`applicable_actions`] is a borrowed, filtered view
//! that can be fed straight into
//! [`DependencyGraph::from_actions`](crate::graph::DependencyGraph::from_actions).

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::model::ActionSpec;
use crate::predicate::{FactContext, Outcome};

/// Whether an action applies in a given context, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applicability {
    pub applicable: bool,
    pub reasons: Vec<String>,
}

/// Annotation map: action id → applicability.
pub type ApplicabilityMap = HashMap<String, Applicability>;

/// Evaluate every action's conditions against `ctx`.
///
/// An action with no conditions is always applicable. Otherwise it applies
/// only when every condition is met; unresolved conditions count as unmet.
/// When ids repeat, the last declaration wins.
#[must_use]
pub fn assess<'a, I>(actions: I, ctx: &FactContext) -> ApplicabilityMap
where
    I: IntoIterator<Item = &'a ActionSpec>,
{
    let mut map = ApplicabilityMap::new();

    for action in actions {
        let entry = if action.conditions.is_empty() {
            Applicability {
                applicable: true,
                reasons: vec!["no conditions".to_string()],
            }
        } else {
            let mut applicable = true;
            let reasons = action
                .conditions
                .iter()
                .map(|condition| {
                    let outcome = condition.evaluate(ctx);
                    applicable &= outcome.is_met();
                    match outcome {
                        Outcome::Met => format!("met: {}", condition.description),
                        Outcome::Unmet => format!("unmet: {}", condition.description),
                        Outcome::Unresolved => format!("unresolved: {}", condition.description),
                    }
                })
                .collect();
            Applicability {
                applicable,
                reasons,
            }
        };

        if !entry.applicable {
            debug!(action = %action.id, "action not applicable");
        }
        map.insert(action.id.clone(), entry);
    }

    map
}

/// Borrowed view over the actions marked applicable in `map`.
///
/// Actions absent from `map` are treated as not applicable.
pub fn applicable_actions<'a>(
    actions: &'a [ActionSpec],
    map: &'a ApplicabilityMap,
) -> impl Iterator<Item = &'a ActionSpec> + 'a {
    actions
        .iter()
        .filter(move |action| map.get(&action.id).is_some_and(|a| a.applicable))
}
