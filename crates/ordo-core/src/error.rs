use std::fmt;

use thiserror::Error;

/// Result alias for graph construction.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Fatal build-time failures.
///
/// Only malformed declarations are fatal. Dangling dependencies, duplicate
/// identifiers and cycles are absorbed into
/// [`BuildDiagnostics`](crate::graph::BuildDiagnostics) instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// An action was declared without an identifier.
    #[error("action at position {position} has an empty identifier")]
    EmptyIdentifier { position: usize },

    /// An action carries a field value the graph cannot index.
    #[error("action '{id}' is invalid: {reason}")]
    InvalidNode { id: String, reason: String },

    /// A dependency declaration carries an unusable attribute.
    #[error("dependency '{from}' -> '{to}' is invalid: {reason}")]
    InvalidEdge {
        from: String,
        to: String,
        reason: String,
    },
}

impl GraphError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyIdentifier { .. } => ErrorCode::MissingIdentifier,
            Self::InvalidNode { .. } => ErrorCode::InvalidNode,
            Self::InvalidEdge { .. } => ErrorCode::InvalidEdge,
        }
    }
}

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MissingIdentifier,
    InvalidNode,
    InvalidEdge,
    ConfigParseError,
    PlanParseError,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingIdentifier => "E1001",
            Self::InvalidNode => "E1002",
            Self::InvalidEdge => "E1003",
            Self::ConfigParseError => "E2001",
            Self::PlanParseError => "E2002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingIdentifier => "Action identifier missing",
            Self::InvalidNode => "Invalid action declaration",
            Self::InvalidEdge => "Invalid dependency declaration",
            Self::ConfigParseError => "Config file parse error",
            Self::PlanParseError => "Plan document parse error",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MissingIdentifier => Some("Give every action a non-empty `id`."),
            Self::InvalidNode => {
                Some("Check `category` is non-empty and `effort_cost` is a finite, non-negative number.")
            }
            Self::InvalidEdge => Some("Dependency `strength` must be a number in [0, 1]."),
            Self::ConfigParseError => Some("Fix the TOML syntax in the config file and retry."),
            Self::PlanParseError => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::MissingIdentifier,
            ErrorCode::InvalidNode,
            ErrorCode::InvalidEdge,
            ErrorCode::ConfigParseError,
            ErrorCode::PlanParseError,
        ];
        let codes: HashSet<&str> = all.iter().map(|c| c.code()).collect();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn graph_errors_map_to_codes() {
        let err = GraphError::InvalidNode {
            id: "a".to_string(),
            reason: "negative effort".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::InvalidNode);
        assert_eq!(err.code().to_string(), "E1002");
        assert_eq!(err.to_string(), "action 'a' is invalid: negative effort");
    }
}
