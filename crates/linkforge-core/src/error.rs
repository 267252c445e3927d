//! Error types for LinkForge

use thiserror::Error;

/// Main error type for LinkForge operations
#[derive(Debug, Error)]
pub enum LinkForgeError {
    /// Error in matcher or constraint configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A constraint was asked about a relation type it does not model
    #[error("Unsupported relation: {relation}")]
    UnsupportedRelation {
        /// The relation URI that was rejected.
        relation: String,
    },

    /// An alignment was added to a constraint state that cannot accept it
    #[error("Alignment {entity1} -> {entity2} ({relation}) violates the constraint")]
    InfeasibleAlignment {
        entity1: String,
        entity2: String,
        relation: String,
    },

    /// No solution satisfying the constraint could be produced
    #[error("Unsolvable constraint: {0}")]
    UnsolvableConstraint(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LinkForgeError {
    /// Creates an [`LinkForgeError::UnsupportedRelation`] for `relation`.
    pub fn unsupported_relation(relation: impl Into<String>) -> Self {
        LinkForgeError::UnsupportedRelation {
            relation: relation.into(),
        }
    }

    /// Returns true if this error means "the alignment can never be added".
    ///
    /// Matchers treat such candidates as infeasible instead of failing the run.
    pub fn is_candidate_rejection(&self) -> bool {
        matches!(
            self,
            LinkForgeError::UnsupportedRelation { .. } | LinkForgeError::InfeasibleAlignment { .. }
        )
    }
}

/// Result type alias for LinkForge operations
pub type Result<T> = std::result::Result<T, LinkForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_relation_message() {
        let err = LinkForgeError::unsupported_relation("http://example.org/sameAs");
        assert_eq!(
            err.to_string(),
            "Unsupported relation: http://example.org/sameAs"
        );
        assert!(err.is_candidate_rejection());
    }

    #[test]
    fn test_unsolvable_is_not_candidate_rejection() {
        let err = LinkForgeError::UnsolvableConstraint("no complete state".into());
        assert!(!err.is_candidate_rejection());
    }
}
