//! Error types for the Trellis library.

use thiserror::Error;

use crate::graph::EdgeKind;

/// Main error type for Trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    /// The exact (source, target, kind) relation was asserted twice.
    #[error("duplicate {kind} relation from '{from}' to '{to}'")]
    DuplicateEdge {
        from: String,
        to: String,
        kind: EdgeKind,
    },

    /// The design specification is structurally malformed.
    #[error("invalid design: {0}")]
    InvalidDesign(String),

    /// An independent variable has no conceptual relationship with the
    /// dependent variable.
    #[error(
        "independent variable '{iv}' has neither a cause nor an associate \
         relationship with the dependent variable '{dv}'"
    )]
    MissingRelation { iv: String, dv: String },

    /// The dependent variable causes an independent variable.
    #[error("the dependent variable '{dv}' causes the independent variable '{iv}'")]
    ReverseCausation { dv: String, iv: String },

    /// A relation references a variable that was never registered.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// An attempted commit violates the active rule set.
    #[error("inconsistent facts: {reason} (conflict: {})", conflict.join(", "))]
    InconsistentFacts {
        reason: String,
        conflict: Vec<String>,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Trellis operations.
pub type Result<T> = std::result::Result<T, TrellisError>;
