//! Error types for the engine crate

use thiserror::Error;

use crate::graph::VertexId;

/// Structural problems detected while building or validating a game graph.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),

    #[error("duplicate vertex name '{0}'")]
    DuplicateVertex(String),

    #[error("duplicate edge {from} -> {to}")]
    DuplicateEdge { from: VertexId, to: VertexId },

    #[error("vertex '{name}' has no outgoing edge")]
    DeadEnd { name: String },

    #[error("vertex '{name}' has owner {owner}, which this game does not allow")]
    InvalidOwner { name: String, owner: String },

    #[error("vertex '{name}' has priority {priority}, expected at most {max}")]
    InvalidPriority { name: String, priority: u32, max: u32 },

    #[error("edge '{source_name}' -> '{target_name}' has discount {discount}, outside {interval}")]
    InvalidDiscount {
        source_name: String,
        target_name: String,
        discount: f64,
        interval: &'static str,
    },

    #[error("edge '{source_name}' -> '{target_name}' has probability {probability}, outside (0, 1]")]
    InvalidProbability {
        source_name: String,
        target_name: String,
        probability: f64,
    },

    #[error("probabilities leaving chance vertex '{name}' sum to {sum}, expected 1")]
    ProbabilitySum { name: String, sum: f64 },

    #[error("chance vertex '{name}' lies on a cycle of chance vertices")]
    ChanceCycle { name: String },
}

/// Failures of the embedded linear-programming engine.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SimplexError {
    #[error("invalid pivot: element {0:e} too close to zero")]
    NegligiblePivot(f64),

    #[error("objective is unbounded along column {0}")]
    Unbounded(usize),

    #[error("linear system is infeasible (phase one residual {0:e})")]
    Infeasible(f64),

    #[error("simplex exceeded {0} pivots")]
    IterationLimit(usize),

    #[error("dimension mismatch: {0}")]
    Dimension(String),
}

/// Unrecoverable failure of a solver on a structurally valid graph.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SolveError {
    #[error("linear program failed: {0}")]
    Simplex(#[from] SimplexError),
}
