//! Error types for reading, writing and generating arenas

use thiserror::Error;

use ggg_engine::GraphError;

/// Failure to read or write a game file.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DOT syntax error on line {line}: {message}")]
    Dot { line: usize, message: String },

    #[error("{element}: attribute '{name}' has invalid value '{value}'")]
    Attribute {
        element: String,
        name: String,
        value: String,
    },

    #[error("{element}: missing attribute '{name}'")]
    MissingAttribute { element: String, name: String },

    #[error("edge refers to unknown vertex '{0}'")]
    UnknownVertex(String),

    #[error("unsupported file extension '{0}' (expected .json or .dot)")]
    Extension(String),

    #[error("invalid graph: {0}")]
    Graph(#[from] GraphError),
}

/// Generator parameters that cannot produce a valid game.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GenerateError {
    #[error("need at least one vertex")]
    NoVertices,

    #[error("out-degree range {min}..={max} is empty or starts below 1")]
    OutDegree { min: usize, max: usize },

    #[error("{name} range {min}..={max} is empty")]
    EmptyRange { name: &'static str, min: f64, max: f64 },

    #[error("discount range {min}..={max} must lie in {interval}")]
    Discount {
        min: f64,
        max: f64,
        interval: &'static str,
    },

    #[error("chance ratio {0} must be in [0, 1)")]
    ChanceRatio(f64),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
