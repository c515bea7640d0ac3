//! Mean-payoff games: integer weights on vertices.

use super::{Graph, Validate, VertexId};
use crate::error::GraphError;

/// Mean-payoff game graph: integer weight on vertices, nothing on edges
pub type MeanPayoffGraph = Graph<i64, ()>;

impl Validate for MeanPayoffGraph {
    fn validate(&self) -> Result<(), GraphError> {
        self.check_structure(false)
    }
}

impl MeanPayoffGraph {
    pub fn weight(&self, v: VertexId) -> i64 {
        *self.attr(v)
    }

    /// Vertex weights in id order
    pub fn weights(&self) -> Vec<i64> {
        self.ids().map(|v| self.weight(v)).collect()
    }

    /// Largest absolute weight, 0 for an empty graph
    pub fn max_abs_weight(&self) -> i64 {
        self.ids().map(|v| self.weight(v).abs()).max().unwrap_or(0)
    }
}
