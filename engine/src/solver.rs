//! The interface every game solver implements.

use tracing::warn;

use crate::error::{GraphError, SolveError};
use crate::solution::Solution;

/// A solver for games on graphs of type `G`.
///
/// Solvers hold configuration only. Each call to `solve` builds fresh working
/// state, so one instance can be shared across threads and reused.
pub trait Solver<G> {
    /// Human-readable name, used for display and selection by tooling
    fn name(&self) -> &'static str;

    /// Solve the game.
    ///
    /// Invalid input is reported through `Solution::is_valid`; `Err` means an
    /// internal failure on a well-formed graph.
    fn solve(&self, graph: &G) -> Result<Solution, SolveError>;
}

/// Entry check shared by every solver: an invalid graph is logged and turned
/// into the `valid == false` solution the solver hands back.
pub(crate) fn reject_invalid(
    solver: &str,
    vertices: usize,
    check: Result<(), GraphError>,
) -> Result<(), Solution> {
    check.map_err(|err| {
        warn!(solver, error = %err, "invalid input graph");
        Solution::invalid(vertices)
    })
}
