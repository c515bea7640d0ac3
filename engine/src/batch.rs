//! Parallel solving across independent games.
//!
//! Each solve stays single-threaded; rayon only spreads whole solves over
//! the pool.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::error::SolveError;
use crate::solution::Solution;
use crate::solver::Solver;

/// Outcome of one timed solve
#[derive(Debug, Clone)]
pub struct TimedRun {
    pub result: Result<Solution, SolveError>,
    pub elapsed: Duration,
}

impl TimedRun {
    /// Solved on a valid graph, without an internal error
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(s) if s.is_valid() && s.is_solved())
    }
}

/// Solve one game and measure the wall-clock time.
pub fn solve_timed<G, S>(solver: &S, graph: &G) -> TimedRun
where
    S: Solver<G> + ?Sized,
{
    let start = Instant::now();
    let result = solver.solve(graph);
    TimedRun {
        result,
        elapsed: start.elapsed(),
    }
}

/// Solve every graph with the same solver, in parallel. Results keep the
/// order of `graphs`.
pub fn solve_all<G, S>(solver: &S, graphs: &[G]) -> Vec<Result<Solution, SolveError>>
where
    G: Sync,
    S: Solver<G> + Sync + ?Sized,
{
    graphs.par_iter().map(|g| solver.solve(g)).collect()
}

/// Like [`solve_all`], timing each solve.
pub fn solve_all_timed<G, S>(solver: &S, graphs: &[G]) -> Vec<TimedRun>
where
    G: Sync,
    S: Solver<G> + Sync + ?Sized,
{
    graphs.par_iter().map(|g| solve_timed(solver, g)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::solvers::{PriorityPromotionSolver, ZielonkaSolver};

    #[test]
    fn test_solve_all_matches_sequential() {
        let graphs = fixtures::all_parity();
        let solver = PriorityPromotionSolver::new();
        let parallel = solve_all(&solver, &graphs);
        assert_eq!(parallel.len(), graphs.len());
        for (g, result) in graphs.iter().zip(parallel) {
            assert_eq!(result.unwrap(), solver.solve(g).unwrap());
        }
    }

    #[test]
    fn test_timed_runs_succeed() {
        let graphs: Vec<_> = (2..6).map(|d| fixtures::parity_ladder(20, d)).collect();
        let runs = solve_all_timed(&ZielonkaSolver::new(), &graphs);
        assert!(runs.iter().all(TimedRun::succeeded));
    }
}
