//! Value iteration with a work queue.

use std::collections::VecDeque;
use std::marker::PhantomData;

use tracing::{debug, info};

use super::{DiscountedGame, VALUE_EPSILON};
use crate::error::SolveError;
use crate::graph::VertexSet;
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

/// Iterates the one-step operator until no value moves by more than
/// [`VALUE_EPSILON`]. Only columns whose successors changed are revisited.
#[derive(Debug, Clone, Copy)]
pub struct ValueIterationSolver<G> {
    _game: PhantomData<fn(&G)>,
}

impl<G> ValueIterationSolver<G> {
    pub fn new() -> Self {
        ValueIterationSolver { _game: PhantomData }
    }
}

impl<G> Default for ValueIterationSolver<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: DiscountedGame> Solver<G> for ValueIterationSolver<G> {
    fn name(&self) -> &'static str {
        if G::STOCHASTIC {
            "Value Iteration Stochastic Discounted Game Solver"
        } else {
            "Value Iteration Discounted Game Solver"
        }
    }

    fn solve(&self, graph: &G) -> Result<Solution, SolveError> {
        if let Err(invalid) = reject_invalid(self.name(), graph.vertex_count(), graph.validate()) {
            return Ok(invalid);
        }
        let model = graph.model();
        let cols = model.columns();
        info!(
            solver = self.name(),
            vertices = model.vertex_count(),
            moves = model.move_count(),
            "solving"
        );

        let mut values = vec![0.0; cols];
        let mut chosen: Vec<Option<usize>> = vec![None; cols];
        let mut queue: VecDeque<usize> = (0..cols).collect();
        let mut queued = VertexSet::full(cols);
        let (mut iterations, mut lifts) = (0u64, 0u64);

        while let Some(col) = queue.pop_front() {
            queued.remove(col);
            iterations += 1;
            let (best, value) = model.best_move(col, &values);
            let moved = (value - values[col]).abs() > VALUE_EPSILON;
            if !moved && chosen[col].is_some() {
                continue;
            }
            values[col] = value;
            chosen[col] = Some(best);
            lifts += 1;
            for &p in model.predecessors(col) {
                if queued.insert(p) {
                    queue.push_back(p);
                }
            }
        }
        debug!(iterations, lifts, "value iteration converged");

        let mut solution = model.write_solution(&values);
        let stats = solution.stats_mut();
        stats.record("iterations", iterations);
        stats.record("lifts", lifts);
        solution.set_solved(true);
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::graph::{DiscountedEdge, DiscountedGraph, Player, StochasticGraph};

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-6)
    }

    #[test]
    fn test_discounted_pair() {
        let sol = ValueIterationSolver::<DiscountedGraph>::new()
            .solve(&fixtures::discounted_pair())
            .unwrap();
        assert!(sol.is_solved());
        assert!(close(sol.value(0), 2.0));
        assert!(close(sol.value(1), -4.0));
        assert_eq!(sol.strategy(0), Some(0));
        assert_eq!(sol.strategy(1), Some(1));
        assert!(sol.stats().get("lifts").unwrap() > 0);
    }

    #[test]
    fn test_discounted_triangle() {
        let sol = ValueIterationSolver::<DiscountedGraph>::new()
            .solve(&fixtures::discounted_triangle())
            .unwrap();
        assert!(close(sol.value(0), 3.82));
        assert!(close(sol.value(1), -0.2));
        assert!(close(sol.value(2), 1.0));
        assert_eq!(sol.winning_region(Player::One), vec![1]);
        assert_eq!(sol.strategy(0), Some(1));
        assert_eq!(sol.strategy(1), Some(2));
    }

    #[test]
    fn test_deep_chance_chain() {
        // 2^40 chance paths between start and end
        let g = fixtures::chance_diamonds(40);
        let sol = ValueIterationSolver::<StochasticGraph>::new().solve(&g).unwrap();
        assert!(sol.is_solved());
        assert!(close(sol.value(0), -2.0 / 3.0));
        assert!(close(sol.value(1), 2.0 / 3.0));
        let c0 = g.find("c0").unwrap();
        assert!(close(sol.value(c0), 2.0 / 3.0));
        assert_eq!(sol.winner(0), Some(Player::One));
    }

    #[test]
    fn test_stochastic_coin() {
        let solver: ValueIterationSolver<StochasticGraph> = ValueIterationSolver::new();
        assert_eq!(
            solver.name(),
            "Value Iteration Stochastic Discounted Game Solver"
        );
        let sol = solver.solve(&fixtures::stochastic_coin()).unwrap();
        assert!(close(sol.value(0), 2.0 / 3.0));
        assert!(close(sol.value(1), -2.0));
        assert!(close(sol.value(2), -2.0 / 3.0));
        assert_eq!(sol.strategy(0), Some(2));
        assert_eq!(sol.strategy(2), None);
    }

    #[test]
    fn test_invalid_discount_rejected() {
        let mut g = DiscountedGraph::new();
        let a = g.add_vertex("a", Player::Zero, ()).unwrap();
        g.add_edge(a, a, "", DiscountedEdge::new(1.0, 1.0)).unwrap();
        let sol = ValueIterationSolver::<DiscountedGraph>::new().solve(&g).unwrap();
        assert!(!sol.is_valid());
        assert!(!sol.is_solved());
    }
}
