//! Büchi games on parity arenas with priorities in {0, 1}.
//!
//! Max-parity on two priorities: player 1 wins a play iff it visits a
//! priority-1 vertex infinitely often. The solver peels player-0 regions off
//! the arena until player 1 can reach its targets from everywhere that is
//! left:
//!
//! 1. `A1 = Attr_1(targets)` inside the active subgame.
//! 2. `C = active \ A1` is a trap where player 0 avoids targets forever.
//! 3. If `C` is empty, player 1 wins the whole active subgame. Otherwise
//!    player 0 wins `Attr_0(C)`, which is removed before the next round.
//!
//! Each round removes at least one vertex, so there are at most `|V|` rounds.

use tracing::{debug, info};

use crate::attractor::attractor_within;
use crate::error::SolveError;
use crate::graph::{Owner, ParityGraph, Player, VertexSet};
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuchiSolver;

impl BuchiSolver {
    pub fn new() -> Self {
        BuchiSolver
    }
}

impl Solver<ParityGraph> for BuchiSolver {
    fn name(&self) -> &'static str {
        "Büchi Game Solver (Alternating Attractors)"
    }

    fn solve(&self, graph: &ParityGraph) -> Result<Solution, SolveError> {
        if let Err(invalid) =
            reject_invalid(self.name(), graph.len(), graph.validate_priorities_at_most(1))
        {
            return Ok(invalid);
        }
        info!(
            solver = self.name(),
            vertices = graph.len(),
            edges = graph.edge_count(),
            "solving"
        );

        let mut solution = Solution::new(graph.len());
        let mut active = VertexSet::full(graph.len());
        let mut iterations = 0u64;
        let mut attractions = 0u64;

        while !active.is_empty() {
            iterations += 1;
            let targets = active.iter().filter(|&v| graph.priority(v) == 1);
            let a1 = attractor_within(graph, &active, targets, Player::One);
            attractions += 1;

            let mut trap = active.clone();
            trap.subtract(&a1.region);

            if trap.is_empty() {
                debug!(iteration = iterations, region = active.len(), "player 1 wins the rest");
                for v in active.iter() {
                    solution.set_winner(v, Player::One);
                    if graph.priority(v) == 1 && graph.owner(v) == Owner::Player(Player::One) {
                        if let Some(s) = graph.successors(v).find(|&s| active.contains(s)) {
                            solution.set_strategy(v, s);
                        }
                    }
                }
                for &(v, s) in &a1.strategy {
                    solution.set_strategy(v, s);
                }
                break;
            }

            // Player 0 stays inside the trap; it always has such an edge,
            // otherwise the vertex would have been attracted by player 1.
            for v in trap.iter() {
                if graph.owner(v) == Owner::Player(Player::Zero) {
                    if let Some(s) = graph.successors(v).find(|&s| trap.contains(s)) {
                        solution.set_strategy(v, s);
                    }
                }
            }

            let a0 = attractor_within(graph, &active, trap.iter(), Player::Zero);
            attractions += 1;
            debug!(
                iteration = iterations,
                trap = trap.len(),
                removed = a0.len(),
                "player 0 region"
            );
            for v in a0.region.iter() {
                solution.set_winner(v, Player::Zero);
            }
            for &(v, s) in &a0.strategy {
                solution.set_strategy(v, s);
            }
            active.subtract(&a0.region);
        }

        let stats = solution.stats_mut();
        stats.record("iterations", iterations);
        stats.record("attractions", attractions);
        solution.retain_winning_strategies(graph);
        solution.set_solved(true);
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_player_one_cycle_through_target() {
        // v0(1,0) <-> v1(1,1): player 1 cannot avoid v1, and does not want to
        let mut g = ParityGraph::new();
        g.add_vertex("v0", Player::One, 0).unwrap();
        g.add_vertex("v1", Player::One, 1).unwrap();
        g.add_edge(0, 1, "", ()).unwrap();
        g.add_edge(1, 0, "", ()).unwrap();
        let sol = BuchiSolver::new().solve(&g).unwrap();
        assert!(sol.is_solved());
        assert_eq!(sol.winning_region(Player::One), vec![0, 1]);
        assert_eq!(sol.strategy(0), Some(1));
        assert_eq!(sol.strategy(1), Some(0));
    }

    #[test]
    fn test_escape_vertex_splits_the_arena() {
        let g = fixtures::buchi_escape();
        let sol = BuchiSolver::new().solve(&g).unwrap();
        assert_eq!(sol.winning_region(Player::Zero), vec![2, 3]);
        assert_eq!(sol.winning_region(Player::One), vec![0, 1]);
        assert_eq!(sol.strategy(0), Some(1));
        assert_eq!(sol.strategy(1), Some(0));
        assert_eq!(sol.strategy(2), Some(2));
        assert_eq!(sol.strategy(3), Some(2));
        assert_eq!(sol.stats().get("iterations"), Some(2));
        assert_eq!(sol.stats().get("attractions"), Some(3));
    }

    #[test]
    fn test_no_targets_player_zero_wins() {
        let g = fixtures::forced_opponent();
        let sol = BuchiSolver::new().solve(&g).unwrap();
        assert_eq!(sol.winning_region(Player::Zero), vec![0, 1, 2]);
        for v in g.vertices_of(Owner::Player(Player::Zero)) {
            assert!(sol.strategy(v).is_some());
        }
    }

    #[test]
    fn test_rejects_high_priorities() {
        let sol = BuchiSolver::new().solve(&fixtures::parity_choice()).unwrap();
        assert!(!sol.is_valid());
    }
}
