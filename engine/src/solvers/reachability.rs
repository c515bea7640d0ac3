//! Reachability games on parity arenas.
//!
//! Priority 1 marks the targets. Player 0 wins a play that visits a target at
//! least once, player 1 wins every other play. The solution is a single
//! attractor computation.

use tracing::{debug, info};

use crate::attractor::attractor;
use crate::error::SolveError;
use crate::graph::{Owner, ParityGraph, Player};
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReachabilitySolver;

impl ReachabilitySolver {
    pub fn new() -> Self {
        ReachabilitySolver
    }
}

impl Solver<ParityGraph> for ReachabilitySolver {
    fn name(&self) -> &'static str {
        "Reachability Game Solver (Attractor Algorithm)"
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
        let targets = graph.vertices_with_priority(1);
        let attr = attractor(graph, &targets, Player::Zero);
        debug!(targets = targets.len(), region = attr.len(), "player 0 attractor");

        for v in graph.ids() {
            let winner = if attr.contains(v) {
                Player::Zero
            } else {
                Player::One
            };
            solution.set_winner(v, winner);
        }
        for &(v, s) in &attr.strategy {
            solution.set_strategy(v, s);
        }
        // Once a target is reached the play is decided; any move will do.
        for &t in &targets {
            if let Some(s) = graph.successors(t).next() {
                solution.set_strategy(t, s);
            }
        }
        // Player 1 outside the attractor always has an edge that stays outside.
        for v in graph.vertices_of(Owner::Player(Player::One)) {
            if attr.contains(v) {
                continue;
            }
            if let Some(s) = graph.successors(v).find(|&s| !attr.contains(s)) {
                solution.set_strategy(v, s);
            }
        }

        solution
            .stats_mut()
            .record("attractions", u64::from(!targets.is_empty()));
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
    fn test_chain_all_won_by_player_zero() {
        let g = fixtures::reachability_chain();
        let sol = ReachabilitySolver::new().solve(&g).unwrap();
        assert!(sol.is_valid() && sol.is_solved());
        assert_eq!(sol.winning_region(Player::Zero), vec![0, 1, 2]);
        assert_eq!(sol.strategy(0), Some(1));
        assert_eq!(sol.strategy(1), Some(2));
    }

    #[test]
    fn test_escape_game() {
        let g = fixtures::escape_game();
        let sol = ReachabilitySolver::new().solve(&g).unwrap();
        assert_eq!(sol.winning_region(Player::Zero), vec![2]);
        assert_eq!(sol.winning_region(Player::One), vec![0, 1, 3]);
        // choice belongs to player 1 and must dodge the target
        assert_eq!(sol.strategy(1), Some(3));
        // start belongs to player 0, who loses it
        assert_eq!(sol.strategy(0), None);
    }

    #[test]
    fn test_no_targets_player_one_wins_everything() {
        let g = fixtures::even_cycle().map_vertices(|_, _| 0);
        let sol = ReachabilitySolver::new().solve(&g).unwrap();
        assert!(sol.is_solved());
        assert_eq!(sol.winning_region(Player::One), vec![0, 1]);
        assert_eq!(sol.stats().get("attractions"), Some(0));
    }

    #[test]
    fn test_priority_above_one_is_invalid() {
        let g = fixtures::parity_choice();
        let sol = ReachabilitySolver::new().solve(&g).unwrap();
        assert!(!sol.is_valid());
        assert!(!sol.is_solved());
        assert_eq!(sol.winner(0), None);
    }

    #[test]
    fn test_empty_graph_is_solved() {
        let sol = ReachabilitySolver::new().solve(&ParityGraph::new()).unwrap();
        assert!(sol.is_solved());
        assert!(sol.is_empty());
    }
}
