//! MSE: mean-payoff games solved through an energy game.
//!
//! Player 0 wins a vertex iff it can force a strictly positive mean payoff.
//! Equivalently, player 1 fails to keep the energy game with gains `-w`
//! bounded: its minimal credit (the *cost*) reaches `limit = 1 + Σ w⁺`.
//!
//! The reported value of `v` counts its own weight: the least fixpoint of
//! `cost(v) = max(0, w(v) + opt_s cost(s))`, capped at `limit`. That is the
//! credit needed on entering `v`, one step before the energy function.
//!
//! Player 1's moves come from that run. Player 0's moves come from a second
//! energy game with player 0 as keeper on gains `n·w - 1`, which it wins on
//! exactly the same vertices.

use tracing::{debug, info};

use super::energy::{EnergyGame, LiftCount};
use crate::error::SolveError;
use crate::graph::{MeanPayoffGraph, Owner, Player, Validate};
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

#[derive(Debug, Clone, Copy, Default)]
pub struct MseSolver;

impl MseSolver {
    pub fn new() -> Self {
        MseSolver
    }
}

impl Solver<MeanPayoffGraph> for MseSolver {
    fn name(&self) -> &'static str {
        "MSE (Mean payoff Solver using Energy games) Solver"
    }

    fn solve(&self, graph: &MeanPayoffGraph) -> Result<Solution, SolveError> {
        if let Err(invalid) = reject_invalid(self.name(), graph.len(), graph.validate()) {
            return Ok(invalid);
        }
        let n = graph.len();
        info!(
            solver = self.name(),
            vertices = n,
            edges = graph.edge_count(),
            max_weight = graph.max_abs_weight(),
            "solving"
        );

        let weights = graph.weights();
        let primary = EnergyGame::new(graph, weights.iter().map(|&w| -w).collect(), Player::One);
        let limit = primary.top();
        let mut cost = vec![0i64; n];
        let mut count = primary.lift(&mut cost);
        debug!(limit, lifts = count.lifts, "cost lifting done");

        let scale = i64::try_from(n).unwrap_or(i64::MAX);
        let dual_gains = weights
            .iter()
            .map(|&w| w.saturating_mul(scale).saturating_sub(1))
            .collect();
        let dual = EnergyGame::new(graph, dual_gains, Player::Zero);
        let mut credit = vec![0i64; n];
        count.add(dual.lift(&mut credit));

        let mut solution = Solution::with_values(n);
        for v in graph.ids() {
            let winner = if cost[v] >= limit {
                Player::Zero
            } else {
                Player::One
            };
            solution.set_winner(v, winner);
            solution.set_value(v, primary.need(&cost, v) as f64);
        }
        write_strategies(&mut solution, graph, &primary.keeper_strategy(&cost));
        write_strategies(&mut solution, graph, &dual.keeper_strategy(&credit));

        record(&mut solution, count);
        solution.retain_winning_strategies(graph);
        solution.set_solved(true);
        Ok(solution)
    }
}

/// Copy keeper moves for vertices the keeper actually wins.
pub(crate) fn write_strategies(
    solution: &mut Solution,
    graph: &MeanPayoffGraph,
    moves: &[Option<crate::graph::VertexId>],
) {
    for v in graph.ids() {
        let Some(s) = moves[v] else { continue };
        if let Owner::Player(owner) = graph.owner(v) {
            if solution.winner(v) == Some(owner) {
                solution.set_strategy(v, s);
            }
        }
    }
}

fn record(solution: &mut Solution, count: LiftCount) {
    let stats = solution.stats_mut();
    stats.record("lifts", count.lifts);
    stats.record("iterations", count.iterations);
}
