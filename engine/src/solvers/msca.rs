//! MSCA: mean-payoff games by energy scaling.
//!
//! Player 0 is the energy keeper over the vertex weights and wins a vertex
//! iff it can keep the mean payoff non-negative. The least energy function
//! is computed with the scaling technique of Kaplan and Zwick:
//!
//! 1. With all weights non-negative, `f ≡ 0` is already the answer.
//! 2. Otherwise solve the coarser game with weights `⌈w/2⌉` first. If `f'` is
//!    its solution, `max(0, 2f' - 1)` is a lower bound of the fine solution
//!    (and ⊤ stays ⊤, since halving can only help the keeper).
//! 3. From that bound, lift in bulk: every inconsistent vertex is raised by
//!    the same `delta`, the smallest gap between a vertex's energy and what
//!    its successors demand. Keeper and opponent vertices are measured
//!    separately and the smaller of the two is applied.
//!
//! Recursion depth is the bit length of the largest negative weight.

use tracing::{debug, info, trace};

use super::energy::EnergyGame;
use super::mse::write_strategies;
use crate::error::SolveError;
use crate::graph::{MeanPayoffGraph, Owner, Player, Validate, VertexId, VertexSet};
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

#[derive(Debug, Clone, Copy, Default)]
pub struct MscaSolver;

impl MscaSolver {
    pub fn new() -> Self {
        MscaSolver
    }
}

#[derive(Debug, Default)]
struct ScaleCounters {
    scales: u64,
    deltas: u64,
    lifts: u64,
}

impl Solver<MeanPayoffGraph> for MscaSolver {
    fn name(&self) -> &'static str {
        "MSCA (Mean-payoff Solver with Constraint Analysis) Solver"
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
        let mut counters = ScaleCounters::default();
        let energy = solve_scaled(graph, &weights, &mut counters);
        let game = EnergyGame::new(graph, weights.clone(), Player::Zero);
        let top = game.top();
        debug!(top, scales = counters.scales, deltas = counters.deltas, "scaling done");

        let mut solution = Solution::with_values(n);
        for v in graph.ids() {
            let winner = if energy[v] < top {
                Player::Zero
            } else {
                Player::One
            };
            solution.set_winner(v, winner);
            solution.set_value(v, energy[v] as f64);
        }
        write_strategies(&mut solution, graph, &game.keeper_strategy(&energy));

        // Player 1 wins iff the mean is negative, i.e. iff it keeps the
        // energy of -n·w - 1 non-negative.
        let scale = i64::try_from(n).unwrap_or(i64::MAX);
        let dual_gains = weights
            .iter()
            .map(|&w| w.saturating_mul(scale).saturating_neg().saturating_sub(1))
            .collect();
        let dual = EnergyGame::new(graph, dual_gains, Player::One);
        let mut credit = vec![0i64; n];
        let dual_count = dual.lift(&mut credit);
        write_strategies(&mut solution, graph, &dual.keeper_strategy(&credit));

        let stats = solution.stats_mut();
        stats.record("scales", counters.scales);
        stats.record("deltas", counters.deltas);
        stats.record("lifts", counters.lifts + dual_count.lifts);
        solution.retain_winning_strategies(graph);
        solution.set_solved(true);
        Ok(solution)
    }
}

/// Least energy function for keeper 0 on `weights`, with ⊤ encoded as the
/// game's own `top()`.
fn solve_scaled(
    graph: &MeanPayoffGraph,
    weights: &[i64],
    counters: &mut ScaleCounters,
) -> Vec<i64> {
    let n = graph.len();
    if weights.iter().all(|&w| w >= 0) {
        return vec![0; n];
    }
    counters.scales += 1;

    let coarse_weights: Vec<i64> = weights.iter().map(|&w| ceil_half(w)).collect();
    let coarse = solve_scaled(graph, &coarse_weights, counters);
    let coarse_top = EnergyGame::new(graph, coarse_weights, Player::Zero).top();

    let game = EnergyGame::new(graph, weights.to_vec(), Player::Zero);
    let mut f: Vec<i64> = coarse
        .iter()
        .map(|&c| {
            if c >= coarse_top {
                game.top()
            } else {
                game.clamp(c.saturating_mul(2).saturating_sub(1))
            }
        })
        .collect();
    trace!(top = game.top(), "refining scale");
    delta_lift(graph, &game, &mut f, counters);
    f
}

fn ceil_half(w: i64) -> i64 {
    w.saturating_add(1).div_euclid(2)
}

/// Raise `f` to the least consistent function by bulk delta steps.
fn delta_lift(
    graph: &MeanPayoffGraph,
    game: &EnergyGame<'_, i64, ()>,
    f: &mut [i64],
    counters: &mut ScaleCounters,
) {
    let n = graph.len();
    let mut pending = VertexSet::full(n);
    loop {
        let inconsistent: Vec<VertexId> = pending
            .iter()
            .filter(|&v| !game.is_consistent(f, v))
            .collect();
        if inconsistent.is_empty() {
            return;
        }

        let mut delta_keeper = i64::MAX;
        let mut delta_opponent = i64::MAX;
        for &v in &inconsistent {
            let gap = game.demand(f, v).0 - f[v];
            if graph.owner(v) == Owner::Player(game.keeper()) {
                delta_keeper = delta_keeper.min(gap);
            } else {
                delta_opponent = delta_opponent.min(gap);
            }
        }
        let delta = delta_keeper.min(delta_opponent);
        counters.deltas += 1;

        let mut next = VertexSet::empty(n);
        for &v in &inconsistent {
            f[v] = game.clamp(f[v].saturating_add(delta));
            counters.lifts += 1;
            next.insert(v);
            for &p in graph.predecessors(v) {
                next.insert(p);
            }
        }
        pending = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::solvers::MseSolver;

    #[test]
    fn test_ceil_half() {
        assert_eq!(ceil_half(3), 2);
        assert_eq!(ceil_half(-3), -1);
        assert_eq!(ceil_half(-1), 0);
        assert_eq!(ceil_half(-2), -1);
        assert_eq!(ceil_half(0), 0);
    }

    #[test]
    fn test_zero_mean_is_won_by_player_zero() {
        let sol = MscaSolver::new().solve(&fixtures::mp_zero_cycle()).unwrap();
        assert_eq!(sol.winning_region(Player::Zero), vec![0, 1]);
        assert_eq!(sol.strategy(0), Some(1));
    }

    #[test]
    fn test_mixed_arena_values_and_moves() {
        let sol = MscaSolver::new().solve(&fixtures::mp_choice()).unwrap();
        assert!(sol.is_solved());
        assert_eq!(sol.winning_region(Player::Zero), vec![0, 1, 3]);
        assert_eq!(sol.values(), Some(&[0.0, 0.0, 2.0, 0.0][..]));
        assert_eq!(sol.strategy(0), Some(1));
        assert_eq!(sol.strategy(3), Some(3));
    }

    #[test]
    fn test_scaling_matches_plain_lifting() {
        let g = fixtures::mean_payoff_ring(40, 50);
        let mut counters = ScaleCounters::default();
        let scaled = solve_scaled(&g, &g.weights(), &mut counters);
        let game = EnergyGame::new(&g, g.weights(), Player::Zero);
        let mut plain = vec![0; g.len()];
        game.lift(&mut plain);
        assert_eq!(scaled, plain);
        assert!(counters.scales >= 1);
    }

    #[test]
    fn test_agrees_with_mse_on_shifted_weights() {
        let g = fixtures::mean_payoff_ring(25, 6);
        let n = g.len() as i64;
        let shifted = g.map_vertices(|_, &w| n * w - 1);
        let mse = MseSolver::new().solve(&g).unwrap();
        let msca = MscaSolver::new().solve(&shifted).unwrap();
        for v in g.ids() {
            assert_eq!(mse.winner(v), msca.winner(v), "vertex {v}");
        }
    }
}
