//! Objective improvement: both players improve against one shared LP.
//!
//! Every move becomes a constraint, `x_v >= w + λ·Σ p·x_t` when player 0
//! owns `v` and `x_v <= w + λ·Σ p·x_t` when player 1 does. The game values
//! satisfy all of them. For the current pair of strategies the objective
//!
//! ```text
//!   Φ(x) = Σ_v ± (x_v - w_σ(v) - λ_σ(v)·Σ p·x_t)
//! ```
//!
//! adds up the slack of each chosen move (signed so every term is
//! non-negative). Φ is minimised over the constraint polytope; it reaches 0
//! exactly when `x` is the game value. Between LP solves, both players switch
//! to moves whose slack is smaller under the current `x`.
//!
//! When no switch is available while Φ is still positive the iteration is
//! stale. The moves that are tight under `x` are then collected and tried one
//! at a time. This is a heuristic with no termination proof. When the
//! alternatives run out the iteration has stalled: player 0's current moves
//! are handed to strategy improvement, which finishes the solve, and the
//! `stalled` statistic is set to 1.

use std::collections::VecDeque;
use std::marker::PhantomData;

use tracing::{debug, info, trace, warn};

use super::strategy::improve;
use super::{DiscountedGame, DiscountedModel, STALE_EPSILON};
use crate::error::SolveError;
use crate::graph::Player;
use crate::simplex::Simplex;
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

#[derive(Debug, Clone, Copy)]
pub struct ObjectiveImprovementSolver<G> {
    /// Give up after this many stale iterations; `None` tries every tight
    /// alternative
    pub max_stale_attempts: Option<usize>,
    _game: PhantomData<fn(&G)>,
}

impl<G> ObjectiveImprovementSolver<G> {
    pub fn new() -> Self {
        ObjectiveImprovementSolver {
            max_stale_attempts: None,
            _game: PhantomData,
        }
    }

    pub fn with_max_stale_attempts(attempts: usize) -> Self {
        ObjectiveImprovementSolver {
            max_stale_attempts: Some(attempts),
            _game: PhantomData,
        }
    }
}

impl<G> Default for ObjectiveImprovementSolver<G> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct Counters {
    iterations: u64,
    switches: u64,
    stales: u64,
}

impl<G: DiscountedGame> Solver<G> for ObjectiveImprovementSolver<G> {
    fn name(&self) -> &'static str {
        if G::STOCHASTIC {
            "Objective Improvement Stochastic Discounted Game Solver"
        } else {
            "Objective Improvement Discounted Game Solver"
        }
    }

    fn solve(&self, graph: &G) -> Result<Solution, SolveError> {
        if let Err(invalid) = reject_invalid(self.name(), graph.vertex_count(), graph.validate()) {
            return Ok(invalid);
        }
        let model = graph.model();
        info!(
            solver = self.name(),
            vertices = model.vertex_count(),
            moves = model.move_count(),
            "solving"
        );

        let mut lp = model.empty_program();
        for col in 0..model.columns() {
            for m in model.moves(col) {
                let row = model.move_row(col, m);
                match model.player(col) {
                    Player::Zero => lp.add_row(row, m.weight, f64::INFINITY),
                    Player::One => lp.add_row(row, f64::NEG_INFINITY, m.weight),
                }
            }
        }
        let mut simplex = Simplex::new(lp)?;
        simplex.remove_artificial_variables()?;
        simplex.purge_artificial_columns()?;

        let mut strategy = vec![0usize; model.columns()];
        let mut counters = Counters::default();
        let mut pending: VecDeque<(usize, usize)> = VecDeque::new();
        let mut improving = true;

        let mut phi = minimise(&model, &strategy, &mut simplex)?;
        let mut values = simplex.solution().0;
        let converged = loop {
            if phi <= STALE_EPSILON {
                break true;
            }
            let switched = switch_strategies(&model, &mut strategy, &values);
            if switched > 0 {
                counters.iterations += 1;
                counters.switches += switched;
                improving = true;
                pending.clear();
            } else {
                counters.stales += 1;
                if self
                    .max_stale_attempts
                    .is_some_and(|limit| counters.stales > limit as u64)
                {
                    break false;
                }
                if pending.is_empty() {
                    if !improving {
                        break false;
                    }
                    improving = false;
                    pending = tight_alternatives(&model, &strategy, &values);
                }
                let Some((col, alternative)) = pending.pop_front() else {
                    break false;
                };
                trace!(vertex = model.vertex(col), to = alternative, "stale switch");
                strategy[col] = alternative;
            }
            phi = minimise(&model, &strategy, &mut simplex)?;
            values = simplex.solution().0;
            debug!(iteration = counters.iterations, phi, "objective minimised");
        };

        let mut fallback = None;
        if !converged {
            warn!(
                solver = self.name(),
                phi,
                stales = counters.stales,
                "no improving or untried tight switch left; finishing with strategy improvement"
            );
            let (optimal, count) = improve(&model, &mut strategy)?;
            values = optimal;
            fallback = Some(count);
        }
        let mut solution = model.write_solution(&values);
        let stats = solution.stats_mut();
        stats.record("iterations", counters.iterations);
        stats.record("switches", counters.switches);
        stats.record("pivots", simplex.pivots() as u64);
        stats.record("stales", counters.stales);
        stats.record("stalled", u64::from(!converged));
        if let Some(count) = fallback {
            stats.record("fallback_iterations", count.iterations);
            stats.record("fallback_switches", count.switches);
            stats.record("fallback_pivots", count.pivots);
        }
        solution.set_solved(true);
        Ok(solution)
    }
}

/// Re-optimise Φ for `strategy` from the current basis and return its
/// minimum.
fn minimise(
    model: &DiscountedModel,
    strategy: &[usize],
    simplex: &mut Simplex,
) -> Result<f64, SolveError> {
    let mut coeffs = vec![0.0; model.columns()];
    let mut constant = 0.0;
    for col in 0..model.columns() {
        let m = &model.moves(col)[strategy[col]];
        let sign = match model.player(col) {
            Player::Zero => 1.0,
            Player::One => -1.0,
        };
        for (c, a) in coeffs.iter_mut().zip(model.move_row(col, m)) {
            *c += sign * a;
        }
        constant -= sign * m.weight;
    }
    let negated: Vec<f64> = coeffs.iter().map(|c| -c).collect();
    simplex.set_objective(&negated)?;
    simplex.optimize()?;
    let (_, value) = simplex.solution();
    Ok(constant - value)
}

/// Move every vertex to the move with the least slack, if it beats the
/// current one. Returns the number of switches.
fn switch_strategies(model: &DiscountedModel, strategy: &mut [usize], values: &[f64]) -> u64 {
    let mut switched = 0;
    for col in 0..model.columns() {
        let current = model.move_value(&model.moves(col)[strategy[col]], values);
        let (best, value) = model.best_move(col, values);
        let better = match model.player(col) {
            Player::Zero => value > current + STALE_EPSILON,
            Player::One => value < current - STALE_EPSILON,
        };
        if better {
            strategy[col] = best;
            switched += 1;
        }
    }
    switched
}

/// Moves other than the chosen one whose constraint is tight under `values`.
fn tight_alternatives(
    model: &DiscountedModel,
    strategy: &[usize],
    values: &[f64],
) -> VecDeque<(usize, usize)> {
    let mut tight = VecDeque::new();
    for col in 0..model.columns() {
        for (i, m) in model.moves(col).iter().enumerate() {
            if i != strategy[col] && (values[col] - model.move_value(m, values)).abs() < STALE_EPSILON
            {
                tight.push_back((col, i));
            }
        }
    }
    tight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::graph::{DiscountedGraph, StochasticGraph};

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-6)
    }

    #[test]
    fn test_discounted_pair_converges_immediately() {
        let sol = ObjectiveImprovementSolver::<DiscountedGraph>::new()
            .solve(&fixtures::discounted_pair())
            .unwrap();
        assert!(sol.is_solved());
        assert!(close(sol.value(0), 2.0));
        assert!(close(sol.value(1), -4.0));
        assert_eq!(sol.stats().get("iterations"), Some(0));
        assert_eq!(sol.stats().get("stales"), Some(0));
    }

    #[test]
    fn test_discounted_triangle_switches_player_one() {
        let sol = ObjectiveImprovementSolver::<DiscountedGraph>::new()
            .solve(&fixtures::discounted_triangle())
            .unwrap();
        assert!(sol.is_solved());
        assert!(close(sol.value(0), 3.82));
        assert!(close(sol.value(1), -0.2));
        assert!(close(sol.value(2), 1.0));
        assert_eq!(sol.strategy(1), Some(2));
        assert!(sol.stats().get("switches").unwrap() >= 1);
    }

    #[test]
    fn test_stochastic_coin() {
        let sol = ObjectiveImprovementSolver::<StochasticGraph>::new()
            .solve(&fixtures::stochastic_coin())
            .unwrap();
        assert!(sol.is_solved());
        assert!(close(sol.value(0), 2.0 / 3.0));
        assert!(close(sol.value(1), -2.0));
        assert!(close(sol.value(2), -2.0 / 3.0));
    }

    #[test]
    fn test_stall_is_finished_by_strategy_improvement() {
        let sol = ObjectiveImprovementSolver::<DiscountedGraph>::new()
            .solve(&fixtures::discounted_stall())
            .unwrap();
        assert!(sol.is_solved());
        assert_eq!(sol.stats().get("stalled"), Some(1));
        assert!(sol.stats().get("fallback_iterations").unwrap() >= 1);
        let v1 = 5.7 / 0.145;
        let v2 = 3.0 + 0.95 * v1;
        assert!(close(sol.value(0), -4.0 + 0.9 * v2));
        assert!(close(sol.value(1), v1));
        assert!(close(sol.value(2), v2));
        assert_eq!(sol.winning_region(Player::Zero), vec![0, 1, 2]);
        assert_eq!(sol.strategy(0), Some(2));
        assert_eq!(sol.strategy(1), Some(2));
    }

    #[test]
    fn test_exhausted_stale_budget_still_solves() {
        let g = fixtures::discounted_triangle();
        let sol = ObjectiveImprovementSolver::<DiscountedGraph>::with_max_stale_attempts(0)
            .solve(&g)
            .unwrap();
        assert!(sol.is_solved());
        assert!(close(sol.value(0), 3.82));
        assert!(close(sol.value(1), -0.2));
        assert!(close(sol.value(2), 1.0));
    }

    #[test]
    fn test_converged_run_is_not_stalled() {
        let sol = ObjectiveImprovementSolver::<DiscountedGraph>::new()
            .solve(&fixtures::discounted_pair())
            .unwrap();
        assert_eq!(sol.stats().get("stalled"), Some(0));
        assert_eq!(sol.stats().get("fallback_iterations"), None);
    }

    #[test]
    fn test_phi_is_zero_at_the_value() {
        let model = fixtures::discounted_pair().model();
        let mut lp = model.empty_program();
        for col in 0..model.columns() {
            for m in model.moves(col) {
                let row = model.move_row(col, m);
                match model.player(col) {
                    Player::Zero => lp.add_row(row, m.weight, f64::INFINITY),
                    Player::One => lp.add_row(row, f64::NEG_INFINITY, m.weight),
                }
            }
        }
        let mut simplex = Simplex::new(lp).unwrap();
        // v0 -> v1 leaves slack 1 at the value (2 >= 3 - 2)
        let phi = minimise(&model, &[1, 0], &mut simplex).unwrap();
        assert!(phi > 0.5);
        let phi = minimise(&model, &[0, 0], &mut simplex).unwrap();
        assert!(phi.abs() < 1e-8);
    }
}
