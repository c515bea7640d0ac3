//! Strategy improvement for player 0.
//!
//! For a fixed player-0 strategy the values solve
//!
//! ```text
//!   maximise Σ x
//!   x_v  = w + λ·Σ p·x_t   for the chosen move of each player-0 vertex
//!   x_v <= w + λ·Σ p·x_t   for every move of each player-1 vertex
//! ```
//!
//! whose optimum is player 1's best response. Player 0 then switches every
//! vertex with a clearly better move and the LP is solved again. Values
//! improve monotonically, so the loop ends after finitely many strategies.

use std::marker::PhantomData;

use tracing::{debug, info, trace};

use super::{DiscountedGame, DiscountedModel, SWITCH_EPSILON};
use crate::error::SolveError;
use crate::graph::Player;
use crate::simplex::Simplex;
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

#[derive(Debug, Clone, Copy)]
pub struct StrategyImprovementSolver<G> {
    _game: PhantomData<fn(&G)>,
}

impl<G> StrategyImprovementSolver<G> {
    pub fn new() -> Self {
        StrategyImprovementSolver { _game: PhantomData }
    }
}

impl<G> Default for StrategyImprovementSolver<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: DiscountedGame> Solver<G> for StrategyImprovementSolver<G> {
    fn name(&self) -> &'static str {
        if G::STOCHASTIC {
            "Strategy Improvement Stochastic Discounted Game Solver"
        } else {
            "Strategy Improvement Discounted Game Solver"
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

        // first move everywhere
        let mut strategy = vec![0usize; model.columns()];
        let (values, count) = improve(&model, &mut strategy)?;

        let mut solution = model.write_solution(&values);
        let stats = solution.stats_mut();
        stats.record("iterations", count.iterations);
        stats.record("switches", count.switches);
        stats.record("pivots", count.pivots);
        solution.set_solved(true);
        Ok(solution)
    }
}

/// Counters of one improvement run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct ImprovementCount {
    pub iterations: u64,
    pub switches: u64,
    pub pivots: u64,
}

/// Improve player 0's `strategy` in place until no move beats the chosen one
/// by more than [`SWITCH_EPSILON`], and return the values it ends with.
/// Entries of player-1 columns are ignored.
pub(super) fn improve(
    model: &DiscountedModel,
    strategy: &mut [usize],
) -> Result<(Vec<f64>, ImprovementCount), SolveError> {
    let mut count = ImprovementCount::default();
    loop {
        count.iterations += 1;
        let (values, lp_pivots) = evaluate(model, strategy)?;
        count.pivots += lp_pivots as u64;

        let mut switched = 0u64;
        for col in 0..model.columns() {
            if model.player(col) != Player::Zero {
                continue;
            }
            let current = model.move_value(&model.moves(col)[strategy[col]], &values);
            let (best, value) = model.best_move(col, &values);
            if value > current + SWITCH_EPSILON {
                trace!(vertex = model.vertex(col), from = strategy[col], to = best, "switch");
                strategy[col] = best;
                switched += 1;
            }
        }
        debug!(iteration = count.iterations, switched, "strategy evaluated");
        if switched == 0 {
            return Ok((values, count));
        }
        count.switches += switched;
    }
}

/// Values of the game once player 0 is fixed to `strategy`, and the pivots
/// the LP took.
fn evaluate(model: &DiscountedModel, strategy: &[usize]) -> Result<(Vec<f64>, usize), SolveError> {
    let mut lp = model.empty_program();
    lp.objective = vec![1.0; model.columns()];
    for col in 0..model.columns() {
        match model.player(col) {
            Player::Zero => {
                let m = &model.moves(col)[strategy[col]];
                lp.add_row(model.move_row(col, m), m.weight, m.weight);
            }
            Player::One => {
                for m in model.moves(col) {
                    lp.add_row(model.move_row(col, m), f64::NEG_INFINITY, m.weight);
                }
            }
        }
    }
    let mut simplex = Simplex::new(lp)?;
    simplex.remove_artificial_variables()?;
    simplex.purge_artificial_columns()?;
    simplex.optimize()?;
    let (values, _) = simplex.solution();
    Ok((values, simplex.pivots()))
}
