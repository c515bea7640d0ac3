//! Solvers for discounted and stochastic discounted games.
//!
//! Both graph kinds are lowered to one [`DiscountedModel`]: decision
//! vertices become columns, and every move out of a decision vertex carries
//! its weight, its discount and the distribution over decision columns that
//! the play reaches next (chance vertices are resolved transitively). The
//! three solvers in this module are written once against the model.
//!
//! The value of a play is `Σ_i (Π_{j<i} λ_j)·w_i`. Player 0 maximises,
//! player 1 minimises, and player 0 wins a vertex iff its value is
//! non-negative.

mod objective;
mod strategy;
mod value;

pub use objective::ObjectiveImprovementSolver;
pub use strategy::StrategyImprovementSolver;
pub use value::ValueIterationSolver;

use crate::graph::{DiscountedGraph, Owner, Player, StochasticGraph, Validate, VertexId};
use crate::simplex::LinearProgram;
use crate::solution::Solution;

/// Margin a move must beat the current one by before strategy improvement
/// switches to it
pub const SWITCH_EPSILON: f64 = 1e-6;

/// Slack under which a constraint counts as tight; also the switch margin
/// and the convergence threshold of objective improvement
pub const STALE_EPSILON: f64 = 1e-8;

/// Value iteration stops propagating changes at or below this size
pub const VALUE_EPSILON: f64 = 1e-10;

/// Values this close below zero still count as a win for player 0
const WIN_TOLERANCE: f64 = 1e-9;

/// One move of a decision vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub successor: VertexId,
    pub weight: f64,
    pub discount: f64,
    /// Distribution over decision columns reached after this move
    pub outcomes: Vec<(usize, f64)>,
}

/// A graph kind the discounted solvers accept.
pub trait DiscountedGame: Validate {
    /// Selects the display name of the generic solvers
    const STOCHASTIC: bool;

    fn vertex_count(&self) -> usize;

    /// Lower the graph. Only called on graphs that passed `validate`.
    fn model(&self) -> DiscountedModel;
}

impl DiscountedGame for DiscountedGraph {
    const STOCHASTIC: bool = false;

    fn vertex_count(&self) -> usize {
        self.len()
    }

    fn model(&self) -> DiscountedModel {
        let owners: Vec<Owner> = self.ids().map(|v| self.owner(v)).collect();
        DiscountedModel::build(
            owners,
            |v| {
                self.edges(v)
                    .iter()
                    .map(|e| (e.target, e.attr.weight, e.attr.discount, vec![(e.target, 1.0)]))
                    .collect()
            },
            |_| Vec::new(),
        )
    }
}

impl DiscountedGame for StochasticGraph {
    const STOCHASTIC: bool = true;

    fn vertex_count(&self) -> usize {
        self.len()
    }

    fn model(&self) -> DiscountedModel {
        let owners: Vec<Owner> = self.ids().map(|v| self.owner(v)).collect();
        let reach = self.chance_distributions();
        DiscountedModel::build(
            owners,
            |v| {
                self.edges(v)
                    .iter()
                    .map(|e| (e.target, e.attr.weight, e.attr.discount, reach[e.target].clone()))
                    .collect()
            },
            |c| reach[c].clone(),
        )
    }
}

type RawMove = (VertexId, f64, f64, Vec<(VertexId, f64)>);

/// Decision columns, their moves and the chance distributions of a
/// (stochastic) discounted game.
#[derive(Debug, Clone)]
pub struct DiscountedModel {
    owners: Vec<Owner>,
    columns: Vec<VertexId>,
    moves: Vec<Vec<Move>>,
    /// Columns with a move that can land on the indexed column
    predecessors: Vec<Vec<usize>>,
    chance: Vec<(VertexId, Vec<(usize, f64)>)>,
}

impl DiscountedModel {
    fn build(
        owners: Vec<Owner>,
        moves_of: impl Fn(VertexId) -> Vec<RawMove>,
        chance_of: impl Fn(VertexId) -> Vec<(VertexId, f64)>,
    ) -> Self {
        let mut column_of = vec![usize::MAX; owners.len()];
        let mut columns = Vec::new();
        for (v, owner) in owners.iter().enumerate() {
            if owner.player().is_some() {
                column_of[v] = columns.len();
                columns.push(v);
            }
        }
        let to_columns = |dist: Vec<(VertexId, f64)>| -> Vec<(usize, f64)> {
            dist.into_iter().map(|(t, p)| (column_of[t], p)).collect()
        };

        let mut moves = Vec::with_capacity(columns.len());
        let mut predecessors = vec![Vec::new(); columns.len()];
        for (col, &v) in columns.iter().enumerate() {
            let list: Vec<Move> = moves_of(v)
                .into_iter()
                .map(|(successor, weight, discount, dist)| Move {
                    successor,
                    weight,
                    discount,
                    outcomes: to_columns(dist),
                })
                .collect();
            for m in &list {
                for &(t, _) in &m.outcomes {
                    predecessors[t].push(col);
                }
            }
            moves.push(list);
        }
        for preds in &mut predecessors {
            preds.sort_unstable();
            preds.dedup();
        }

        let chance = owners
            .iter()
            .enumerate()
            .filter(|(_, o)| **o == Owner::Chance)
            .map(|(c, _)| (c, to_columns(chance_of(c))))
            .collect();

        DiscountedModel {
            owners,
            columns,
            moves,
            predecessors,
            chance,
        }
    }

    /// Number of vertices in the underlying graph
    pub fn vertex_count(&self) -> usize {
        self.owners.len()
    }

    /// Number of decision columns
    pub fn columns(&self) -> usize {
        self.columns.len()
    }

    pub fn move_count(&self) -> usize {
        self.moves.iter().map(Vec::len).sum()
    }

    pub fn vertex(&self, col: usize) -> VertexId {
        self.columns[col]
    }

    pub fn player(&self, col: usize) -> Player {
        self.owners[self.columns[col]].player().unwrap_or(Player::Zero)
    }

    pub fn moves(&self, col: usize) -> &[Move] {
        &self.moves[col]
    }

    pub fn predecessors(&self, col: usize) -> &[usize] {
        &self.predecessors[col]
    }

    /// `w + λ·Σ p·value(t)`
    pub fn move_value(&self, m: &Move, values: &[f64]) -> f64 {
        let next: f64 = m.outcomes.iter().map(|&(t, p)| p * values[t]).sum();
        m.weight + m.discount * next
    }

    /// Index and value of the owner's best move under `values`. The first
    /// strictly better move wins ties.
    pub fn best_move(&self, col: usize, values: &[f64]) -> (usize, f64) {
        let maximise = self.player(col) == Player::Zero;
        let mut best = (0, f64::NAN);
        for (i, m) in self.moves[col].iter().enumerate() {
            let value = self.move_value(m, values);
            let better = best.1.is_nan()
                || (maximise && value > best.1)
                || (!maximise && value < best.1);
            if better {
                best = (i, value);
            }
        }
        best
    }

    /// Row coefficients of `x_col - λ·Σ p·x_t` for move `m` of `col`.
    pub(crate) fn move_row(&self, col: usize, m: &Move) -> Vec<f64> {
        let mut row = vec![0.0; self.columns()];
        row[col] += 1.0;
        for &(t, p) in &m.outcomes {
            row[t] -= m.discount * p;
        }
        row
    }

    /// A linear program over one free variable per column, without rows.
    pub(crate) fn empty_program(&self) -> LinearProgram {
        LinearProgram::new(self.columns())
    }

    /// Turn column values into a solution over the whole graph. Chance
    /// vertices take the expectation over their distribution and never get a
    /// move; decision vertices get their best move only when their owner wins.
    pub(crate) fn write_solution(&self, values: &[f64]) -> Solution {
        let mut solution = Solution::with_values(self.vertex_count());
        for col in 0..self.columns() {
            let v = self.columns[col];
            let winner = winner_of(values[col]);
            solution.set_winner(v, winner);
            solution.set_value(v, values[col]);
            if self.moves[col].is_empty() {
                continue;
            }
            let (best, _) = self.best_move(col, values);
            if self.player(col) == winner {
                solution.set_strategy(v, self.moves[col][best].successor);
            }
        }
        for (c, dist) in &self.chance {
            let value: f64 = dist.iter().map(|&(t, p)| p * values[t]).sum();
            solution.set_winner(*c, winner_of(value));
            solution.set_value(*c, value);
        }
        solution
    }
}

fn winner_of(value: f64) -> Player {
    if value >= -WIN_TOLERANCE {
        Player::Zero
    } else {
        Player::One
    }
}
