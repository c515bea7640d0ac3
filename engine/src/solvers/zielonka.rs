//! Recursive (Zielonka) parity game solver.
//!
//! Works on an active-vertex mask rather than copying subgames. Useful mostly
//! as an independent reference for the other parity engines.

use tracing::{debug, info};

use crate::attractor::attractor_within;
use crate::error::SolveError;
use crate::graph::{Owner, ParityGraph, Player, Validate, VertexId, VertexSet};
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

#[derive(Debug, Clone, Copy, Default)]
pub struct ZielonkaSolver;

impl ZielonkaSolver {
    pub fn new() -> Self {
        ZielonkaSolver
    }
}

impl Solver<ParityGraph> for ZielonkaSolver {
    fn name(&self) -> &'static str {
        "Recursive (Zielonka) Parity Game Solver"
    }

    fn solve(&self, graph: &ParityGraph) -> Result<Solution, SolveError> {
        if let Err(invalid) = reject_invalid(self.name(), graph.len(), graph.validate()) {
            return Ok(invalid);
        }
        info!(
            solver = self.name(),
            vertices = graph.len(),
            edges = graph.edge_count(),
            "solving"
        );

        let mut rec = Recursion {
            graph,
            winners: vec![None; graph.len()],
            strategy: vec![None; graph.len()],
            subgames: 0,
            max_depth: 0,
        };
        rec.solve_subgame(&VertexSet::full(graph.len()), 0);
        debug!(subgames = rec.subgames, max_depth = rec.max_depth, "recursion done");

        let mut solution = Solution::new(graph.len());
        for v in graph.ids() {
            if let Some(w) = rec.winners[v] {
                solution.set_winner(v, w);
            }
            if let Some(s) = rec.strategy[v] {
                solution.set_strategy(v, s);
            }
        }
        let stats = solution.stats_mut();
        stats.record("subgames", rec.subgames);
        stats.record("max_depth", rec.max_depth);
        solution.retain_winning_strategies(graph);
        solution.set_solved(true);
        Ok(solution)
    }
}

struct Recursion<'a> {
    graph: &'a ParityGraph,
    winners: Vec<Option<Player>>,
    strategy: Vec<Option<VertexId>>,
    subgames: u64,
    max_depth: u64,
}

impl Recursion<'_> {
    /// Solve the subgame induced by `active`, returning `[W0, W1]`. Winners
    /// and strategies of the subgame are written as a side effect; callers
    /// overwrite whatever a later level decides differently.
    fn solve_subgame(&mut self, active: &VertexSet, depth: u64) -> [VertexSet; 2] {
        let graph = self.graph;
        let n = graph.len();
        self.subgames += 1;
        self.max_depth = self.max_depth.max(depth);
        if active.is_empty() {
            return [VertexSet::empty(n), VertexSet::empty(n)];
        }

        let d = active.iter().map(|v| graph.priority(v)).max().unwrap_or(0);
        let alpha = Player::from_parity(d);
        let beta = alpha.opponent();
        let heads: Vec<VertexId> = active.iter().filter(|&v| graph.priority(v) == d).collect();

        let attr_a = attractor_within(graph, active, heads.iter().copied(), alpha);
        let mut rest = active.clone();
        rest.subtract(&attr_a.region);
        let sub = self.solve_subgame(&rest, depth + 1);

        if sub[beta.index()].is_empty() {
            for &(v, s) in &attr_a.strategy {
                self.strategy[v] = Some(s);
            }
            for &h in &heads {
                if graph.owner(h) == Owner::Player(alpha) {
                    self.strategy[h] = graph.successors(h).find(|&s| active.contains(s));
                }
            }
            for v in active.iter() {
                self.winners[v] = Some(alpha);
            }
            let mut result = [VertexSet::empty(n), VertexSet::empty(n)];
            result[alpha.index()] = active.clone();
            return result;
        }

        let attr_b = attractor_within(graph, active, sub[beta.index()].iter(), beta);
        for &(v, s) in &attr_b.strategy {
            self.strategy[v] = Some(s);
        }
        let mut rest = active.clone();
        rest.subtract(&attr_b.region);
        let mut result = self.solve_subgame(&rest, depth + 1);
        for v in attr_b.region.iter() {
            self.winners[v] = Some(beta);
            result[beta.index()].insert(v);
        }
        result
    }
}
