//! Solver output: winning regions, positional strategies, optional values.
//!
//! A `Solution` is indexed by vertex id. Fields are filled by the solver that
//! produced it; quantitative solvers also fill `values`. Diagnostic counters
//! travel alongside in a per-call [`Statistics`] record.

use std::fmt;

use serde::Serialize;

use crate::graph::{Graph, Owner, Player, VertexId};

/// Named counters collected during one solve, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    counters: Vec<(&'static str, u64)>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a counter, replacing a previous value with the same name
    pub fn record(&mut self, name: &'static str, value: u64) {
        match self.counters.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.counters.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.counters
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.counters.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.counters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Result of solving one game graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    winners: Vec<Option<Player>>,
    strategy: Vec<Option<VertexId>>,
    values: Option<Vec<f64>>,
    solved: bool,
    valid: bool,
    stats: Statistics,
}

impl Solution {
    /// An unsolved, valid solution with no regions for `n` vertices
    pub fn new(n: usize) -> Self {
        Solution {
            winners: vec![None; n],
            strategy: vec![None; n],
            values: None,
            solved: false,
            valid: true,
            stats: Statistics::new(),
        }
    }

    /// Like `new`, with a value slot per vertex
    pub fn with_values(n: usize) -> Self {
        Solution {
            values: Some(vec![0.0; n]),
            ..Self::new(n)
        }
    }

    /// The result for a graph that failed validation
    pub fn invalid(n: usize) -> Self {
        Solution {
            valid: false,
            ..Self::new(n)
        }
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    pub fn winner(&self, v: VertexId) -> Option<Player> {
        self.winners.get(v).copied().flatten()
    }

    pub fn strategy(&self, v: VertexId) -> Option<VertexId> {
        self.strategy.get(v).copied().flatten()
    }

    pub fn value(&self, v: VertexId) -> Option<f64> {
        self.values.as_ref().and_then(|vals| vals.get(v).copied())
    }

    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Vertices won by `player`, ascending
    pub fn winning_region(&self, player: Player) -> Vec<VertexId> {
        self.winners
            .iter()
            .enumerate()
            .filter(|(_, w)| **w == Some(player))
            .map(|(v, _)| v)
            .collect()
    }

    pub fn set_winner(&mut self, v: VertexId, player: Player) {
        self.winners[v] = Some(player);
    }

    pub fn set_strategy(&mut self, v: VertexId, successor: VertexId) {
        self.strategy[v] = Some(successor);
    }

    pub fn clear_strategy(&mut self, v: VertexId) {
        self.strategy[v] = None;
    }

    pub fn set_value(&mut self, v: VertexId, value: f64) {
        if let Some(vals) = self.values.as_mut() {
            vals[v] = value;
        }
    }

    pub fn set_solved(&mut self, solved: bool) {
        self.solved = solved;
    }

    pub fn stats_mut(&mut self) -> &mut Statistics {
        &mut self.stats
    }

    pub fn set_stats(&mut self, stats: Statistics) {
        self.stats = stats;
    }

    /// Drop every strategy entry that is not a real edge or whose vertex is not
    /// owned by the player winning it.
    pub fn retain_winning_strategies<V, E>(&mut self, graph: &Graph<V, E>) {
        for v in 0..self.strategy.len() {
            let Some(s) = self.strategy[v] else { continue };
            let keep = match (graph.owner(v), self.winners[v]) {
                (Owner::Player(owner), Some(w)) => owner == w && graph.has_edge(v, s),
                _ => false,
            };
            if !keep {
                self.strategy[v] = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_record_and_replace() {
        let mut s = Statistics::new();
        s.record("lifts", 3);
        s.record("iterations", 1);
        s.record("lifts", 5);
        assert_eq!(s.get("lifts"), Some(5));
        assert_eq!(s.get("missing"), None);
        assert_eq!(s.to_string(), "lifts=5, iterations=1");
    }

    #[test]
    fn test_invalid_solution_flags() {
        let s = Solution::invalid(3);
        assert!(!s.is_valid());
        assert!(!s.is_solved());
        assert_eq!(s.winner(0), None);
        assert_eq!(s.value(0), None);
    }

    #[test]
    fn test_winning_region_and_values() {
        let mut s = Solution::with_values(3);
        s.set_winner(0, Player::One);
        s.set_winner(1, Player::Zero);
        s.set_winner(2, Player::One);
        s.set_value(2, -1.5);
        assert_eq!(s.winning_region(Player::One), vec![0, 2]);
        assert_eq!(s.value(2), Some(-1.5));
    }

    #[test]
    fn test_retain_winning_strategies() {
        let mut g: Graph<(), ()> = Graph::new();
        g.add_vertex("a", Player::Zero, ()).unwrap();
        g.add_vertex("b", Player::One, ()).unwrap();
        g.add_edge(0, 1, "", ()).unwrap();
        g.add_edge(1, 0, "", ()).unwrap();
        let mut s = Solution::new(2);
        s.set_winner(0, Player::Zero);
        s.set_winner(1, Player::Zero);
        s.set_strategy(0, 1);
        s.set_strategy(1, 0);
        s.retain_winning_strategies(&g);
        assert_eq!(s.strategy(0), Some(1));
        assert_eq!(s.strategy(1), None);
    }
}
