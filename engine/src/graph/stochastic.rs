//! Stochastic discounted games.
//!
//! Besides the two players, vertices may be owned by chance. A chance vertex
//! picks a successor at random according to the probabilities on its outgoing
//! edges. Edges leaving player vertices carry weight and discount, edges
//! leaving chance vertices carry a probability.

use std::collections::BTreeMap;

use super::{Graph, Owner, Validate, VertexId};
use crate::error::GraphError;

/// Tolerance when checking that a chance vertex's probabilities sum to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-8;

/// Edge payload of a stochastic discounted game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticEdge {
    pub weight: f64,
    pub discount: f64,
    /// Only meaningful on edges leaving a chance vertex
    pub probability: f64,
}

impl StochasticEdge {
    /// Edge leaving a player vertex
    pub fn decision(weight: f64, discount: f64) -> Self {
        StochasticEdge {
            weight,
            discount,
            probability: 1.0,
        }
    }

    /// Edge leaving a chance vertex
    pub fn chance(probability: f64) -> Self {
        StochasticEdge {
            weight: 0.0,
            discount: 0.0,
            probability,
        }
    }
}

/// Stochastic discounted game graph
pub type StochasticGraph = Graph<(), StochasticEdge>;

impl Validate for StochasticGraph {
    fn validate(&self) -> Result<(), GraphError> {
        self.check_structure(true)?;
        for v in self.ids() {
            if self.owner(v) == Owner::Chance {
                let mut sum = 0.0;
                for e in self.edges(v) {
                    let p = e.attr.probability;
                    if !(p > 0.0 && p <= 1.0) {
                        return Err(GraphError::InvalidProbability {
                            source_name: self.name(v).to_string(),
                            target_name: self.name(e.target).to_string(),
                            probability: p,
                        });
                    }
                    sum += p;
                }
                if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                    return Err(GraphError::ProbabilitySum {
                        name: self.name(v).to_string(),
                        sum,
                    });
                }
            } else {
                for e in self.edges(v) {
                    let d = e.attr.discount;
                    if !(d > 0.0 && d < 1.0) {
                        return Err(GraphError::InvalidDiscount {
                            source_name: self.name(v).to_string(),
                            target_name: self.name(e.target).to_string(),
                            discount: d,
                            interval: "(0, 1)",
                        });
                    }
                }
            }
        }
        self.check_chance_acyclic()
    }
}

impl StochasticGraph {
    pub fn is_chance(&self, v: VertexId) -> bool {
        self.owner(v) == Owner::Chance
    }

    /// Vertices owned by a player, in id order
    pub fn decision_vertices(&self) -> Vec<VertexId> {
        self.ids().filter(|&v| !self.is_chance(v)).collect()
    }

    /// Distribution over player vertices reached when the play enters each
    /// vertex, indexed by vertex id. A player vertex maps to itself with mass
    /// 1; a chance vertex combines the distributions of its targets weighted
    /// by the edge probabilities. Every chance vertex is expanded once,
    /// targets before sources.
    ///
    /// Requires the chance subgraph to be acyclic (checked by `validate`).
    pub fn chance_distributions(&self) -> Vec<Vec<(VertexId, f64)>> {
        let mut table: Vec<Vec<(VertexId, f64)>> = self
            .ids()
            .map(|v| if self.is_chance(v) { Vec::new() } else { vec![(v, 1.0)] })
            .collect();
        // 0 = unvisited, 1 = expanded, 2 = done
        let mut state = vec![0u8; self.len()];
        for root in self.ids() {
            if !self.is_chance(root) || state[root] != 0 {
                continue;
            }
            let mut stack = vec![(root, false)];
            while let Some((v, children_done)) = stack.pop() {
                if !children_done {
                    if state[v] != 0 {
                        continue;
                    }
                    state[v] = 1;
                    stack.push((v, true));
                    for e in self.edges(v) {
                        if self.is_chance(e.target) && state[e.target] == 0 {
                            stack.push((e.target, false));
                        }
                    }
                    continue;
                }
                let mut mass: BTreeMap<VertexId, f64> = BTreeMap::new();
                for e in self.edges(v) {
                    for &(u, q) in &table[e.target] {
                        *mass.entry(u).or_insert(0.0) += e.attr.probability * q;
                    }
                }
                table[v] = mass.into_iter().collect();
                state[v] = 2;
            }
        }
        table
    }

    /// Distribution over player vertices reached when the play enters
    /// `successor`. For many queries use [`Self::chance_distributions`].
    pub fn reachable_through_chance(&self, successor: VertexId) -> Vec<(VertexId, f64)> {
        if !self.is_chance(successor) {
            return vec![(successor, 1.0)];
        }
        self.chance_distributions().swap_remove(successor)
    }

    fn check_chance_acyclic(&self) -> Result<(), GraphError> {
        // 0 = unvisited, 1 = on the current path, 2 = done
        let mut state = vec![0u8; self.len()];
        for root in self.ids() {
            if !self.is_chance(root) || state[root] != 0 {
                continue;
            }
            let mut stack: Vec<(VertexId, usize)> = vec![(root, 0)];
            state[root] = 1;
            while let Some(top) = stack.last_mut() {
                let (v, next) = *top;
                let edges = self.edges(v);
                if next == edges.len() {
                    state[v] = 2;
                    stack.pop();
                    continue;
                }
                top.1 += 1;
                let t = edges[next].target;
                if !self.is_chance(t) {
                    continue;
                }
                match state[t] {
                    0 => {
                        state[t] = 1;
                        stack.push((t, 0));
                    }
                    1 => {
                        return Err(GraphError::ChanceCycle {
                            name: self.name(t).to_string(),
                        })
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Player;

    /// a(0) -> c1(chance) -> {b 0.5, c2 0.5}; c2(chance) -> {a 0.2, b 0.8}
    fn layered() -> StochasticGraph {
        let mut g = StochasticGraph::new();
        let a = g.add_vertex("a", Player::Zero, ()).unwrap();
        let b = g.add_vertex("b", Player::One, ()).unwrap();
        let c1 = g.add_vertex("c1", Owner::Chance, ()).unwrap();
        let c2 = g.add_vertex("c2", Owner::Chance, ()).unwrap();
        g.add_edge(a, c1, "", StochasticEdge::decision(1.0, 0.9)).unwrap();
        g.add_edge(b, a, "", StochasticEdge::decision(-1.0, 0.8)).unwrap();
        g.add_edge(c1, b, "", StochasticEdge::chance(0.5)).unwrap();
        g.add_edge(c1, c2, "", StochasticEdge::chance(0.5)).unwrap();
        g.add_edge(c2, a, "", StochasticEdge::chance(0.2)).unwrap();
        g.add_edge(c2, b, "", StochasticEdge::chance(0.8)).unwrap();
        g
    }

    #[test]
    fn test_layered_graph_is_valid() {
        assert_eq!(layered().validate(), Ok(()));
    }

    #[test]
    fn test_chance_distributions_accumulate() {
        let g = layered();
        let table = g.chance_distributions();
        let dist = &table[2];
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].0, 0);
        assert!((dist[0].1 - 0.1).abs() < 1e-12);
        assert_eq!(dist[1].0, 1);
        assert!((dist[1].1 - 0.9).abs() < 1e-12);
        assert_eq!(table[1], vec![(1, 1.0)]);
        assert_eq!(table[3], vec![(0, 0.2), (1, 0.8)]);
        assert_eq!(g.reachable_through_chance(2), table[2]);
        assert_eq!(g.reachable_through_chance(1), vec![(1, 1.0)]);
    }

    #[test]
    fn test_deep_diamond_chain_resolves_once_per_vertex() {
        // 2^60 paths from c0 to `end`
        let g = crate::fixtures::chance_diamonds(60);
        assert_eq!(g.validate(), Ok(()));
        let table = g.chance_distributions();
        let c0 = g.find("c0").unwrap();
        assert_eq!(table[c0].len(), 1);
        assert_eq!(table[c0][0].0, g.find("end").unwrap());
        assert!((table[c0][0].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_probability_sum_checked() {
        let mut g = layered();
        let c3 = g.add_vertex("c3", Owner::Chance, ()).unwrap();
        g.add_edge(c3, 0, "", StochasticEdge::chance(0.5)).unwrap();
        g.add_edge(c3, 1, "", StochasticEdge::chance(0.4)).unwrap();
        assert!(matches!(g.validate(), Err(GraphError::ProbabilitySum { .. })));
    }

    #[test]
    fn test_zero_probability_rejected() {
        let mut g = layered();
        let c3 = g.add_vertex("c3", Owner::Chance, ()).unwrap();
        g.add_edge(c3, 0, "", StochasticEdge::chance(1.0)).unwrap();
        g.add_edge(c3, 1, "", StochasticEdge::chance(0.0)).unwrap();
        assert!(matches!(
            g.validate(),
            Err(GraphError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_chance_cycle_rejected() {
        let mut h = StochasticGraph::new();
        let a = h.add_vertex("a", Player::Zero, ()).unwrap();
        let c1 = h.add_vertex("c1", Owner::Chance, ()).unwrap();
        let c2 = h.add_vertex("c2", Owner::Chance, ()).unwrap();
        h.add_edge(a, c1, "", StochasticEdge::decision(0.0, 0.5)).unwrap();
        h.add_edge(c1, c2, "", StochasticEdge::chance(0.5)).unwrap();
        h.add_edge(c1, a, "", StochasticEdge::chance(0.5)).unwrap();
        h.add_edge(c2, c1, "", StochasticEdge::chance(1.0)).unwrap();
        assert!(matches!(h.validate(), Err(GraphError::ChanceCycle { .. })));
    }

    #[test]
    fn test_player_edge_discount_must_be_positive() {
        let mut g = layered();
        let d = g.add_vertex("d", Player::One, ()).unwrap();
        g.add_edge(d, 0, "", StochasticEdge::decision(3.0, 0.0)).unwrap();
        assert!(matches!(g.validate(), Err(GraphError::InvalidDiscount { .. })));
    }
}
