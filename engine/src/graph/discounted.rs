//! Discounted games: every edge carries a weight and a discount factor.

use std::collections::BTreeMap;

use super::{Graph, Validate};
use crate::error::GraphError;

/// Edge payload of a discounted game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountedEdge {
    pub weight: f64,
    /// Multiplier applied to everything after this edge, in `[0, 1)`
    pub discount: f64,
}

impl DiscountedEdge {
    pub fn new(weight: f64, discount: f64) -> Self {
        DiscountedEdge { weight, discount }
    }
}

/// Discounted game graph: nothing on vertices, weight and discount on edges
pub type DiscountedGraph = Graph<(), DiscountedEdge>;

impl Validate for DiscountedGraph {
    fn validate(&self) -> Result<(), GraphError> {
        self.check_structure(false)?;
        for v in self.ids() {
            for e in self.edges(v) {
                let d = e.attr.discount;
                if !(0.0..1.0).contains(&d) {
                    return Err(GraphError::InvalidDiscount {
                        source_name: self.name(v).to_string(),
                        target_name: self.name(e.target).to_string(),
                        discount: d,
                        interval: "[0, 1)",
                    });
                }
            }
        }
        Ok(())
    }
}

impl DiscountedGraph {
    fn discounts(&self) -> impl Iterator<Item = f64> + '_ {
        self.ids()
            .flat_map(move |v| self.edges(v).iter().map(|e| e.attr.discount))
    }

    /// Smallest discount over all edges, 0 for a graph without edges
    pub fn min_discount(&self) -> f64 {
        self.discounts().reduce(f64::min).unwrap_or(0.0)
    }

    /// Largest discount over all edges, 0 for a graph without edges
    pub fn max_discount(&self) -> f64 {
        self.discounts().reduce(f64::max).unwrap_or(0.0)
    }

    /// Number of edges per weight. Weights are keyed by their bit pattern so the
    /// map stays totally ordered; `-0.0` and `0.0` are merged.
    pub fn weight_distribution(&self) -> Vec<(f64, usize)> {
        let mut dist: BTreeMap<OrderedWeight, usize> = BTreeMap::new();
        for v in self.ids() {
            for e in self.edges(v) {
                let w = if e.attr.weight == 0.0 { 0.0 } else { e.attr.weight };
                *dist.entry(OrderedWeight(w)).or_insert(0) += 1;
            }
        }
        dist.into_iter().map(|(k, n)| (k.0, n)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedWeight(f64);

impl Eq for OrderedWeight {}

impl PartialOrd for OrderedWeight {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedWeight {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Owner, Player};

    fn pair(discount: f64) -> DiscountedGraph {
        let mut g = DiscountedGraph::new();
        let a = g.add_vertex("a", Player::Zero, ()).unwrap();
        let b = g.add_vertex("b", Player::One, ()).unwrap();
        g.add_edge(a, b, "", DiscountedEdge::new(2.0, discount)).unwrap();
        g.add_edge(b, a, "", DiscountedEdge::new(-1.0, 0.5)).unwrap();
        g.add_edge(b, b, "", DiscountedEdge::new(2.0, 0.25)).unwrap();
        g
    }

    #[test]
    fn test_valid_discounts() {
        let g = pair(0.9);
        assert!(g.validate().is_ok());
        assert_eq!(g.min_discount(), 0.25);
        assert_eq!(g.max_discount(), 0.9);
        assert_eq!(g.weight_distribution(), vec![(-1.0, 1), (2.0, 2)]);
    }

    #[test]
    fn test_discount_of_one_is_invalid() {
        let g = pair(1.0);
        assert!(matches!(
            g.validate(),
            Err(GraphError::InvalidDiscount { discount, .. }) if discount == 1.0
        ));
    }

    #[test]
    fn test_chance_owner_is_invalid() {
        let mut g = pair(0.5);
        let c = g.add_vertex("c", Owner::Chance, ()).unwrap();
        g.add_edge(c, 0, "", DiscountedEdge::new(0.0, 0.5)).unwrap();
        assert!(matches!(g.validate(), Err(GraphError::InvalidOwner { .. })));
    }
}
