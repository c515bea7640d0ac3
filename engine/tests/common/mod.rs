//! Random game generators shared by the property tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use proptest::prelude::*;

use ggg_engine::{
    DiscountedEdge, DiscountedGraph, Graph, MeanPayoffGraph, Owner, ParityGraph, Player, Priority,
    Solution, StochasticEdge, StochasticGraph,
};

/// Per vertex: owned by player 1?, attribute, successor indices (non-empty)
type VertexSpec<A> = (bool, A, Vec<usize>);

fn build<V: Clone, E>(
    spec: Vec<VertexSpec<V>>,
    mut edge: impl FnMut(usize, usize) -> E,
) -> Graph<V, E> {
    let mut g = Graph::new();
    for (i, (odd, attr, _)) in spec.iter().enumerate() {
        let owner = if *odd { Player::One } else { Player::Zero };
        g.add_vertex(format!("v{i}"), owner, attr.clone())
            .expect("fresh name");
    }
    for (i, (_, _, targets)) in spec.iter().enumerate() {
        for &t in targets {
            if !g.has_edge(i, t) {
                g.add_edge(i, t, "", edge(i, t)).expect("known endpoints");
            }
        }
    }
    g
}

fn vertices<A: std::fmt::Debug + Clone>(
    max_n: usize,
    attr: impl Strategy<Value = A> + Clone,
) -> impl Strategy<Value = Vec<VertexSpec<A>>> {
    (1..=max_n).prop_flat_map(move |n| {
        prop::collection::vec(
            (any::<bool>(), attr.clone(), prop::collection::vec(0..n, 1..=3)),
            n,
        )
    })
}

pub fn arb_parity(max_n: usize, max_priority: Priority) -> impl Strategy<Value = ParityGraph> {
    vertices(max_n, 0..=max_priority).prop_map(|spec| build(spec, |_, _| ()))
}

pub fn arb_mean_payoff(max_n: usize, max_weight: i64) -> impl Strategy<Value = MeanPayoffGraph> {
    vertices(max_n, -max_weight..=max_weight).prop_map(|spec| build(spec, |_, _| ()))
}

const DISCOUNTS: [f64; 4] = [0.3, 0.5, 0.7, 0.9];

/// Integer weights and a few fixed discounts keep the LPs well conditioned.
pub fn arb_discounted(max_n: usize) -> impl Strategy<Value = DiscountedGraph> {
    let edge = (-5i32..=5, 0..DISCOUNTS.len());
    vertices(max_n, prop::collection::vec(edge, 3)).prop_map(|spec| {
        let attrs: Vec<Vec<(i32, usize)>> = spec.iter().map(|(_, a, _)| a.clone()).collect();
        let stripped: Vec<VertexSpec<()>> =
            spec.into_iter().map(|(odd, _, ts)| (odd, (), ts)).collect();
        let mut slot = vec![0usize; attrs.len()];
        build(stripped, |i, _| {
            let (w, d) = attrs[i][slot[i] % 3];
            slot[i] += 1;
            DiscountedEdge::new(f64::from(w), DISCOUNTS[d])
        })
    })
}

/// Player vertex: owned by player 1?, moves as (target, weight, discount slot)
type DecisionSpec = (bool, Vec<(usize, i32, usize)>);

/// Up to `max_players` player vertices followed by up to `max_chance` chance
/// vertices. A chance vertex only points at player vertices and at chance
/// vertices created before it, so the chance subgraph stays acyclic; its
/// integer shares are normalised into probabilities.
pub fn arb_stochastic(
    max_players: usize,
    max_chance: usize,
) -> impl Strategy<Value = StochasticGraph> {
    (1..=max_players, 0..=max_chance).prop_flat_map(|(n, m)| {
        let total = n + m;
        let decision = (
            any::<bool>(),
            prop::collection::vec((0..total, -5i32..=5, 0..DISCOUNTS.len()), 1..=3),
        );
        let chance = prop::collection::vec((0..total, 1u32..=4), 1..=3);
        (
            prop::collection::vec(decision, n),
            prop::collection::vec(chance, m),
        )
            .prop_map(|(players, chance)| stochastic(players, chance))
    })
}

fn stochastic(players: Vec<DecisionSpec>, chance: Vec<Vec<(usize, u32)>>) -> StochasticGraph {
    let n = players.len();
    let mut g = StochasticGraph::new();
    for (i, (odd, _)) in players.iter().enumerate() {
        let owner = if *odd { Player::One } else { Player::Zero };
        g.add_vertex(format!("v{i}"), owner, ()).expect("fresh name");
    }
    for k in 0..chance.len() {
        g.add_vertex(format!("c{k}"), Owner::Chance, ())
            .expect("fresh name");
    }
    for (i, (_, moves)) in players.iter().enumerate() {
        for &(t, w, d) in moves {
            if !g.has_edge(i, t) {
                g.add_edge(i, t, "", StochasticEdge::decision(f64::from(w), DISCOUNTS[d]))
                    .expect("known endpoints");
            }
        }
    }
    for (k, outcomes) in chance.iter().enumerate() {
        let mut shares: BTreeMap<usize, u32> = BTreeMap::new();
        for &(t, share) in outcomes {
            *shares.entry(t % (n + k)).or_insert(0) += share;
        }
        let sum: u32 = shares.values().sum();
        for (t, share) in shares {
            let p = f64::from(share) / f64::from(sum);
            g.add_edge(n + k, t, "", StochasticEdge::chance(p))
                .expect("known endpoints");
        }
    }
    g
}

/// Values are a fixpoint of the one-step operator and every strategy move
/// attains the value of its vertex.
pub fn assert_discounted_fixpoint(graph: &DiscountedGraph, sol: &Solution, tolerance: f64) {
    let value = |v: usize| sol.value(v).expect("value for every vertex");
    for v in graph.ids() {
        let options = graph
            .edges(v)
            .iter()
            .map(|e| e.attr.weight + e.attr.discount * value(e.target));
        let best = match graph.owner(v).player() {
            Some(Player::Zero) => options.fold(f64::NEG_INFINITY, f64::max),
            _ => options.fold(f64::INFINITY, f64::min),
        };
        assert!((value(v) - best).abs() < tolerance, "vertex {v}: {} vs {best}", value(v));
        if let Some(s) = sol.strategy(v) {
            let e = graph.edge_between(v, s).expect("strategy follows an edge");
            let chosen = e.attr.weight + e.attr.discount * value(s);
            assert!((value(v) - chosen).abs() < tolerance, "move {v} -> {s}");
        }
    }
}

/// As [`assert_discounted_fixpoint`]; a chance vertex is worth the expected
/// value of its targets.
pub fn assert_stochastic_fixpoint(graph: &StochasticGraph, sol: &Solution, tolerance: f64) {
    let value = |v: usize| sol.value(v).expect("value for every vertex");
    for v in graph.ids() {
        let expected = match graph.owner(v) {
            Owner::Chance => graph
                .edges(v)
                .iter()
                .map(|e| e.attr.probability * value(e.target))
                .sum::<f64>(),
            Owner::Player(player) => {
                let options = graph
                    .edges(v)
                    .iter()
                    .map(|e| e.attr.weight + e.attr.discount * value(e.target));
                match player {
                    Player::Zero => options.fold(f64::NEG_INFINITY, f64::max),
                    Player::One => options.fold(f64::INFINITY, f64::min),
                }
            }
        };
        assert!(
            (value(v) - expected).abs() < tolerance,
            "vertex {v}: {} vs {expected}",
            value(v)
        );
        if let Some(s) = sol.strategy(v) {
            let e = graph.edge_between(v, s).expect("strategy follows an edge");
            let chosen = e.attr.weight + e.attr.discount * value(s);
            assert!((value(v) - chosen).abs() < tolerance, "move {v} -> {s}");
        }
    }
}

/// Every strategy entry is an edge from a vertex its owner wins, into the
/// same winning region.
pub fn assert_sound<V, E>(graph: &Graph<V, E>, sol: &Solution) {
    for v in graph.ids() {
        let Some(s) = sol.strategy(v) else { continue };
        assert!(graph.has_edge(v, s), "{v} -> {s} is not an edge");
        assert_eq!(graph.owner(v).player(), sol.winner(v), "move at {v} for the loser");
        assert_eq!(sol.winner(s), sol.winner(v), "{v} -> {s} leaves the region");
    }
}

pub fn winners<V, E>(graph: &Graph<V, E>, sol: &Solution) -> Vec<Option<Player>> {
    graph.ids().map(|v| sol.winner(v)).collect()
}
