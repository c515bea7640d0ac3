//! Hard-coded arenas with known solutions, shared by tests and benches.
//!
//! Vertex notation below: `name(owner, attribute)`. All graphs are valid for
//! their kind; every vertex has at least one successor.

use crate::graph::{
    DiscountedEdge, DiscountedGraph, MeanPayoffGraph, Owner, ParityGraph, Player, Priority,
    StochasticEdge, StochasticGraph,
};

const P0: Player = Player::Zero;
const P1: Player = Player::One;

fn parity(vertices: &[(Player, Priority)], edges: &[(usize, usize)]) -> ParityGraph {
    let mut g = ParityGraph::new();
    for (i, &(owner, priority)) in vertices.iter().enumerate() {
        // ids are assigned in order, names are unique
        let _ = g.add_vertex(format!("v{i}"), owner, priority);
    }
    for &(s, t) in edges {
        let _ = g.add_edge(s, t, format!("e{s}_{t}"), ());
    }
    g
}

/// Reachability chain, all player 0:
///
/// ```text
///   v0(0,0) -> v1(0,0) -> v2(0,1) -> v2
/// ```
///
/// Every vertex is won by player 0 with strategy v0->v1->v2.
pub fn reachability_chain() -> ParityGraph {
    parity(&[(P0, 0), (P0, 0), (P0, 1)], &[(0, 1), (1, 2), (2, 2)])
}

/// Player 1 can dodge the target:
///
/// ```text
///   start(0,0) -> choice(1,0) -> target(0,1) -> target
///                            \-> trap(1,0)   -> trap
/// ```
///
/// Reachability: player 0 wins only `target`.
pub fn escape_game() -> ParityGraph {
    parity(
        &[(P0, 0), (P1, 0), (P0, 1), (P1, 0)],
        &[(0, 1), (1, 2), (1, 3), (2, 2), (3, 3)],
    )
}

/// Opponent vertex whose edges all lead into the attractor of v0:
///
/// ```text
///   v0(0,0) -> v0
///   v1(1,0) -> v0, v2
///   v2(0,0) -> v0, v1
/// ```
pub fn forced_opponent() -> ParityGraph {
    parity(
        &[(P0, 0), (P1, 0), (P0, 0)],
        &[(0, 0), (1, 0), (1, 2), (2, 0), (2, 1)],
    )
}

/// Büchi game with an escape for player 0:
///
/// ```text
///   v0(1,0) -> v1, v2
///   v1(1,1) -> v0
///   v2(0,0) -> v2, v0
///   v3(0,0) -> v2, v1
/// ```
///
/// Player 1 cycles v0 <-> v1 and sees priority 1 forever, so it wins
/// {v0, v1}. Player 0 stays on v2 and wins {v2, v3}.
pub fn buchi_escape() -> ParityGraph {
    parity(
        &[(P1, 0), (P1, 1), (P0, 0), (P0, 0)],
        &[(0, 1), (0, 2), (1, 0), (2, 2), (2, 0), (3, 2), (3, 1)],
    )
}

/// Two-vertex cycle, highest priority even:
///
/// ```text
///   v0(0,2) <-> v1(1,1)
/// ```
///
/// Player 0 wins both vertices.
pub fn even_cycle() -> ParityGraph {
    parity(&[(P0, 2), (P1, 1)], &[(0, 1), (1, 0)])
}

/// Player 0 must keep the play on its own self-loop:
///
/// ```text
///   v0(0,4) -> v1, v2
///   v1(1,3) -> v0, v3
///   v2(1,1) -> v2, v3
///   v3(0,2) -> v3, v1
/// ```
///
/// Player 0 wins {v0, v1, v3} with v0->v1 and v3->v3 (moving v3->v1 would let
/// player 1 cycle through priority 3). Player 1 wins {v2} by looping.
pub fn parity_choice() -> ParityGraph {
    parity(
        &[(P0, 4), (P1, 3), (P1, 1), (P0, 2)],
        &[(0, 1), (0, 2), (1, 0), (1, 3), (2, 2), (2, 3), (3, 3), (3, 1)],
    )
}

/// Player 1 wins everything by closing the odd cycle:
///
/// ```text
///   v0(0,3) -> v1
///   v1(1,2) -> v0, v1
/// ```
pub fn odd_wins() -> ParityGraph {
    parity(&[(P0, 3), (P1, 2)], &[(0, 1), (1, 0), (1, 1)])
}

/// The region built for priority 2 is closed but player 1 can escape from it
/// to the (open) region of priority 4, so it is promoted there:
///
/// ```text
///   v0(0,4) -> v1
///   v1(1,0) -> v0, v2
///   v2(0,2) -> v1
/// ```
///
/// Player 0 wins everything with v0->v1 and v2->v1.
pub fn promotion_chain() -> ParityGraph {
    parity(
        &[(P0, 4), (P1, 0), (P0, 2)],
        &[(0, 1), (1, 0), (1, 2), (2, 1)],
    )
}

/// All hard-coded parity fixtures
pub fn all_parity() -> Vec<ParityGraph> {
    vec![
        reachability_chain(),
        escape_game(),
        forced_opponent(),
        buchi_escape(),
        even_cycle(),
        parity_choice(),
        odd_wins(),
        promotion_chain(),
    ]
}

/// Deterministic parity family for benchmarks: `n` vertices in a ring with
/// chords, owners alternating and priorities cycling through `0..d`.
pub fn parity_ladder(n: usize, d: Priority) -> ParityGraph {
    let mut g = ParityGraph::new();
    for i in 0..n {
        let owner = if i % 2 == 0 { P0 } else { P1 };
        let _ = g.add_vertex(format!("v{i}"), owner, (i as Priority * 7 + 3) % d.max(1));
    }
    for i in 0..n {
        let _ = g.add_edge(i, (i + 1) % n, "", ());
        let chord = (i * 5 + 2) % n;
        if chord != (i + 1) % n {
            let _ = g.add_edge(i, chord, "", ());
        }
    }
    g
}

fn mean_payoff(vertices: &[(Player, i64)], edges: &[(usize, usize)]) -> MeanPayoffGraph {
    let mut g = MeanPayoffGraph::new();
    for (i, &(owner, weight)) in vertices.iter().enumerate() {
        let _ = g.add_vertex(format!("v{i}"), owner, weight);
    }
    for &(s, t) in edges {
        let _ = g.add_edge(s, t, "", ());
    }
    g
}

/// Positive cycle: v0(0,+2) <-> v1(1,-1). Mean 1/2, player 0 wins both.
pub fn mp_positive_cycle() -> MeanPayoffGraph {
    mean_payoff(&[(P0, 2), (P1, -1)], &[(0, 1), (1, 0)])
}

/// Zero-mean cycle: v0(0,+1) <-> v1(1,-1).
///
/// Mean exactly 0: lost by player 0 under the strict (MSE) objective, won
/// under the non-strict (MSCA) objective.
pub fn mp_zero_cycle() -> MeanPayoffGraph {
    mean_payoff(&[(P0, 1), (P1, -1)], &[(0, 1), (1, 0)])
}

/// Positive entry, then a draining loop: v0(0,+3) -> v1(0,-10) -> v1.
///
/// Player 1 wins both; entering v0 costs 3, v1 costs nothing.
pub fn mp_drain() -> MeanPayoffGraph {
    mean_payoff(&[(P0, 3), (P0, -10)], &[(0, 1), (1, 1)])
}

/// Mixed mean-payoff arena:
///
/// ```text
///   v0(0, 0) -> v1, v2
///   v1(1, 3) -> v0, v3
///   v2(0,-1) -> v2
///   v3(0, 1) -> v3, v2
/// ```
///
/// Player 0 wins {v0, v1, v3} (v0->v1, v3->v3); player 1 wins {v2}.
pub fn mp_choice() -> MeanPayoffGraph {
    mean_payoff(
        &[(P0, 0), (P1, 3), (P0, -1), (P0, 1)],
        &[(0, 1), (0, 2), (1, 0), (1, 3), (2, 2), (3, 3), (3, 2)],
    )
}

/// Deterministic mean-payoff family for benchmarks
pub fn mean_payoff_ring(n: usize, max_weight: i64) -> MeanPayoffGraph {
    let mut g = MeanPayoffGraph::new();
    let span = 2 * max_weight.max(1) + 1;
    for i in 0..n {
        let owner = if i % 3 == 0 { P1 } else { P0 };
        let w = (i as i64 * 37 + 11) % span - max_weight.max(1);
        let _ = g.add_vertex(format!("v{i}"), owner, w);
    }
    for i in 0..n {
        let _ = g.add_edge(i, (i + 1) % n, "", ());
        let chord = (i * 3 + 1) % n;
        if chord != (i + 1) % n {
            let _ = g.add_edge(i, chord, "", ());
        }
    }
    g
}

/// Discounted arena, all discounts 1/2:
///
/// ```text
///   v0(0) -> v0 [w=1],  v1 [w=3]
///   v1(1) -> v1 [w=-2], v0 [w=0]
/// ```
///
/// Values: v0 = 2 (loop), v1 = -4 (loop).
pub fn discounted_pair() -> DiscountedGraph {
    let mut g = DiscountedGraph::new();
    let _ = g.add_vertex("v0", P0, ());
    let _ = g.add_vertex("v1", P1, ());
    let _ = g.add_edge(0, 0, "", DiscountedEdge::new(1.0, 0.5));
    let _ = g.add_edge(0, 1, "", DiscountedEdge::new(3.0, 0.5));
    let _ = g.add_edge(1, 1, "", DiscountedEdge::new(-2.0, 0.5));
    let _ = g.add_edge(1, 0, "", DiscountedEdge::new(0.0, 0.5));
    g
}

/// Discounted arena where player 1 must pick between two moves of different
/// discount:
///
/// ```text
///   v0(0) -> v1 [w=4, d=0.9],  v2 [w=1, d=0.5]
///   v1(1) -> v0 [w=-3, d=0.9], v2 [w=-1, d=0.8]
///   v2(0) -> v2 [w=0.5, d=0.5]
/// ```
///
/// v2 = 1. v1 = min(-3 + 0.9 v0, -1 + 0.8) and v0 = max(4 + 0.9 v1, 1.5).
/// Player 1 prefers v1->v2 (-0.2), so v0 = 4 - 0.18 = 3.82.
pub fn discounted_triangle() -> DiscountedGraph {
    let mut g = DiscountedGraph::new();
    let _ = g.add_vertex("v0", P0, ());
    let _ = g.add_vertex("v1", P1, ());
    let _ = g.add_vertex("v2", P0, ());
    let _ = g.add_edge(0, 1, "", DiscountedEdge::new(4.0, 0.9));
    let _ = g.add_edge(0, 2, "", DiscountedEdge::new(1.0, 0.5));
    let _ = g.add_edge(1, 0, "", DiscountedEdge::new(-3.0, 0.9));
    let _ = g.add_edge(1, 2, "", DiscountedEdge::new(-1.0, 0.8));
    let _ = g.add_edge(2, 2, "", DiscountedEdge::new(0.5, 0.5));
    g
}

/// Discounted arena on which the objective-improvement LP runs out of
/// improving switches before reaching the value:
///
/// ```text
///   v0(0) -> v1 [w=1, d=0.5],  v2 [w=-4, d=0.9]
///   v1(0) -> v1 [w=4, d=0.3],  v2 [w=3, d=0.9]
///   v2(1) -> v1 [w=3, d=0.95]
/// ```
///
/// v1 = 3 + 0.9 (3 + 0.95 v1) = 5.7 / 0.145, v2 = 3 + 0.95 v1 and
/// v0 = -4 + 0.9 v2.
pub fn discounted_stall() -> DiscountedGraph {
    let mut g = DiscountedGraph::new();
    let _ = g.add_vertex("v0", P0, ());
    let _ = g.add_vertex("v1", P0, ());
    let _ = g.add_vertex("v2", P1, ());
    let _ = g.add_edge(0, 1, "", DiscountedEdge::new(1.0, 0.5));
    let _ = g.add_edge(0, 2, "", DiscountedEdge::new(-4.0, 0.9));
    let _ = g.add_edge(1, 1, "", DiscountedEdge::new(4.0, 0.3));
    let _ = g.add_edge(1, 2, "", DiscountedEdge::new(3.0, 0.9));
    let _ = g.add_edge(2, 1, "", DiscountedEdge::new(3.0, 0.95));
    g
}

/// Deterministic discounted family for benchmarks
pub fn discounted_ring(n: usize) -> DiscountedGraph {
    let mut g = DiscountedGraph::new();
    for i in 0..n {
        let owner = if i % 2 == 0 { P0 } else { P1 };
        let _ = g.add_vertex(format!("v{i}"), owner, ());
    }
    for i in 0..n {
        let w = ((i * 13 + 5) % 21) as f64 - 10.0;
        let _ = g.add_edge(i, (i + 1) % n, "", DiscountedEdge::new(w, 0.9));
        let chord = (i * 7 + 3) % n;
        if chord != (i + 1) % n {
            let _ = g.add_edge(i, chord, "", DiscountedEdge::new(-w / 2.0 + 1.0, 0.8));
        }
    }
    g
}

/// Stochastic arena with one chance vertex, all discounts 1/2:
///
/// ```text
///   v0(0)   -> c [w=1], v0 [w=0]
///   v1(1)   -> v1 [w=-1], v0 [w=0]
///   c(chance) -> v0 [p=0.5], v1 [p=0.5]
/// ```
///
/// Values: v0 = 2/3 (via c), v1 = -2 (loop), c = -2/3.
pub fn stochastic_coin() -> StochasticGraph {
    let mut g = StochasticGraph::new();
    let _ = g.add_vertex("v0", P0, ());
    let _ = g.add_vertex("v1", P1, ());
    let _ = g.add_vertex("c", Owner::Chance, ());
    let _ = g.add_edge(0, 2, "", StochasticEdge::decision(1.0, 0.5));
    let _ = g.add_edge(0, 0, "", StochasticEdge::decision(0.0, 0.5));
    let _ = g.add_edge(1, 1, "", StochasticEdge::decision(-1.0, 0.5));
    let _ = g.add_edge(1, 0, "", StochasticEdge::decision(0.0, 0.5));
    let _ = g.add_edge(2, 0, "", StochasticEdge::chance(0.5));
    let _ = g.add_edge(2, 1, "", StochasticEdge::chance(0.5));
    g
}

/// `depth` chance diamonds in a row between two player vertices, all
/// discounts 1/2:
///
/// ```text
///   start(0) -> c0 [w=-1]       end(1) -> start [w=1]
///   c_i -> l_i, r_i [p=0.5]     l_i, r_i -> c_{i+1} [p=1]
///   c_depth -> end [p=1]
/// ```
///
/// There are 2^depth chance paths from c0, all ending in `end`.
/// Values: start = -2/3, end and every chance vertex = 2/3.
pub fn chance_diamonds(depth: usize) -> StochasticGraph {
    let mut g = StochasticGraph::new();
    let _ = g.add_vertex("start", P0, ());
    let _ = g.add_vertex("end", P1, ());
    let _ = g.add_edge(1, 0, "", StochasticEdge::decision(1.0, 0.5));
    let mut join = g.len();
    let _ = g.add_vertex("c0", Owner::Chance, ());
    let _ = g.add_edge(0, join, "", StochasticEdge::decision(-1.0, 0.5));
    for i in 0..depth {
        let (l, r, next) = (g.len(), g.len() + 1, g.len() + 2);
        let _ = g.add_vertex(format!("l{i}"), Owner::Chance, ());
        let _ = g.add_vertex(format!("r{i}"), Owner::Chance, ());
        let _ = g.add_vertex(format!("c{}", i + 1), Owner::Chance, ());
        let _ = g.add_edge(join, l, "", StochasticEdge::chance(0.5));
        let _ = g.add_edge(join, r, "", StochasticEdge::chance(0.5));
        let _ = g.add_edge(l, next, "", StochasticEdge::chance(1.0));
        let _ = g.add_edge(r, next, "", StochasticEdge::chance(1.0));
        join = next;
    }
    let _ = g.add_edge(join, 1, "", StochasticEdge::chance(1.0));
    g
}
