//! Energy games with vertex gains, the common core of the mean-payoff solvers.
//!
//! The *keeper* must keep a running energy level non-negative forever; the
//! other player tries to exhaust it. Entering vertex `s` adds `gain(s)`. An
//! energy function `f` gives the least initial credit the keeper needs; it is
//! consistent when
//!
//! ```text
//!   f(v) >= min_s need(s)   for keeper vertices
//!   f(v) >= max_s need(s)   for opponent vertices
//!   need(s) = max(0, f(s) - gain(s))
//! ```
//!
//! No finite credit ever exceeds `C`, the sum of all negative gains, so any
//! requirement above `C` is ⊤ (represented as `C + 1`): the keeper loses.
//! The least consistent function is reached by lifting from below.

use std::collections::VecDeque;

use crate::graph::{Graph, Owner, Player, VertexId, VertexSet};

/// Counters from one run of the lifting loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiftCount {
    /// Vertices taken from the work queue
    pub iterations: u64,
    /// Strict increases of a vertex's energy
    pub lifts: u64,
}

impl LiftCount {
    pub fn add(&mut self, other: LiftCount) {
        self.iterations += other.iterations;
        self.lifts += other.lifts;
    }
}

/// An energy game over an existing arena.
pub struct EnergyGame<'a, V, E> {
    graph: &'a Graph<V, E>,
    gains: Vec<i64>,
    keeper: Player,
    cap: i64,
}

impl<'a, V, E> EnergyGame<'a, V, E> {
    /// `gains` is indexed by vertex id.
    pub fn new(graph: &'a Graph<V, E>, gains: Vec<i64>, keeper: Player) -> Self {
        let cap = gains
            .iter()
            .filter(|&&g| g < 0)
            .fold(0i64, |acc, &g| acc.saturating_add(g.saturating_neg()));
        EnergyGame {
            graph,
            gains,
            keeper,
            cap,
        }
    }

    pub fn keeper(&self) -> Player {
        self.keeper
    }

    pub fn gains(&self) -> &[i64] {
        &self.gains
    }

    /// Largest finite energy
    pub fn cap(&self) -> i64 {
        self.cap
    }

    /// The ⊤ value
    pub fn top(&self) -> i64 {
        self.cap.saturating_add(1)
    }

    /// Clamp a raw requirement into `0..=top`.
    pub fn clamp(&self, value: i64) -> i64 {
        if value > self.cap {
            self.top()
        } else {
            value.max(0)
        }
    }

    /// Credit needed when entering `s`
    pub fn need(&self, f: &[i64], s: VertexId) -> i64 {
        if f[s] >= self.top() {
            return self.top();
        }
        self.clamp(f[s].saturating_sub(self.gains[s]))
    }

    fn is_keeper(&self, v: VertexId) -> bool {
        self.graph.owner(v) == Owner::Player(self.keeper)
    }

    /// What `v` requires under `f`, and the successor that sets it.
    pub fn demand(&self, f: &[i64], v: VertexId) -> (i64, Option<VertexId>) {
        let keeper = self.is_keeper(v);
        let mut best: Option<(i64, VertexId)> = None;
        for s in self.graph.successors(v) {
            let n = self.need(f, s);
            let better = match best {
                None => true,
                Some((b, _)) if keeper => n < b,
                Some((b, _)) => n > b,
            };
            if better {
                best = Some((n, s));
            }
        }
        match best {
            Some((n, s)) => (n, Some(s)),
            None => (0, None),
        }
    }

    pub fn is_consistent(&self, f: &[i64], v: VertexId) -> bool {
        f[v] >= self.top() || self.demand(f, v).0 <= f[v]
    }

    /// Lift `f` to the least consistent function above it. `f` must start at
    /// or below that fixpoint (all zeros always qualifies).
    ///
    /// Keeper vertices keep a count of successors that currently satisfy
    /// them, so an increase elsewhere only costs a re-scan once the count
    /// drops to zero.
    pub fn lift(&self, f: &mut [i64]) -> LiftCount {
        let n = self.graph.len();
        let top = self.top();
        let mut count = LiftCount::default();
        let mut satisfied = vec![0usize; n];
        let mut queue = VecDeque::new();
        let mut queued = VertexSet::empty(n);

        for v in 0..n {
            if f[v] >= top {
                continue;
            }
            if self.is_keeper(v) {
                satisfied[v] = self.count_satisfied(f, v);
                if satisfied[v] == 0 {
                    queued.insert(v);
                    queue.push_back(v);
                }
            } else if self.demand(f, v).0 > f[v] {
                queued.insert(v);
                queue.push_back(v);
            }
        }

        while let Some(v) = queue.pop_front() {
            queued.remove(v);
            count.iterations += 1;
            let (required, _) = self.demand(f, v);
            if required <= f[v] {
                if self.is_keeper(v) {
                    satisfied[v] = self.count_satisfied(f, v);
                }
                continue;
            }
            let before = self.need(f, v);
            f[v] = required;
            count.lifts += 1;
            if self.is_keeper(v) && required < top {
                satisfied[v] = self.count_satisfied(f, v);
            }
            let after = self.need(f, v);
            if after == before {
                continue;
            }
            for &p in self.graph.predecessors(v) {
                if queued.contains(p) || f[p] >= top {
                    continue;
                }
                // a self-loop was already recounted above
                let push = if p == v {
                    self.demand(f, v).0 > f[v]
                } else if self.is_keeper(p) {
                    if before <= f[p] && after > f[p] {
                        satisfied[p] = satisfied[p].saturating_sub(1);
                    }
                    satisfied[p] == 0
                } else {
                    after > f[p]
                };
                if push {
                    queued.insert(p);
                    queue.push_back(p);
                }
            }
        }
        count
    }

    fn count_satisfied(&self, f: &[i64], v: VertexId) -> usize {
        self.graph
            .successors(v)
            .filter(|&s| self.need(f, s) <= f[v])
            .count()
    }

    /// Keeper moves that witness a finite `f`: a successor whose need is
    /// covered. Only keeper vertices with finite energy get a move.
    pub fn keeper_strategy(&self, f: &[i64]) -> Vec<Option<VertexId>> {
        self.graph
            .ids()
            .map(|v| {
                if !self.is_keeper(v) || f[v] >= self.top() {
                    return None;
                }
                match self.demand(f, v) {
                    (required, Some(s)) if required <= f[v] => Some(s),
                    _ => None,
                }
            })
            .collect()
    }
}
