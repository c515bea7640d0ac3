//! Progressive Small Progress Measures parity solver
//!
//! Both players' progress measures are lifted side by side. For player `pl`
//! the measure of a vertex is a vector indexed by the priorities of parity
//! `pl`; entry `i` is bounded by the number of vertices with priority `i`,
//! and overflowing past every bound yields ⊤, meaning `pl` wins from there.
//!
//! The owner of a vertex lifts its own measure to the maximum over its
//! successors and the opponent's measure to the minimum. Lifting runs to the
//! least fixpoint on a work queue; at that point exactly one of the two
//! measures of each vertex is ⊤.
//!
//! Every so often an `update` pass finds, for each player, the vertices whose
//! measure can never change again and hands them to the other player at once.
//!
//! Priorities are compressed first, which keeps the vectors short and leaves
//! winners unchanged.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::error::SolveError;
use crate::graph::parity::compression_map;
use crate::graph::{Owner, ParityGraph, Player, Validate, VertexId, VertexSet};
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

/// Marker in slot `pl` of a vector: player `pl`'s measure is ⊤
const TOP: i32 = -1;

/// Small Progress Measures solver with global updates.
#[derive(Debug, Clone, Copy)]
pub struct SpmSolver {
    /// Run the global update after this many lifts per vertex
    pub update_interval_factor: usize,
}

impl SpmSolver {
    pub fn new() -> Self {
        SpmSolver {
            update_interval_factor: 10,
        }
    }
}

impl Default for SpmSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver<ParityGraph> for SpmSolver {
    fn name(&self) -> &'static str {
        "Progressive Small Progress Measures (PSPM) Parity Game Solver"
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
        let mut state = MeasureState::new(graph);
        state.run(self.update_interval_factor.max(1) * graph.len().max(1));
        Ok(state.finish())
    }
}

/// Is player `pl`'s measure `a` smaller than `b`, looking only at indices
/// `>= d` of parity `pl`?
fn pm_less(a: &[i32], b: &[i32], d: usize, pl: usize) -> bool {
    if a[pl] == TOP {
        return false;
    }
    if b[pl] == TOP {
        return true;
    }
    let k = a.len();
    let mut i = if (k - 1) % 2 == pl { k - 1 } else { k - 2 };
    loop {
        if i < d {
            return false;
        }
        if a[i] != b[i] {
            return a[i] < b[i];
        }
        if i < 2 {
            return false;
        }
        i -= 2;
    }
}

/// Write into `dst` the least measure of player `pl` that is `>= src` on
/// indices `>= d`, strictly greater when `d` has parity `pl`.
fn prog(dst: &mut [i32], src: &[i32], d: usize, pl: usize, counts: &[i32]) {
    let k = src.len();
    if src[pl] == TOP {
        dst[pl] = TOP;
        return;
    }
    let mut i = pl;
    while i < k {
        dst[i] = if i >= d { src[i] } else { 0 };
        i += 2;
    }
    if d % 2 != pl {
        return;
    }
    let mut i = d;
    while i < k {
        dst[i] += 1;
        if dst[i] <= counts[i] {
            return;
        }
        dst[i] = 0;
        i += 2;
    }
    dst[pl] = TOP;
}

struct MeasureState<'a> {
    graph: &'a ParityGraph,
    /// Compressed priority of each vertex
    prio: Vec<usize>,
    k: usize,
    counts: Vec<i32>,
    /// `k` entries per vertex; even slots belong to player 0, odd to player 1
    pms: Vec<i32>,
    /// Current minimising successor for the opponent's measure
    strategy: Vec<Option<VertexId>>,
    queue: VecDeque<VertexId>,
    queued: VertexSet,
    tmp: Vec<i32>,
    best: Vec<i32>,
    lifts: u64,
    lift_attempts: u64,
    updates: u64,
}

impl<'a> MeasureState<'a> {
    fn new(graph: &'a ParityGraph) -> Self {
        let mapping = compression_map(&graph.unique_priorities());
        let prio: Vec<usize> = graph
            .ids()
            .map(|v| mapping.get(&graph.priority(v)).copied().unwrap_or(0) as usize)
            .collect();
        let max = prio.iter().copied().max().unwrap_or(0);
        let k = (max + 1).max(2);
        let mut counts = vec![0i32; k];
        for &p in &prio {
            counts[p] += 1;
        }
        MeasureState {
            graph,
            prio,
            k,
            counts,
            pms: vec![0; k * graph.len()],
            strategy: vec![None; graph.len()],
            queue: VecDeque::new(),
            queued: VertexSet::empty(graph.len()),
            tmp: vec![0; k],
            best: vec![0; k],
            lifts: 0,
            lift_attempts: 0,
            updates: 0,
        }
    }

    fn measure(&self, v: VertexId) -> &[i32] {
        &self.pms[v * self.k..(v + 1) * self.k]
    }

    fn is_top(&self, v: VertexId, pl: usize) -> bool {
        self.pms[v * self.k + pl] == TOP
    }

    fn owner_index(&self, v: VertexId) -> usize {
        match self.graph.owner(v) {
            Owner::Player(p) => p.index(),
            Owner::Chance => 0,
        }
    }

    /// `best` := extreme of `prog` over successors of `v` for player `pl`
    /// (maximum if `maximise`), returning the successor that attains it.
    fn best_successor(&mut self, v: VertexId, pl: usize, maximise: bool) -> Option<VertexId> {
        let graph = self.graph;
        let d = self.prio[v];
        let mut tmp = std::mem::take(&mut self.tmp);
        let mut best = std::mem::take(&mut self.best);
        let mut arg = None;
        for s in graph.successors(v) {
            prog(&mut tmp, self.measure(s), d, pl, &self.counts);
            let better = match arg {
                None => true,
                Some(_) if maximise => pm_less(&best, &tmp, d, pl),
                Some(_) => pm_less(&tmp, &best, d, pl),
            };
            if better {
                best.copy_from_slice(&tmp);
                arg = Some(s);
            }
        }
        self.tmp = tmp;
        self.best = best;
        arg
    }

    fn store_best(&mut self, v: VertexId, pl: usize) -> bool {
        let d = self.prio[v];
        if !pm_less(self.measure(v), &self.best, d, pl) {
            return false;
        }
        let k = self.k;
        let best = std::mem::take(&mut self.best);
        let slot = &mut self.pms[v * k..(v + 1) * k];
        if best[pl] == TOP {
            slot[pl] = TOP;
        } else {
            let mut i = pl;
            while i < k {
                slot[i] = best[i];
                i += 2;
            }
        }
        self.best = best;
        true
    }

    /// Lift both measures of `v`. With `target`, only the effect of that
    /// successor is considered where possible.
    fn lift(&mut self, v: VertexId, target: Option<VertexId>) -> bool {
        self.lift_attempts += 1;
        let owner = self.owner_index(v);
        let d = self.prio[v];
        let mut changed = false;
        for pl in 0..2 {
            if self.is_top(v, pl) {
                continue;
            }
            if pl == owner {
                match target {
                    Some(t) => {
                        let mut best = std::mem::take(&mut self.best);
                        prog(&mut best, self.measure(t), d, pl, &self.counts);
                        self.best = best;
                    }
                    None => {
                        self.best_successor(v, pl, true);
                    }
                }
            } else {
                if let (Some(t), Some(current)) = (target, self.strategy[v]) {
                    if t != current {
                        continue;
                    }
                }
                self.strategy[v] = self.best_successor(v, pl, false);
            }
            changed |= self.store_best(v, pl);
        }
        if changed {
            self.lifts += 1;
        }
        changed
    }

    fn push(&mut self, v: VertexId) {
        if self.queued.insert(v) {
            self.queue.push_back(v);
        }
    }

    fn lift_predecessors(&mut self, v: VertexId) -> usize {
        let graph = self.graph;
        let mut lifted = 0;
        for &u in graph.predecessors(v) {
            if self.lift(u, Some(v)) {
                lifted += 1;
                self.push(u);
            }
        }
        lifted
    }

    fn run(&mut self, update_interval: usize) {
        let n = self.graph.len();
        for v in (0..n).rev() {
            if self.lift(v, None) {
                self.lift_predecessors(v);
            }
        }
        let mut since_update = 0;
        while let Some(v) = self.queue.pop_front() {
            self.queued.remove(v);
            since_update += self.lift_predecessors(v);
            if since_update >= update_interval {
                since_update = 0;
                self.update(0);
                self.update(1);
            }
        }
    }

    /// Can player `pl`'s measure of `v` still increase right now?
    fn can_lift(&mut self, v: VertexId, pl: usize) -> bool {
        let maximise = self.owner_index(v) == pl;
        self.best_successor(v, pl, maximise);
        pm_less(self.measure(v), &self.best, self.prio[v], pl)
    }

    /// Find the vertices whose measure for `pl` is finite and can never be
    /// lifted again; `pl` loses them, so the opponent's measure becomes ⊤.
    fn update(&mut self, pl: usize) {
        self.updates += 1;
        let graph = self.graph;
        let n = graph.len();
        let mut unstable = VertexSet::empty(n);
        let mut pending = VecDeque::new();
        for v in 0..n {
            if self.is_top(v, pl) || self.can_lift(v, pl) {
                unstable.insert(v);
                pending.push_back(v);
            }
        }
        while let Some(u) = pending.pop_front() {
            for &v in graph.predecessors(u) {
                if unstable.contains(v) {
                    continue;
                }
                let becomes_unstable = self.owner_index(v) == pl || !self.has_stable_witness(v, pl, &unstable);
                if becomes_unstable {
                    unstable.insert(v);
                    pending.push_back(v);
                }
            }
        }

        let other = 1 - pl;
        let mut settled = 0;
        for v in 0..n {
            if unstable.contains(v) || self.is_top(v, other) {
                continue;
            }
            self.pms[v * self.k + other] = TOP;
            settled += 1;
            self.push(v);
        }
        if settled > 0 {
            debug!(player = pl, settled, "global update");
        }
    }

    /// Does the minimising vertex `v` keep a stable successor whose
    /// progression does not exceed its current measure?
    fn has_stable_witness(&mut self, v: VertexId, pl: usize, unstable: &VertexSet) -> bool {
        let graph = self.graph;
        let d = self.prio[v];
        let mut tmp = std::mem::take(&mut self.tmp);
        let mut found = false;
        for s in graph.successors(v) {
            if unstable.contains(s) {
                continue;
            }
            prog(&mut tmp, self.measure(s), d, pl, &self.counts);
            if !pm_less(self.measure(v), &tmp, d, pl) {
                found = true;
                break;
            }
        }
        self.tmp = tmp;
        found
    }

    fn finish(mut self) -> Solution {
        let graph = self.graph;
        let mut solution = Solution::new(graph.len());
        let mut solved = true;
        for v in graph.ids() {
            match (self.is_top(v, 0), self.is_top(v, 1)) {
                (true, false) => solution.set_winner(v, Player::Zero),
                (false, true) => solution.set_winner(v, Player::One),
                _ => solved = false,
            }
        }
        // The winner moves to a successor minimising the loser's measure.
        for v in graph.ids() {
            let owner = self.owner_index(v);
            if solution.winner(v) != Some(Player::from_index(owner)) {
                continue;
            }
            if let Some(s) = self.best_successor(v, 1 - owner, false) {
                solution.set_strategy(v, s);
            }
        }
        if !solved {
            warn!("progress measures did not separate the winning regions");
        }
        let stats = solution.stats_mut();
        stats.record("lifts", self.lifts);
        stats.record("lift_attempts", self.lift_attempts);
        stats.record("updates", self.updates);
        solution.retain_winning_strategies(graph);
        solution.set_solved(solved);
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_prog_increments_with_carry() {
        // k = 5, player 1 indices {1, 3}; counts[1] = 1, counts[3] = 2
        let counts = [0, 1, 0, 2, 0];
        let src = [0, 1, 0, 0, 0];
        let mut dst = [0; 5];
        prog(&mut dst, &src, 1, 1, &counts);
        assert_eq!(dst[1], 0);
        assert_eq!(dst[3], 1);

        // priority 3 drops index 1 and increments index 3
        let src = [0, 1, 0, 2, 0];
        prog(&mut dst, &src, 3, 1, &counts);
        assert_eq!(dst[1], TOP);
    }

    #[test]
    fn test_prog_without_increment_truncates() {
        let counts = [1, 1, 1, 1];
        let src = [1, 0, 1, 0];
        let mut dst = [0; 4];
        prog(&mut dst, &src, 1, 0, &counts);
        assert_eq!(&dst[..], &[0, 0, 1, 0]);
    }

    #[test]
    fn test_pm_less_respects_depth_and_top() {
        let a = [0, 0, 1, 0];
        let b = [1, 0, 1, 0];
        assert!(pm_less(&a, &b, 0, 0));
        assert!(!pm_less(&a, &b, 1, 0));
        let top = [TOP, 0, 0, 0];
        assert!(pm_less(&b, &top, 0, 0));
        assert!(!pm_less(&top, &b, 0, 0));
    }

    #[test]
    fn test_fixture_winners() {
        let solver = SpmSolver::new();
        let sol = solver.solve(&fixtures::parity_choice()).unwrap();
        assert!(sol.is_solved());
        assert_eq!(sol.winning_region(Player::Zero), vec![0, 1, 3]);
        assert_eq!(sol.strategy(3), Some(3));
        assert_eq!(sol.strategy(0), Some(1));

        let sol = solver.solve(&fixtures::odd_wins()).unwrap();
        assert_eq!(sol.winning_region(Player::One), vec![0, 1]);
        assert_eq!(sol.strategy(1), Some(0));

        let sol = solver.solve(&fixtures::even_cycle()).unwrap();
        assert_eq!(sol.winning_region(Player::Zero), vec![0, 1]);
    }

    #[test]
    fn test_frequent_updates_give_same_result() {
        let g = fixtures::parity_ladder(40, 6);
        let lazy = SpmSolver::new().solve(&g).unwrap();
        let eager = SpmSolver {
            update_interval_factor: 1,
        }
        .solve(&g)
        .unwrap();
        assert!(lazy.is_solved() && eager.is_solved());
        for v in g.ids() {
            assert_eq!(lazy.winner(v), eager.winner(v));
        }
    }

    #[test]
    fn test_invalid_graph() {
        let mut g = ParityGraph::new();
        g.add_vertex("a", Player::Zero, 1).unwrap();
        let sol = SpmSolver::new().solve(&g).unwrap();
        assert!(!sol.is_valid());
    }
}
