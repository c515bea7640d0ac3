//! Priority Promotion parity game solver
//!
//! Every vertex belongs to a *region*, identified by a priority level. A region
//! at level `p` is the attractor, for the player matching `p`'s parity, of the
//! priority-`p` vertices inside the subgame of vertices whose region is at most
//! `p`. Levels are scanned from the highest priority down:
//!
//! - **open**: the owner cannot keep the play inside the region, or the
//!   opponent escapes to a lower level. Continue with the next level.
//! - **closed, escapes upward**: the region is promoted, i.e. merged into the
//!   lowest higher region the opponent can escape to, and the check repeats
//!   there.
//! - **closed, no escapes**: the region is a dominion. Its attractor in the
//!   remaining game is won by the owner, removed, and the scan restarts from
//!   the top.
//!
//! Regions below the current level are reset lazily when the scan reaches
//! them again.

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};

use crate::attractor::attractor_within;
use crate::error::SolveError;
use crate::graph::{Owner, ParityGraph, Player, Priority, Validate, VertexId, VertexSet};
use crate::solution::Solution;
use crate::solver::{reject_invalid, Solver};

#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityPromotionSolver;

impl PriorityPromotionSolver {
    pub fn new() -> Self {
        PriorityPromotionSolver
    }
}

impl Solver<ParityGraph> for PriorityPromotionSolver {
    fn name(&self) -> &'static str {
        "Priority Promotion (PP) Parity Game Solver"
    }

    fn solve(&self, graph: &ParityGraph) -> Result<Solution, SolveError> {
        if let Err(invalid) = reject_invalid(self.name(), graph.len(), graph.validate()) {
            return Ok(invalid);
        }
        info!(
            solver = self.name(),
            vertices = graph.len(),
            edges = graph.edge_count(),
            priorities = graph.unique_priorities().len(),
            "solving"
        );
        let mut state = PromotionState::new(graph);
        let solved = state.run();
        Ok(state.finish(solved))
    }
}

/// Outcome of the closedness check of one region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegionStatus {
    Open,
    Dominion,
    Promote(usize),
}

/// Working state of one solve. Levels are indices into the ascending list of
/// distinct priorities.
struct PromotionState<'a> {
    graph: &'a ParityGraph,
    /// Distinct priorities, ascending
    levels: Vec<Priority>,
    /// Level of each vertex's own priority
    own_level: Vec<usize>,
    /// Vertices of each level
    by_level: Vec<Vec<VertexId>>,
    /// Current region of each vertex
    region: Vec<usize>,
    /// Members ever pushed into each region; stale entries are filtered by `region`
    regions: Vec<Vec<VertexId>>,
    strategy: Vec<Option<VertexId>>,
    disabled: VertexSet,
    queue: VecDeque<VertexId>,
    solution: Solution,
    promotions: u64,
    dominions: u64,
    region_setups: u64,
}

impl<'a> PromotionState<'a> {
    fn new(graph: &'a ParityGraph) -> Self {
        let levels = graph.unique_priorities();
        let own_level: Vec<usize> = graph
            .ids()
            .map(|v| levels.partition_point(|&p| p < graph.priority(v)))
            .collect();
        let mut by_level = vec![Vec::new(); levels.len()];
        for v in graph.ids() {
            by_level[own_level[v]].push(v);
        }
        PromotionState {
            graph,
            region: own_level.clone(),
            regions: vec![Vec::new(); levels.len()],
            strategy: vec![None; graph.len()],
            disabled: VertexSet::empty(graph.len()),
            queue: VecDeque::new(),
            solution: Solution::new(graph.len()),
            levels,
            own_level,
            by_level,
            promotions: 0,
            dominions: 0,
            region_setups: 0,
        }
    }

    fn player(&self, level: usize) -> Player {
        Player::from_parity(self.levels[level])
    }

    fn owned_by(&self, v: VertexId, player: Player) -> bool {
        self.graph.owner(v) == Owner::Player(player)
    }

    /// Main scan. Returns false if levels ran out with vertices left unsolved.
    fn run(&mut self) -> bool {
        let Some(top) = self.levels.len().checked_sub(1) else {
            return true;
        };
        let mut level = Some(top);
        while let Some(p) = level {
            if self.disabled.len() == self.graph.len() {
                return true;
            }
            self.reset_region(p);
            if !self.setup_region(p) {
                level = p.checked_sub(1);
                continue;
            }
            let mut p = p;
            loop {
                match self.region_status(p) {
                    RegionStatus::Open => {
                        trace!(priority = self.levels[p], "region open");
                        level = p.checked_sub(1);
                        break;
                    }
                    RegionStatus::Dominion => {
                        self.set_dominion(p);
                        level = Some(top);
                        break;
                    }
                    RegionStatus::Promote(to) => {
                        self.promote(p, to);
                        p = to;
                    }
                }
            }
        }
        self.disabled.len() == self.graph.len()
    }

    /// Send every vertex still in region `p` back to its own level.
    fn reset_region(&mut self, p: usize) {
        let members = std::mem::take(&mut self.regions[p]);
        for v in members {
            if self.region[v] == p && !self.disabled.contains(v) {
                self.region[v] = self.own_level[v];
                self.strategy[v] = None;
            }
        }
    }

    /// Seed region `p` with its head vertices and attract. Returns false when
    /// no head is available at this level.
    fn setup_region(&mut self, p: usize) -> bool {
        let mut found = false;
        for i in 0..self.by_level[p].len() {
            let v = self.by_level[p][i];
            if self.disabled.contains(v) || self.region[v] != p {
                continue;
            }
            found = true;
            self.strategy[v] = None;
            self.regions[p].push(v);
            self.queue.push_back(v);
        }
        if found {
            self.region_setups += 1;
            self.attract(p);
        }
        found
    }

    /// Extend region `p` from the queued vertices.
    fn attract(&mut self, p: usize) {
        let graph = self.graph;
        let player = self.player(p);
        while let Some(cur) = self.queue.pop_front() {
            for &from in graph.predecessors(cur) {
                if self.disabled.contains(from) || self.region[from] > p {
                    continue;
                }
                if self.region[from] == p {
                    if self.owned_by(from, player) && self.strategy[from].is_none() {
                        self.strategy[from] = Some(cur);
                    }
                    continue;
                }
                if self.owned_by(from, player) {
                    self.strategy[from] = Some(cur);
                } else {
                    let escapes = graph
                        .successors(from)
                        .any(|s| !self.disabled.contains(s) && self.region[s] < p);
                    if escapes {
                        continue;
                    }
                    self.strategy[from] = None;
                }
                self.region[from] = p;
                self.regions[p].push(from);
                self.queue.push_back(from);
            }
        }
    }

    /// Current members of region `p`
    fn members(&self, p: usize) -> Vec<VertexId> {
        self.regions[p]
            .iter()
            .copied()
            .filter(|&v| self.region[v] == p)
            .collect()
    }

    fn region_status(&self, p: usize) -> RegionStatus {
        let player = self.player(p);
        let members = self.members(p);

        for &v in &members {
            if self.owned_by(v, player) {
                if self.strategy[v].is_none() {
                    return RegionStatus::Open;
                }
            } else if self
                .graph
                .successors(v)
                .any(|s| !self.disabled.contains(s) && self.region[s] < p)
            {
                return RegionStatus::Open;
            }
        }

        let lowest_escape = members
            .iter()
            .copied()
            .filter(|&v| !self.owned_by(v, player))
            .flat_map(|v| self.graph.successors(v))
            .filter(|&s| !self.disabled.contains(s) && self.region[s] > p)
            .map(|s| self.region[s])
            .min();
        match lowest_escape {
            Some(to) => RegionStatus::Promote(to),
            None => RegionStatus::Dominion,
        }
    }

    /// Merge region `from` into the higher region `to` and re-attract there.
    fn promote(&mut self, from: usize, to: usize) {
        self.promotions += 1;
        debug!(
            from = self.levels[from],
            to = self.levels[to],
            "promoting region"
        );
        let members = std::mem::take(&mut self.regions[from]);
        for v in members {
            if self.region[v] == from {
                self.region[v] = to;
                self.regions[to].push(v);
                self.queue.push_back(v);
            }
        }
        self.attract(to);
    }

    /// Resolve the dominion at level `p`, then reset every remaining region.
    fn set_dominion(&mut self, p: usize) {
        self.dominions += 1;
        let player = self.player(p);
        let members = self.members(p);

        let mut active = VertexSet::full(self.graph.len());
        active.subtract(&self.disabled);
        let attr = attractor_within(self.graph, &active, members.iter().copied(), player);
        debug!(
            priority = self.levels[p],
            player = %player,
            region = members.len(),
            dominion = attr.len(),
            "dominion found"
        );

        for &v in &members {
            if self.owned_by(v, player) {
                if let Some(s) = self.strategy[v] {
                    self.solution.set_strategy(v, s);
                }
            }
        }
        for &(v, s) in &attr.strategy {
            if self.owned_by(v, player) {
                self.solution.set_strategy(v, s);
            }
        }
        for v in attr.region.iter() {
            self.solution.set_winner(v, player);
            self.disabled.insert(v);
        }

        for v in self.graph.ids() {
            self.region[v] = self.own_level[v];
            self.strategy[v] = None;
        }
        for list in &mut self.regions {
            list.clear();
        }
    }

    fn finish(mut self, solved: bool) -> Solution {
        if !solved {
            warn!(
                remaining = self.graph.len() - self.disabled.len(),
                "priority promotion ended with unsolved vertices"
            );
        }
        let stats = self.solution.stats_mut();
        stats.record("promotions", self.promotions);
        stats.record("dominions", self.dominions);
        stats.record("region_setups", self.region_setups);
        self.solution.retain_winning_strategies(self.graph);
        self.solution.set_solved(solved);
        self.solution
    }
}
