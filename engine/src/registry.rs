//! Solver registry: which solvers exist for each kind of game, under which
//! short id.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::discounted::{
    ObjectiveImprovementSolver, StrategyImprovementSolver, ValueIterationSolver,
};
use crate::graph::{DiscountedGraph, MeanPayoffGraph, ParityGraph, StochasticGraph};
use crate::solver::Solver;
use crate::solvers::{
    BuchiSolver, MscaSolver, MseSolver, PriorityPromotionSolver, ReachabilitySolver, SpmSolver,
    ZielonkaSolver,
};

/// The four kinds of game graph the engine solves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    Parity,
    MeanPayoff,
    Discounted,
    Stochastic,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Parity,
        GameKind::MeanPayoff,
        GameKind::Discounted,
        GameKind::Stochastic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Parity => "parity",
            GameKind::MeanPayoff => "mean-payoff",
            GameKind::Discounted => "discounted",
            GameKind::Stochastic => "stochastic",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown game kind '{0}' (expected parity, mean-payoff, discounted or stochastic)")]
pub struct UnknownGameKind(pub String);

impl FromStr for GameKind {
    type Err = UnknownGameKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parity" => Ok(GameKind::Parity),
            "mean-payoff" | "meanpayoff" | "mpg" => Ok(GameKind::MeanPayoff),
            "discounted" => Ok(GameKind::Discounted),
            "stochastic" | "stochastic-discounted" => Ok(GameKind::Stochastic),
            _ => Err(UnknownGameKind(s.to_string())),
        }
    }
}

/// A solver shared across threads behind a trait object
pub type BoxedSolver<G> = Box<dyn Solver<G> + Send + Sync>;

/// One registered solver: its short id and how to build it.
pub struct SolverEntry<G> {
    pub id: &'static str,
    build: fn() -> BoxedSolver<G>,
}

impl<G> SolverEntry<G> {
    pub fn build(&self) -> BoxedSolver<G> {
        (self.build)()
    }

    pub fn name(&self) -> &'static str {
        self.build().name()
    }
}

impl<G> fmt::Debug for SolverEntry<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverEntry").field("id", &self.id).finish()
    }
}

fn boxed<G, S>() -> BoxedSolver<G>
where
    S: Solver<G> + Default + Send + Sync + 'static,
{
    Box::new(S::default())
}

fn entry<G>(id: &'static str, build: fn() -> BoxedSolver<G>) -> SolverEntry<G> {
    SolverEntry { id, build }
}

pub fn parity_solvers() -> Vec<SolverEntry<ParityGraph>> {
    vec![
        entry("reachability", boxed::<ParityGraph, ReachabilitySolver>),
        entry("buchi", boxed::<ParityGraph, BuchiSolver>),
        entry("pp", boxed::<ParityGraph, PriorityPromotionSolver>),
        entry("pspm", boxed::<ParityGraph, SpmSolver>),
        entry("zielonka", boxed::<ParityGraph, ZielonkaSolver>),
    ]
}

pub fn mean_payoff_solvers() -> Vec<SolverEntry<MeanPayoffGraph>> {
    vec![
        entry("mse", boxed::<MeanPayoffGraph, MseSolver>),
        entry("msca", boxed::<MeanPayoffGraph, MscaSolver>),
    ]
}

pub fn discounted_solvers() -> Vec<SolverEntry<DiscountedGraph>> {
    vec![
        entry("value", boxed::<DiscountedGraph, ValueIterationSolver<DiscountedGraph>>),
        entry("strategy", boxed::<DiscountedGraph, StrategyImprovementSolver<DiscountedGraph>>),
        entry("objective", boxed::<DiscountedGraph, ObjectiveImprovementSolver<DiscountedGraph>>),
    ]
}

pub fn stochastic_solvers() -> Vec<SolverEntry<StochasticGraph>> {
    vec![
        entry("value", boxed::<StochasticGraph, ValueIterationSolver<StochasticGraph>>),
        entry("strategy", boxed::<StochasticGraph, StrategyImprovementSolver<StochasticGraph>>),
        entry("objective", boxed::<StochasticGraph, ObjectiveImprovementSolver<StochasticGraph>>),
    ]
}

/// Build the solver registered under `id`, if any.
pub fn find<G>(entries: Vec<SolverEntry<G>>, id: &str) -> Option<BoxedSolver<G>> {
    entries.into_iter().find(|e| e.id == id).map(|e| e.build())
}

/// `(id, name)` of every solver for `kind`, in registration order.
pub fn listing(kind: GameKind) -> Vec<(&'static str, &'static str)> {
    fn pairs<G>(entries: Vec<SolverEntry<G>>) -> Vec<(&'static str, &'static str)> {
        entries.iter().map(|e| (e.id, e.name())).collect()
    }
    match kind {
        GameKind::Parity => pairs(parity_solvers()),
        GameKind::MeanPayoff => pairs(mean_payoff_solvers()),
        GameKind::Discounted => pairs(discounted_solvers()),
        GameKind::Stochastic => pairs(stochastic_solvers()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_game_kind_round_trip() {
        for kind in GameKind::ALL {
            assert_eq!(kind.to_string().parse::<GameKind>(), Ok(kind));
        }
        assert_eq!("MPG".parse::<GameKind>(), Ok(GameKind::MeanPayoff));
        assert!("chess".parse::<GameKind>().is_err());
    }

    #[test]
    fn test_listing_names() {
        let parity = listing(GameKind::Parity);
        assert_eq!(parity.len(), 5);
        assert_eq!(parity[2], ("pp", "Priority Promotion (PP) Parity Game Solver"));
        let stochastic = listing(GameKind::Stochastic);
        assert_eq!(
            stochastic[1],
            ("strategy", "Strategy Improvement Stochastic Discounted Game Solver")
        );
        assert_eq!(listing(GameKind::MeanPayoff).len(), 2);
        assert_eq!(listing(GameKind::Discounted).len(), 3);
    }

    #[test]
    fn test_find_builds_a_working_solver() {
        let solver = find(parity_solvers(), "zielonka").unwrap();
        let sol = solver.solve(&fixtures::even_cycle()).unwrap();
        assert!(sol.is_solved());
        assert!(find(parity_solvers(), "nope").is_none());
        assert!(find(mean_payoff_solvers(), "pp").is_none());
    }
}
