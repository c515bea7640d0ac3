//! Seeded random game generators.
//!
//! Every generator takes a `*Params` value and a seed and always returns a
//! valid graph: each vertex gets between `min_out_degree` and
//! `max_out_degree` distinct successors (fewer only when the graph is too
//! small), and chance vertices only point at player vertices. The same
//! parameters and seed always give the same graph.

use rand::rngs::SmallRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use ggg_engine::{
    DiscountedEdge, DiscountedGraph, MeanPayoffGraph, Owner, ParityGraph, Player, Priority,
    StochasticEdge, StochasticGraph, VertexId,
};

use crate::error::GenerateError;

/// Size and branching shared by every generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topology {
    pub vertices: usize,
    pub min_out_degree: usize,
    pub max_out_degree: usize,
}

impl Default for Topology {
    fn default() -> Self {
        Topology {
            vertices: 10,
            min_out_degree: 1,
            max_out_degree: 3,
        }
    }
}

impl Topology {
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.vertices == 0 {
            return Err(GenerateError::NoVertices);
        }
        if self.min_out_degree == 0 || self.min_out_degree > self.max_out_degree {
            return Err(GenerateError::OutDegree {
                min: self.min_out_degree,
                max: self.max_out_degree,
            });
        }
        Ok(())
    }

    /// Distinct successors drawn from `candidates`, in random order.
    fn successors(&self, rng: &mut SmallRng, candidates: &[VertexId]) -> Vec<VertexId> {
        let degree = rng
            .random_range(self.min_out_degree..=self.max_out_degree)
            .min(candidates.len());
        index::sample(rng, candidates.len(), degree)
            .into_iter()
            .map(|i| candidates[i])
            .collect()
    }
}

fn check_range(name: &'static str, min: f64, max: f64) -> Result<(), GenerateError> {
    if min > max || !min.is_finite() || !max.is_finite() {
        return Err(GenerateError::EmptyRange { name, min, max });
    }
    Ok(())
}

fn random_player(rng: &mut SmallRng) -> Player {
    if rng.random_bool(0.5) {
        Player::Zero
    } else {
        Player::One
    }
}

/// Weights are kept to two decimals so files stay readable
fn round_weight(w: f64) -> f64 {
    (w * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParityParams {
    pub topology: Topology,
    pub min_priority: Priority,
    pub max_priority: Priority,
}

impl Default for ParityParams {
    fn default() -> Self {
        ParityParams {
            topology: Topology::default(),
            min_priority: 0,
            max_priority: 5,
        }
    }
}

impl ParityParams {
    pub fn validate(&self) -> Result<(), GenerateError> {
        self.topology.validate()?;
        check_range(
            "priority",
            f64::from(self.min_priority),
            f64::from(self.max_priority),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanPayoffParams {
    pub topology: Topology,
    pub min_weight: i64,
    pub max_weight: i64,
}

impl Default for MeanPayoffParams {
    fn default() -> Self {
        MeanPayoffParams {
            topology: Topology::default(),
            min_weight: -10,
            max_weight: 10,
        }
    }
}

impl MeanPayoffParams {
    pub fn validate(&self) -> Result<(), GenerateError> {
        self.topology.validate()?;
        check_range("weight", self.min_weight as f64, self.max_weight as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountedParams {
    pub topology: Topology,
    pub min_weight: f64,
    pub max_weight: f64,
    pub min_discount: f64,
    pub max_discount: f64,
}

impl Default for DiscountedParams {
    fn default() -> Self {
        DiscountedParams {
            topology: Topology::default(),
            min_weight: -10.0,
            max_weight: 10.0,
            min_discount: 0.1,
            max_discount: 0.9,
        }
    }
}

impl DiscountedParams {
    pub fn validate(&self) -> Result<(), GenerateError> {
        self.topology.validate()?;
        check_range("weight", self.min_weight, self.max_weight)?;
        check_range("discount", self.min_discount, self.max_discount)?;
        if self.min_discount < 0.0 || self.max_discount >= 1.0 {
            return Err(GenerateError::Discount {
                min: self.min_discount,
                max: self.max_discount,
                interval: "[0, 1)",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticParams {
    pub topology: Topology,
    pub min_weight: f64,
    pub max_weight: f64,
    pub min_discount: f64,
    pub max_discount: f64,
    /// Share of vertices owned by chance
    pub chance_ratio: f64,
}

impl Default for StochasticParams {
    fn default() -> Self {
        StochasticParams {
            topology: Topology::default(),
            min_weight: -10.0,
            max_weight: 10.0,
            min_discount: 0.1,
            max_discount: 0.9,
            chance_ratio: 0.3,
        }
    }
}

impl StochasticParams {
    pub fn validate(&self) -> Result<(), GenerateError> {
        self.topology.validate()?;
        check_range("weight", self.min_weight, self.max_weight)?;
        check_range("discount", self.min_discount, self.max_discount)?;
        if self.min_discount <= 0.0 || self.max_discount >= 1.0 {
            return Err(GenerateError::Discount {
                min: self.min_discount,
                max: self.max_discount,
                interval: "(0, 1)",
            });
        }
        if !(0.0..1.0).contains(&self.chance_ratio) {
            return Err(GenerateError::ChanceRatio(self.chance_ratio));
        }
        Ok(())
    }
}

pub fn parity(params: &ParityParams, seed: u64) -> Result<ParityGraph, GenerateError> {
    params.validate()?;
    let mut rng = SmallRng::seed_from_u64(seed);
    let n = params.topology.vertices;
    let all: Vec<VertexId> = (0..n).collect();

    let mut graph = ParityGraph::new();
    for i in 0..n {
        let owner = random_player(&mut rng);
        let priority = rng.random_range(params.min_priority..=params.max_priority);
        graph.add_vertex(format!("v{i}"), owner, priority)?;
    }
    for v in 0..n {
        for t in params.topology.successors(&mut rng, &all) {
            graph.add_edge(v, t, format!("edge_{v}_{t}"), ())?;
        }
    }
    debug!(seed, vertices = n, edges = graph.edge_count(), "generated parity game");
    Ok(graph)
}

pub fn mean_payoff(params: &MeanPayoffParams, seed: u64) -> Result<MeanPayoffGraph, GenerateError> {
    params.validate()?;
    let mut rng = SmallRng::seed_from_u64(seed);
    let n = params.topology.vertices;
    let all: Vec<VertexId> = (0..n).collect();

    let mut graph = MeanPayoffGraph::new();
    for i in 0..n {
        let owner = random_player(&mut rng);
        let weight = rng.random_range(params.min_weight..=params.max_weight);
        graph.add_vertex(format!("v{i}"), owner, weight)?;
    }
    for v in 0..n {
        for t in params.topology.successors(&mut rng, &all) {
            graph.add_edge(v, t, format!("edge_{v}_{t}"), ())?;
        }
    }
    debug!(seed, vertices = n, edges = graph.edge_count(), "generated mean-payoff game");
    Ok(graph)
}

pub fn discounted(params: &DiscountedParams, seed: u64) -> Result<DiscountedGraph, GenerateError> {
    params.validate()?;
    let mut rng = SmallRng::seed_from_u64(seed);
    let n = params.topology.vertices;
    let all: Vec<VertexId> = (0..n).collect();

    let mut graph = DiscountedGraph::new();
    for i in 0..n {
        let owner = random_player(&mut rng);
        graph.add_vertex(format!("v{i}"), owner, ())?;
    }
    for v in 0..n {
        for t in params.topology.successors(&mut rng, &all) {
            let weight = round_weight(rng.random_range(params.min_weight..=params.max_weight));
            let discount = rng.random_range(params.min_discount..=params.max_discount);
            graph.add_edge(v, t, format!("edge_{v}_{t}"), DiscountedEdge::new(weight, discount))?;
        }
    }
    debug!(seed, vertices = n, edges = graph.edge_count(), "generated discounted game");
    Ok(graph)
}

/// At most `vertices - 1` vertices go to chance so at least one player
/// vertex is left for them to point at.
pub fn stochastic(params: &StochasticParams, seed: u64) -> Result<StochasticGraph, GenerateError> {
    params.validate()?;
    let mut rng = SmallRng::seed_from_u64(seed);
    let n = params.topology.vertices;
    let all: Vec<VertexId> = (0..n).collect();

    let chance_count = ((n as f64 * params.chance_ratio).floor() as usize).min(n - 1);
    let mut is_chance = vec![false; n];
    for i in index::sample(&mut rng, n, chance_count) {
        is_chance[i] = true;
    }
    let players: Vec<VertexId> = all.iter().copied().filter(|&v| !is_chance[v]).collect();

    let mut graph = StochasticGraph::new();
    for (i, &chance) in is_chance.iter().enumerate() {
        let owner = if chance {
            Owner::Chance
        } else {
            Owner::Player(random_player(&mut rng))
        };
        graph.add_vertex(format!("v{i}"), owner, ())?;
    }
    for v in 0..n {
        if is_chance[v] {
            let targets = params.topology.successors(&mut rng, &players);
            let shares: Vec<u32> = targets.iter().map(|_| rng.random_range(1..=10)).collect();
            let total: u32 = shares.iter().sum();
            let mut assigned = 0.0;
            for (k, (&t, &share)) in targets.iter().zip(&shares).enumerate() {
                let probability = if k + 1 == targets.len() {
                    1.0 - assigned
                } else {
                    f64::from(share) / f64::from(total)
                };
                assigned += probability;
                graph.add_edge(v, t, format!("edge_{v}_{t}"), StochasticEdge::chance(probability))?;
            }
        } else {
            for t in params.topology.successors(&mut rng, &all) {
                let weight = round_weight(rng.random_range(params.min_weight..=params.max_weight));
                let discount = rng.random_range(params.min_discount..=params.max_discount);
                graph.add_edge(
                    v,
                    t,
                    format!("edge_{v}_{t}"),
                    StochasticEdge::decision(weight, discount),
                )?;
            }
        }
    }
    debug!(
        seed,
        vertices = n,
        chance = chance_count,
        edges = graph.edge_count(),
        "generated stochastic discounted game"
    );
    Ok(graph)
}

/// Generate `count` games in parallel; game `i` uses seed `base_seed + i`.
pub fn generate_many<G, F>(count: usize, base_seed: u64, generate: F) -> Result<Vec<G>, GenerateError>
where
    G: Send,
    F: Fn(u64) -> Result<G, GenerateError> + Sync,
{
    (0..count)
        .into_par_iter()
        .map(|i| generate(base_seed.wrapping_add(i as u64)))
        .collect()
}
