//! ggg Engine - game graphs and the solvers that decide them
//!
//! This crate contains the arena-backed graph model for parity, mean-payoff,
//! discounted and stochastic discounted games, the attractor engine, every
//! solver, and the embedded Simplex used by the LP-based discounted solvers.
//!
//! Solvers are single-threaded and hold no state between calls. Parallelism is
//! only offered across independent solves (see [`batch`]).

pub mod attractor;
pub mod batch;
pub mod discounted;
pub mod error;
pub mod fixtures;
pub mod graph;
pub mod registry;
pub mod simplex;
pub mod solution;
pub mod solver;
pub mod solvers;

pub use error::{GraphError, SimplexError, SolveError};
pub use graph::{
    DiscountedEdge, DiscountedGraph, Graph, MeanPayoffGraph, Owner, ParityGraph, Player, Priority,
    StochasticEdge, StochasticGraph, Validate, VertexId,
};
pub use registry::GameKind;
pub use solution::{Solution, Statistics};
pub use solver::Solver;
