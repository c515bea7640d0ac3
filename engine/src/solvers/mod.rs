//! Qualitative and energy-based solvers.
//!
//! Parity family (priorities on vertices): [`ReachabilitySolver`],
//! [`BuchiSolver`], [`PriorityPromotionSolver`], [`SpmSolver`],
//! [`ZielonkaSolver`]. Mean-payoff family (weights on vertices): [`MseSolver`],
//! [`MscaSolver`].

pub mod buchi;
pub mod energy;
pub mod msca;
pub mod mse;
pub mod priority_promotion;
pub mod pspm;
pub mod reachability;
pub mod zielonka;

pub use buchi::BuchiSolver;
pub use msca::MscaSolver;
pub use mse::MseSolver;
pub use priority_promotion::PriorityPromotionSolver;
pub use pspm::SpmSolver;
pub use reachability::ReachabilitySolver;
pub use zielonka::ZielonkaSolver;
