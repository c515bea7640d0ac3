//! Cross-checks between the parity engines on random arenas.

mod common;

use proptest::prelude::*;

use common::{arb_parity, assert_sound, winners};
use ggg_engine::attractor::attractor;
use ggg_engine::graph::{Owner, Player};
use ggg_engine::solvers::{BuchiSolver, PriorityPromotionSolver, SpmSolver, ZielonkaSolver};
use ggg_engine::{ParityGraph, Solver, VertexId};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn parity_solvers_agree(g in arb_parity(12, 6)) {
        let pp = PriorityPromotionSolver::new().solve(&g).unwrap();
        let spm = SpmSolver::new().solve(&g).unwrap();
        let rec = ZielonkaSolver::new().solve(&g).unwrap();
        prop_assert!(pp.is_solved() && spm.is_solved() && rec.is_solved());
        prop_assert_eq!(winners(&g, &pp), winners(&g, &spm));
        prop_assert_eq!(winners(&g, &pp), winners(&g, &rec));
        for v in g.ids() {
            prop_assert!(pp.winner(v).is_some(), "vertex {} left undecided", v);
        }
    }

    #[test]
    fn parity_strategies_are_sound(g in arb_parity(10, 5)) {
        assert_sound(&g, &PriorityPromotionSolver::new().solve(&g).unwrap());
        assert_sound(&g, &SpmSolver::new().solve(&g).unwrap());
        assert_sound(&g, &ZielonkaSolver::new().solve(&g).unwrap());
    }

    #[test]
    fn buchi_agrees_on_binary_priorities(g in arb_parity(12, 1)) {
        let buchi = BuchiSolver::new().solve(&g).unwrap();
        let rec = ZielonkaSolver::new().solve(&g).unwrap();
        prop_assert_eq!(winners(&g, &buchi), winners(&g, &rec));
        assert_sound(&g, &buchi);
    }

    #[test]
    fn compression_keeps_winners(g in arb_parity(10, 12)) {
        let compressed = g.compress_priorities();
        prop_assert!(compressed.max_priority() <= g.max_priority());
        for v in g.ids() {
            prop_assert_eq!(g.priority(v) % 2, compressed.priority(v) % 2);
        }
        let solvers: [&dyn Solver<ParityGraph>; 3] =
            [&PriorityPromotionSolver, &SpmSolver::default(), &ZielonkaSolver];
        for solver in solvers {
            let before = solver.solve(&g).unwrap();
            let after = solver.solve(&compressed).unwrap();
            prop_assert_eq!(winners(&g, &before), winners(&compressed, &after));
        }
    }

    #[test]
    fn solving_is_deterministic(g in arb_parity(10, 6)) {
        let pp = PriorityPromotionSolver::new();
        prop_assert_eq!(pp.solve(&g).unwrap(), pp.solve(&g).unwrap());
        let spm = SpmSolver::new();
        prop_assert_eq!(spm.solve(&g).unwrap(), spm.solve(&g).unwrap());
    }

    #[test]
    fn attractor_is_closed(
        g in arb_parity(12, 0),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..4),
        odd in any::<bool>(),
    ) {
        let player = if odd { Player::One } else { Player::Zero };
        let target: Vec<VertexId> = picks.iter().map(|i| i.index(g.len())).collect();
        let attr = attractor(&g, &target, player);
        for &t in &target {
            prop_assert!(attr.contains(t));
        }
        for v in g.ids() {
            let into = g.successors(v).filter(|&s| attr.contains(s)).count();
            let mine = g.owner(v) == Owner::Player(player);
            if attr.contains(v) {
                if !target.contains(&v) {
                    let ok = if mine { into > 0 } else { into == g.out_degree(v) };
                    prop_assert!(ok);
                }
            } else {
                let ok = if mine { into == 0 } else { into < g.out_degree(v) };
                prop_assert!(ok);
            }
        }
        for &(v, s) in &attr.strategy {
            prop_assert!(g.has_edge(v, s) && attr.contains(s));
        }
    }
}
