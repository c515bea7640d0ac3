//! Every registered solver on the hand-built fixtures.

use ggg_engine::fixtures;
use ggg_engine::registry::{
    discounted_solvers, mean_payoff_solvers, parity_solvers, stochastic_solvers,
};
use ggg_engine::{ParityGraph, Player, Solver};

#[test]
fn test_parity_engines_on_fixtures() {
    let expected: [(ParityGraph, Vec<usize>); 5] = [
        (fixtures::parity_choice(), vec![0, 1, 3]),
        (fixtures::promotion_chain(), vec![0, 1, 2]),
        (fixtures::odd_wins(), vec![]),
        (fixtures::even_cycle(), vec![0, 1]),
        (fixtures::buchi_escape(), vec![2, 3]),
    ];
    for entry in parity_solvers() {
        if matches!(entry.id, "reachability" | "buchi") {
            continue;
        }
        let solver = entry.build();
        for (g, won_by_zero) in &expected {
            let sol = solver.solve(g).unwrap();
            assert!(sol.is_solved(), "{}", entry.id);
            assert_eq!(&sol.winning_region(Player::Zero), won_by_zero, "{}", entry.id);
        }
    }
}

#[test]
fn test_reachability_chain_strategy() {
    let solver = ggg_engine::registry::find(parity_solvers(), "reachability").unwrap();
    let sol = solver.solve(&fixtures::reachability_chain()).unwrap();
    assert_eq!(sol.winning_region(Player::Zero), vec![0, 1, 2]);
    assert_eq!(sol.strategy(0), Some(1));
    assert_eq!(sol.strategy(1), Some(2));
}

#[test]
fn test_mean_payoff_engines_on_fixtures() {
    for entry in mean_payoff_solvers() {
        let solver = entry.build();
        let sol = solver.solve(&fixtures::mp_choice()).unwrap();
        assert_eq!(sol.winning_region(Player::Zero), vec![0, 1, 3], "{}", entry.id);
        assert_eq!(sol.strategy(0), Some(1), "{}", entry.id);
        let sol = solver.solve(&fixtures::mp_positive_cycle()).unwrap();
        assert_eq!(sol.winning_region(Player::Zero), vec![0, 1], "{}", entry.id);
    }
}

#[test]
fn test_discounted_engines_on_fixtures() {
    let g = fixtures::discounted_triangle();
    let expected = [3.82, -0.2, 1.0];
    for entry in discounted_solvers() {
        let sol = entry.build().solve(&g).unwrap();
        assert!(sol.is_solved(), "{}", entry.id);
        for (v, want) in expected.iter().enumerate() {
            let got = sol.value(v).unwrap();
            assert!((got - want).abs() < 1e-6, "{} at {v}: {got}", entry.id);
        }
        assert_eq!(sol.winning_region(Player::One), vec![1], "{}", entry.id);
    }
}

#[test]
fn test_stochastic_engines_on_fixtures() {
    let g = fixtures::stochastic_coin();
    let expected = [2.0 / 3.0, -2.0, -2.0 / 3.0];
    for entry in stochastic_solvers() {
        let sol = entry.build().solve(&g).unwrap();
        assert!(sol.is_solved(), "{}", entry.id);
        for (v, want) in expected.iter().enumerate() {
            let got = sol.value(v).unwrap();
            assert!((got - want).abs() < 1e-6, "{} at {v}: {got}", entry.id);
        }
        assert_eq!(sol.strategy(0), Some(2), "{}", entry.id);
        assert_eq!(sol.strategy(2), None, "{}", entry.id);
    }
}

#[test]
fn test_solutions_serialize() {
    let sol = ggg_engine::solvers::ZielonkaSolver::new()
        .solve(&fixtures::even_cycle())
        .unwrap();
    let json = serde_json::to_value(&sol).unwrap();
    assert_eq!(json["solved"], true);
    assert_eq!(json["winners"][0], "Zero");
}
