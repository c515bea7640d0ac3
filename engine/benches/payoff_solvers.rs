//! Criterion benchmarks for the mean-payoff and discounted engines

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ggg_engine::discounted::{
    ObjectiveImprovementSolver, StrategyImprovementSolver, ValueIterationSolver,
};
use ggg_engine::fixtures::{discounted_ring, mean_payoff_ring};
use ggg_engine::solvers::{MscaSolver, MseSolver};
use ggg_engine::{DiscountedGraph, Solver};

fn benchmark_mean_payoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("mean_payoff");
    for &(n, w) in &[(200usize, 10i64), (200, 1_000), (1_000, 100)] {
        let graph = mean_payoff_ring(n, w);
        let id = format!("{n}w{w}");
        group.bench_with_input(BenchmarkId::new("mse", &id), &graph, |b, g| {
            b.iter(|| MseSolver::new().solve(black_box(g)))
        });
        group.bench_with_input(BenchmarkId::new("msca", &id), &graph, |b, g| {
            b.iter(|| MscaSolver::new().solve(black_box(g)))
        });
    }
    group.finish();
}

fn benchmark_discounted(c: &mut Criterion) {
    let mut group = c.benchmark_group("discounted");
    group.sample_size(20);
    for &n in &[20usize, 60] {
        let graph = discounted_ring(n);
        let solvers: [(&str, &dyn Solver<DiscountedGraph>); 3] = [
            ("value", &ValueIterationSolver::<DiscountedGraph>::new()),
            ("strategy", &StrategyImprovementSolver::<DiscountedGraph>::new()),
            ("objective", &ObjectiveImprovementSolver::<DiscountedGraph>::new()),
        ];
        for (name, solver) in solvers {
            group.bench_with_input(BenchmarkId::new(name, n), &graph, |b, g| {
                b.iter(|| solver.solve(black_box(g)))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_mean_payoff, benchmark_discounted);
criterion_main!(benches);
