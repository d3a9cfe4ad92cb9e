use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relax2d::{Bounds, Engine, Point, Problem, RepulsionParams, Schedule, Segment};

/// A chain of `n` points connected end to end, scattered inside a square
/// bounds, with every interaction family switched on — the worst case for
/// `assemble` since every kernel has work to do every step.
fn chain_problem(n: usize, seed: u64) -> Problem {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut problem = Problem::default();
    for i in 0..n {
        let x = rng.gen_range(0.0..100.0);
        let y = rng.gen_range(0.0..100.0);
        problem.points.push(Point::new(format!("p{i}"), x, y));
    }
    for i in 0..n.saturating_sub(1) {
        problem.segments.push(
            Segment::new(format!("s{i}"), format!("p{i}"), format!("p{}", i + 1)).with_width(1.0),
        );
    }
    problem.bounds = Some(Bounds::new(0.0, 0.0, 100.0, 100.0));
    problem.interactions.segment_segment_repel = RepulsionParams {
        strength: 1.0,
        exponential_decay: 0.2,
        overlap_multiplier: 2.0,
        min_separation: 1.0,
    };
    problem.interactions.point_segment_repel = problem.interactions.segment_segment_repel;
    problem.interactions.bounds_keep_in.strength = 1.0;
    problem.interactions.bounds_keep_in.exponential_decay = 0.2;
    problem.schedule = Schedule {
        max_steps: 200,
        step_size: 0.05,
        epsilon_move: 1e-6,
        max_move_per_step: Some(1.0),
        friction: 0.9,
        relaxation_steps: 40,
    };
    problem
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for n in [16usize, 64, 256] {
        let problem = chain_problem(n, 42);
        group.bench_with_input(format!("single_step_n{n}"), &problem, |bench, problem| {
            bench.iter_batched(
                || Engine::new(problem.clone()).unwrap(),
                |mut engine| engine.step(),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    let small = chain_problem(32, 7);
    group.bench_with_input("solve_to_convergence_n32", &small, |bench, problem| {
        bench.iter_batched(
            || Engine::new(problem.clone()).unwrap(),
            |mut engine| {
                let _ = engine.solve();
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
