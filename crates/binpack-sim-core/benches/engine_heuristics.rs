use binpack_sim_core::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};

fn generate_sizes(count: usize, min: f64, max: f64) -> Vec<f64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    (0..count).map(|_| rng.gen_range(min..=max)).collect()
}

fn bench_heuristics(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristics");

    let item_counts = vec![50, 200, 1000];

    for count in item_counts {
        let sizes = generate_sizes(count, 0.15, 0.7);

        group.throughput(Throughput::Elements(count as u64));

        for algo in Algorithm::ALL {
            let input = SimulationInput::new(&sizes, algo).expect("generated sizes are valid");
            group.bench_with_input(BenchmarkId::new(algo.code(), count), &input, |b, input| {
                b.iter(|| black_box(run(input)));
            });
        }
    }

    group.finish();
}

fn bench_small_items(c: &mut Criterion) {
    // many small items keep bins open longer, which stresses the Best-Fit full scan
    let mut group = c.benchmark_group("small_items");
    let sizes = generate_sizes(500, 0.01, 0.1);

    for algo in [Algorithm::FirstFit, Algorithm::BestFit] {
        let input = SimulationInput::new(&sizes, algo).expect("generated sizes are valid");
        group.bench_function(algo.code(), |b| b.iter(|| black_box(run(&input))));
    }

    group.finish();
}

fn bench_trace_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace_queries");

    let sizes = generate_sizes(1000, 0.15, 0.7);
    let input = SimulationInput::new(&sizes, Algorithm::BestFitDecreasing).unwrap();
    let trace = run(&input);

    group.bench_function("stats", |b| {
        b.iter(|| black_box(trace.stats()));
    });

    group.bench_function("final_fill_levels", |b| {
        b.iter(|| black_box(trace.final_fill_levels()));
    });

    group.bench_function("replay", |b| {
        b.iter(|| black_box(Replay::new(&trace).finish()));
    });

    group.bench_function("to_json_lines", |b| {
        b.iter(|| black_box(binpack_sim_core::to_json_lines(&trace)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_heuristics,
    bench_small_items,
    bench_trace_queries
);
criterion_main!(benches);
