use criterion::{black_box, criterion_group, criterion_main, Criterion};

use epiclass_core::model::{Intervention, SimulationParams};
use epiclass_core::scenario::summarize;
use epiclass_core::simulation::simulate;

fn params(days: u32, interventions: usize) -> SimulationParams {
    SimulationParams {
        population_size: 1_000_000.0,
        initial_infectious: 25.0,
        r0: 2.8,
        incubation_rate: 0.19,
        recovery_rate: 0.1,
        fatality_fraction: 0.006,
        horizon_days: days,
        interventions: (0..interventions)
            .map(|i| Intervention::new(i as u32 * 7, 0.05))
            .collect(),
        ..Default::default()
    }
}

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");

    for days in [90u32, 365, 3650] {
        let p = params(days, 0);
        group.bench_function(format!("days={days}"), |b| {
            b.iter(|| simulate(black_box(&p)))
        });
    }

    let p = params(365, 20);
    group.bench_function("days=365,interventions=20", |b| {
        b.iter(|| simulate(black_box(&p)))
    });

    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let p = params(365, 3);
    let snapshots = simulate(&p).unwrap();
    c.bench_function("summarize/days=365", |b| {
        b.iter(|| summarize(black_box("bench"), black_box(&p), black_box(&snapshots)))
    });
}

criterion_group!(benches, bench_simulate, bench_summarize);
criterion_main!(benches);
