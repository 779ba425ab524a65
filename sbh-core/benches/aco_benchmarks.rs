use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sbh_core::{build_cost_matrix, generate_instance, AcoEngine, AcoParams, InstanceParams, ReadSet};

fn instance(dna_length: usize, k: usize) -> ReadSet {
    let mut rng = StdRng::seed_from_u64(42);
    let params = InstanceParams {
        dna_length,
        k,
        negative_errors_percent: 2,
        positive_errors_percent: 2,
    };
    generate_instance(&params, None, &mut rng)
        .and_then(|spectrum| spectrum.reads())
        .expect("benchmark instance")
}

fn bench_cost_matrix(c: &mut Criterion) {
    let reads = instance(500, 9);

    c.bench_function("cost_matrix_500bp_k9", |b| {
        b.iter(|| black_box(build_cost_matrix(black_box(&reads))))
    });
}

fn bench_aco_step(c: &mut Criterion) {
    let reads = instance(200, 9);
    let costs = build_cost_matrix(&reads);

    c.bench_function("aco_step_200bp_k9", |b| {
        b.iter_batched(
            || {
                AcoEngine::new(
                    costs.clone(),
                    AcoParams {
                        seed: Some(7),
                        ..Default::default()
                    },
                )
                .expect("engine")
            },
            |mut engine| black_box(engine.step().expect("step")),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_cost_matrix, bench_aco_step);
criterion_main!(benches);
