use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spacetime_core::{api_version::ApiVersion, hasher::Sha256Domain};
use spacetime_post::fallback::{generate_leaf_challenges, PoStShape, PublicParams};

fn fallback_challenges_benchmark(c: &mut Criterion) {
    let randomness = Sha256Domain([7; 32]);
    let prover_id = Sha256Domain([11; 32]);

    let mut group = c.benchmark_group("fallback-leaf-challenges");
    for challenge_count in &[10usize, 66] {
        let pub_params = PublicParams {
            sector_size: 1 << 35,
            challenge_count: *challenge_count,
            sector_count: 2349,
            shape: PoStShape::Window,
            api_version: ApiVersion::V1_1_0,
        };

        group.throughput(Throughput::Elements(*challenge_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(challenge_count),
            &pub_params,
            |b, pub_params| {
                b.iter(|| {
                    black_box(generate_leaf_challenges(
                        pub_params,
                        &randomness,
                        &prover_id,
                        black_box(42),
                        black_box(1000),
                    ))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, fallback_challenges_benchmark);
criterion_main!(benches);
