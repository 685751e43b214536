use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use wavefront_dither::{Accumulator, Diffuse, LumaGrid, Sequential};
#[cfg(feature = "rayon")]
use wavefront_dither::{WaitStrategy, Wavefront};

fn gradient(size: usize) -> LumaGrid {
    LumaGrid::from_fn(size, size, |x, y| ((x + y) * 255 / (2 * size)) as u8)
        .unwrap()
}

fn run(engine: &impl Diffuse, luma: &LumaGrid) {
    let mut accumulator = Accumulator::try_from_luma(luma).unwrap();
    black_box(engine.diffuse(&mut accumulator).unwrap());
}

fn bench_sequential_vs_wavefront(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_vs_wavefront");
    group.sample_size(20);

    for size in [64, 256, 1024] {
        let luma = gradient(size);

        group.bench_with_input(
            BenchmarkId::new("sequential", size),
            &luma,
            |b, luma| b.iter(|| run(&Sequential, luma)),
        );

        #[cfg(feature = "rayon")]
        {
            let mut workers = 2;
            while workers <= num_cpus::get().max(2) {
                group.bench_with_input(
                    BenchmarkId::new(format!("wavefront_{workers}"), size),
                    &luma,
                    |b, luma| b.iter(|| run(&Wavefront::new(workers), luma)),
                );
                workers *= 2;
            }
        }
    }

    group.finish();
}

#[cfg(feature = "rayon")]
fn bench_wait_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("wait_strategy");
    group.sample_size(20);

    let luma = gradient(512);
    let workers = num_cpus::get().max(2);

    for (name, wait) in [("block", WaitStrategy::Block), ("spin", WaitStrategy::Spin)]
    {
        let wavefront = Wavefront::new(workers).with_wait_strategy(wait);
        group.bench_function(name, |b| b.iter(|| run(&wavefront, &luma)));
    }

    group.finish();
}

#[cfg(not(feature = "rayon"))]
fn bench_wait_strategies(_: &mut Criterion) {}

criterion_group!(benches, bench_sequential_vs_wavefront, bench_wait_strategies);
criterion_main!(benches);
