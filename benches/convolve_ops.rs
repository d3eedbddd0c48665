use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use convsoak::convolve::convolve;
use convsoak::{ExecutionMode, Kernel, Matrix, PoolConfig, WorkerPool};

fn input(rows: usize, cols: usize) -> Matrix {
    Matrix::from_vec(rows, cols, (0..(rows * cols) as i64).map(|i| i % 100).collect()).unwrap()
}

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolve_sequential");

    let sizes = vec![
        (64, 64, 3),
        (256, 256, 3),
        (256, 256, 7),
        (512, 128, 5), // Rectangular
    ];

    for (rows, cols, k) in sizes {
        let id = format!("{}x{}_k{}", rows, cols, k);
        let m = input(rows, cols);
        let kernel = Kernel::filled(k, 1).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(&id), &(&m, &kernel), |bench, (m, kernel)| {
            bench.iter(|| {
                let out = convolve(black_box(m), black_box(kernel));
                black_box(out);
            });
        });
    }

    group.finish();
}

fn bench_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_modes");
    group.sample_size(20);

    // Parallel vs serialized shows the cost of the gate; redundant shows the
    // cost of every worker recomputing the full output
    let m = input(256, 256);
    let kernel = Kernel::filled(5, 1).unwrap();

    for mode in ExecutionMode::ALL {
        let pool = WorkerPool::new(PoolConfig::new().with_mode(mode).with_iterations(4));

        group.bench_with_input(BenchmarkId::from_parameter(mode), &pool, |bench, pool| {
            bench.iter(|| {
                let run = pool.run(black_box(&m), black_box(&kernel)).unwrap();
                black_box(run.output);
            });
        });
    }

    group.finish();
}

fn bench_pool_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_size");
    group.sample_size(20);

    let m = input(512, 256);
    let kernel = Kernel::filled(3, 1).unwrap();

    for workers in [1, 2, 4, 8, 16] {
        let pool = WorkerPool::new(PoolConfig::new().with_max_workers(workers));

        group.bench_with_input(BenchmarkId::from_parameter(workers), &pool, |bench, pool| {
            bench.iter(|| {
                let run = pool.run(black_box(&m), black_box(&kernel)).unwrap();
                black_box(run.output);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sequential, bench_modes, bench_pool_size);
criterion_main!(benches);
