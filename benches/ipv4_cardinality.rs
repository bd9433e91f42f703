use std::hash::BuildHasherDefault;

use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion, Throughput,
};
use hyperloglogplus::HyperLogLog as HyperLogLogTrait;
use ipv4_cardinality::generator::generate_file;
use ipv4_cardinality::{count_unique, Config, HyperLogLog};
use pprof::criterion::{Output, PProfProfiler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};
use wyhash::WyHash;

/// Add and estimate operations are benchmarked against cardinalities ranging from 0 to
/// `DEFAULT_MAX_CARDINALITY` or environment variable `N` (if defined) with cardinality
/// multiplied by 16 with every iteration as [0, 1, 16, 256, ..., N].
const DEFAULT_MAX_CARDINALITY: usize = 1 << 20;
/// Lines in the file used by the scan benchmark.
const SCAN_LINES: u64 = 2_000_000;

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Protobuf));
    targets = benchmark
}
criterion_main!(benches);

fn benchmark(c: &mut Criterion) {
    let bench_results_path = std::env::var("BENCH_RESULTS_PATH")
        .unwrap_or_else(|_| env!("CARGO_TARGET_TMPDIR").to_string());
    let max_cardinality = std::env::var("N")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CARDINALITY);

    let cardinalities: Vec<usize> = std::iter::once(0)
        .chain((0..).map(|c| 1 << (4 * c)))
        .take_while(|&c| c <= max_cardinality)
        .collect();

    let mut group = c.benchmark_group("add");
    for &cardinality in &cardinalities {
        group.throughput(Throughput::Elements(cardinality.max(1) as u64));
        bench_add::<Ipv4Sketch>(&mut group, cardinality);
        bench_add::<HyperLogLogCrate>(&mut group, cardinality);
        bench_add::<HyperLogLogPlus>(&mut group, cardinality);
    }
    group.finish();

    let mut group = c.benchmark_group("estimate");
    group.throughput(Throughput::Elements(1));
    for &cardinality in &cardinalities {
        bench_estimate::<Ipv4Sketch>(&mut group, cardinality);
        bench_estimate::<HyperLogLogCrate>(&mut group, cardinality);
        bench_estimate::<HyperLogLogPlus>(&mut group, cardinality);
    }
    group.finish();

    let mut group = c.benchmark_group("merge");
    for precision in [10u8, 14, 18] {
        let mut lhs = HyperLogLog::new(precision).unwrap();
        let mut rhs = HyperLogLog::new(precision).unwrap();
        for addr in 0..100_000u32 {
            lhs.add(addr);
            rhs.add(addr.wrapping_mul(2_654_435_761));
        }
        group.bench_with_input(BenchmarkId::new("ipv4-cardinality", precision), &rhs, |b, rhs| {
            b.iter(|| {
                let mut merged = lhs.clone();
                merged.merge(black_box(rhs)).unwrap();
                merged
            });
        });
    }
    group.finish();

    bench_scan(c);

    let results: Vec<StatRecord> = cardinalities
        .iter()
        .map(|&cardinality| StatRecord {
            cardinality,
            ipv4_cardinality: measure_error::<Ipv4Sketch>(cardinality),
            hyperloglog: measure_error::<HyperLogLogCrate>(cardinality),
            hyperloglogplus: measure_error::<HyperLogLogPlus>(cardinality),
        })
        .collect();

    let table_config = Settings::default().with(Style::markdown());
    std::fs::write(
        format!("{}/relative_error.md", bench_results_path),
        Table::new(results).with(table_config).to_string(),
    )
    .unwrap();
}

fn bench_scan(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ips.txt");
    generate_file(&path, SCAN_LINES, 0.5, Some(12345)).unwrap();

    let mut group = c.benchmark_group("scan");
    group.sample_size(10);
    group.throughput(Throughput::Elements(SCAN_LINES));
    for workers in [1, 2, 4, 8] {
        let config = Config::default().with_workers(workers);
        group.bench_with_input(BenchmarkId::new("workers", workers), &config, |b, config| {
            b.iter(|| count_unique(&path, config).unwrap());
        });
    }
    group.finish();
}

/// Cardinality estimator trait representing common estimator operations.
trait EstimatorTrait {
    fn new() -> Self;
    fn add(&mut self, addr: u32);
    fn estimate(&mut self) -> usize;
    fn name() -> String;
}

fn bench_add<E: EstimatorTrait>(group: &mut BenchmarkGroup<WallTime>, cardinality: usize) {
    group.bench_with_input(
        BenchmarkId::new(E::name(), cardinality),
        &cardinality,
        |b, &cardinality| {
            b.iter(|| {
                let mut estimator = E::new();
                for addr in 0..black_box(cardinality) as u32 {
                    estimator.add(black_box(addr));
                }
            });
        },
    );
}

fn bench_estimate<E: EstimatorTrait>(group: &mut BenchmarkGroup<WallTime>, cardinality: usize) {
    group.bench_with_input(
        BenchmarkId::new(E::name(), cardinality),
        &cardinality,
        |b, &cardinality| {
            let mut estimator = E::new();
            for addr in 0..black_box(cardinality) as u32 {
                estimator.add(black_box(addr));
            }
            b.iter(|| estimator.estimate());
        },
    );
}

fn measure_error<E: EstimatorTrait>(cardinality: usize) -> String {
    let n = 100;
    let mut total_relative_error: f64 = 0.0;
    let mut rng = StdRng::seed_from_u64(12345);
    for _ in 0..n {
        let mut estimator = E::new();
        for _ in 0..cardinality {
            estimator.add(rng.gen());
        }
        let relative_error = if cardinality == 0 {
            0.0
        } else {
            (estimator.estimate() as f64 - cardinality as f64).abs() / cardinality as f64
        };
        total_relative_error += relative_error;
    }
    let avg_relative_error = total_relative_error / f64::from(n);

    if avg_relative_error < 1.0 {
        format!("{:.4}", avg_relative_error)
    } else {
        format!("{:.2e}", avg_relative_error)
    }
}

#[derive(Tabled)]
struct StatRecord {
    cardinality: usize,
    ipv4_cardinality: String,
    hyperloglog: String,
    hyperloglogplus: String,
}

struct Ipv4Sketch(HyperLogLog);

impl EstimatorTrait for Ipv4Sketch {
    fn new() -> Self {
        Self(HyperLogLog::new(14).unwrap())
    }

    fn add(&mut self, addr: u32) {
        self.0.add(addr);
    }

    fn estimate(&mut self) -> usize {
        self.0.estimate() as usize
    }

    fn name() -> String {
        "ipv4-cardinality".to_string()
    }
}

struct HyperLogLogCrate(hyperloglog::HyperLogLog);

impl EstimatorTrait for HyperLogLogCrate {
    fn new() -> Self {
        Self(hyperloglog::HyperLogLog::new(0.0081))
    }

    fn add(&mut self, addr: u32) {
        self.0.insert(&addr);
    }

    fn estimate(&mut self) -> usize {
        self.0.len() as usize
    }

    fn name() -> String {
        "hyperloglog".to_string()
    }
}

struct HyperLogLogPlus(hyperloglogplus::HyperLogLogPlus<u32, BuildHasherDefault<WyHash>>);

impl EstimatorTrait for HyperLogLogPlus {
    fn new() -> Self {
        Self(
            hyperloglogplus::HyperLogLogPlus::new(14, BuildHasherDefault::<WyHash>::default())
                .unwrap(),
        )
    }

    fn add(&mut self, addr: u32) {
        self.0.insert(&addr);
    }

    fn estimate(&mut self) -> usize {
        self.0.count() as usize
    }

    fn name() -> String {
        "hyperloglogplus".to_string()
    }
}
