use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dustspec::aggregate::{aggregate, AggregationPolicy, Reduction};
use dustspec::clock::{self, duration_from_secs};
use dustspec::loader::{LoadError, SolSource};
use dustspec::pipeline::{CaseId, Pipeline, PipelineConfig, Statistic};
use dustspec::series::{PressureSample, PressureSeries};
use dustspec::smoothing::smooth;
use dustspec::spectral::{spectrum_of, SpectralKind};
use std::f64::consts::PI;

/// A sol of 2 Hz samples with a drift and two oscillations.
fn synthetic_sol(sol: u32, hours: f64) -> PressureSeries {
    let start = clock::sol_start(sol) + duration_from_secs(11.0 * 3600.0);
    let n = (hours * 3600.0 * 2.0) as usize;
    let samples = (0..n)
        .map(|i| {
            let t = i as f64 * 0.5;
            let pressure = 705.0 + 1e-4 * t + 0.4 * (2.0 * PI * 0.03 * t).sin() + 0.1 * (2.0 * PI * 0.4 * t).cos();
            PressureSample::new(start + duration_from_secs(t), clock::ltst_prefix(sol), pressure)
        })
        .collect();
    PressureSeries::from_samples(samples)
}

struct SingleSol(PressureSeries, u32);

impl SolSource for SingleSol {
    fn load_sol(&self, sol: u32) -> Result<Option<PressureSeries>, LoadError> {
        Ok((sol == self.1).then(|| self.0.clone()))
    }
}

/// Benchmark the periodogram over growing window lengths
fn bench_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("spectrum");

    for n in [600, 1200, 4800] {
        let elapsed: Vec<f64> = (0..n).map(|i| i as f64 * 0.5).collect();
        let values: Vec<f64> = elapsed.iter().map(|t| (2.0 * PI * 0.1 * t).sin()).collect();
        group.throughput(Throughput::Elements(n as u64));

        for kind in [SpectralKind::Power, SpectralKind::Amplitude] {
            group.bench_with_input(BenchmarkId::new(kind.label(), n), &n, |b, _| {
                b.iter(|| black_box(spectrum_of(black_box(&elapsed), black_box(&values), kind).unwrap()));
            });
        }
    }

    group.finish();
}

/// Benchmark log-space smoothing over window sizes
fn bench_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoothing");

    let n = 2400;
    let frequency: Vec<f64> = (0..n).map(|i| i as f64 * 1e-3).collect();
    let magnitude: Vec<f64> = (1..=n).map(|i| 1.0 / i as f64).collect();

    for window in [5, 11, 51] {
        group.bench_with_input(BenchmarkId::from_parameter(window), &window, |b, &window| {
            b.iter(|| black_box(smooth(&frequency, &magnitude, window).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark case aggregation across population sizes
fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for cases in [50, 500] {
        let arrays: Vec<Vec<f64>> = (0..cases)
            .map(|k| (0..600 - k % 7).map(|i| ((i * 31 + k) % 97) as f64).collect())
            .collect();
        group.throughput(Throughput::Elements(cases as u64));

        group.bench_with_input(BenchmarkId::new("nanmedian", cases), &cases, |b, _| {
            b.iter(|| {
                black_box(aggregate(&arrays, AggregationPolicy::TruncateToShortest, Reduction::NanMedian).unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark one full case from window selection to corrected ratio
fn bench_run_case(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_case");

    let source = SingleSol(synthetic_sol(300, 2.0), 300);
    for statistic in [Statistic::Ratio, Statistic::CorrectedRatio] {
        let config = PipelineConfig {
            statistic,
            resample: Some(0.5),
            ..Default::default()
        };
        let pipeline = Pipeline::new(None, &source, config);
        let case = CaseId::QuietSol { sol: 300, hour: 12 };

        group.bench_function(statistic.label(), |b| {
            b.iter(|| black_box(pipeline.run_case(black_box(case)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spectrum, bench_smoothing, bench_aggregate, bench_run_case);
criterion_main!(benches);
