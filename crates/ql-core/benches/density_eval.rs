//! Criterion benchmarks for the density and diagnostics hot paths.
//!
//! Datasets are synthetic so runs are deterministic and need no input files.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ql_config::ModelConfig;
use ql_core::{diagnose_draws, HierarchicalModel, LogDensity, Trial, TrialDataset};

fn synthetic_dataset(num_subjects: usize, num_trials: usize) -> TrialDataset {
    let trials = (0..num_subjects * num_trials)
        .map(|i| {
            let k = (i.wrapping_mul(2_654_435_761) & 0xffff) as i64;
            Trial::from_raw(k % 2, (k >> 1) % 2, (k >> 2) % 2, (k >> 3) % 4 + 1, (k >> 5) % 4 + 1)
                .expect("synthetic trial is valid")
        })
        .collect();
    TrialDataset::new(num_subjects, num_trials, trials).expect("shape matches")
}

fn position(num_subjects: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(6 + 3 * num_subjects);
    for (mean, sd_unif) in [(2.0, 0.3), (-0.5, 0.2), (1.0, 0.4)] {
        out.push(mean);
        out.push(sd_unif);
        out.extend((0..num_subjects).map(|s| ((s as f64) * 0.7).sin()));
    }
    out
}

fn bench_log_density(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_density");

    for &(subjects, trials) in &[(10usize, 100usize), (50, 200), (200, 300)] {
        let data = synthetic_dataset(subjects, trials);
        let theta = position(subjects);
        let label = format!("{subjects}x{trials}");

        for (mode, threshold) in [("sequential", 0usize), ("parallel", 1)] {
            let model = HierarchicalModel::new(
                data.clone(),
                ModelConfig::default().with_parallel_min_subjects(threshold),
            )
            .expect("default config is valid");
            group.bench_with_input(BenchmarkId::new(mode, &label), &theta, |b, theta| {
                b.iter(|| black_box(model.log_density(black_box(theta))));
            });
        }
    }

    group.finish();
}

fn bench_diagnostics(c: &mut Criterion) {
    let data = synthetic_dataset(50, 200);
    let model = HierarchicalModel::new(data, ModelConfig::default()).expect("valid config");
    let draws: Vec<Vec<f64>> = (0..32)
        .map(|i| {
            let mut theta = position(50);
            theta[0] += 0.01 * i as f64;
            theta
        })
        .collect();

    c.bench_function("diagnose_draws/50x200x32", |b| {
        b.iter(|| black_box(diagnose_draws(&model, black_box(&draws)).expect("valid draws")));
    });
}

criterion_group!(benches, bench_log_density, bench_diagnostics);
criterion_main!(benches);
