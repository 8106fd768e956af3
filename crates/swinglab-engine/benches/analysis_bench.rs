//! Performance benchmarks for the swing-analysis engine.
//!
//! Run with: cargo bench --package swinglab-engine
//!
//! Benchmarks cover:
//! - Phase classification at various sequence lengths
//! - Metrics computation over a classified swing
//! - The full analysis pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use swinglab_core::{Confidence, Keypoint, LandmarkType, PoseFrame};
use swinglab_engine::{AnalyzerConfig, MetricsCalculator, PhaseClassifier, SwingAnalyzer};

/// Deterministic full-body swing frames; same generator family as the
/// integration tests.
fn synthetic_swing(n: usize) -> Vec<PoseFrame> {
    let top = n * 2 / 5;
    let impact = top + (n - top) / 3;
    let c = Confidence::clamped(0.9);

    (0..n)
        .map(|i| {
            let (y, turn) = if i < n / 10 {
                (0.75_f32, 0.0_f32)
            } else if i <= top {
                let t = (i - n / 10) as f32 / (top - n / 10).max(1) as f32;
                (0.75 - 0.6 * t, 85.0 * t)
            } else if i <= impact {
                let t = (i - top) as f32 / (impact - top).max(1) as f32;
                (0.15 + 0.6 * t, 85.0 * (1.0 - t))
            } else {
                let t = (i - impact) as f32 / (n - 1 - impact).max(1) as f32;
                (0.75 - 0.45 * t, -30.0 * t)
            };

            let s_rad = turn.to_radians();
            let h_rad = (turn / 2.0).to_radians();
            let mut frame = PoseFrame::new(i as u64, i as f64 * 33.3);
            frame.set_keypoint(Keypoint::new_3d(LandmarkType::Nose, 0.5, 0.2, 0.0, c));
            frame.set_keypoint(Keypoint::new_3d(
                LandmarkType::LeftShoulder,
                0.5 + 0.12 * s_rad.cos(),
                0.35,
                0.12 * s_rad.sin(),
                c,
            ));
            frame.set_keypoint(Keypoint::new_3d(
                LandmarkType::RightShoulder,
                0.5 - 0.12 * s_rad.cos(),
                0.35,
                -0.12 * s_rad.sin(),
                c,
            ));
            frame.set_keypoint(Keypoint::new_3d(LandmarkType::LeftWrist, 0.51, y, 0.0, c));
            frame.set_keypoint(Keypoint::new_3d(LandmarkType::RightWrist, 0.49, y, 0.0, c));
            frame.set_keypoint(Keypoint::new_3d(
                LandmarkType::LeftHip,
                0.5 + 0.09 * h_rad.cos(),
                0.55,
                0.09 * h_rad.sin(),
                c,
            ));
            frame.set_keypoint(Keypoint::new_3d(
                LandmarkType::RightHip,
                0.5 - 0.09 * h_rad.cos(),
                0.55,
                -0.09 * h_rad.sin(),
                c,
            ));
            frame.set_keypoint(Keypoint::new_3d(LandmarkType::LeftKnee, 0.54, 0.72, 0.0, c));
            frame.set_keypoint(Keypoint::new_3d(LandmarkType::RightKnee, 0.46, 0.72, 0.0, c));
            frame.set_keypoint(Keypoint::new_3d(LandmarkType::LeftAnkle, 0.56, 0.9, 0.0, c));
            frame.set_keypoint(Keypoint::new_3d(LandmarkType::RightAnkle, 0.44, 0.9, 0.0, c));
            frame
        })
        .collect()
}

fn bench_phase_classification(c: &mut Criterion) {
    let classifier = PhaseClassifier::default_config();
    let mut group = c.benchmark_group("phase_classification");

    for n in [60, 120, 300] {
        let frames = synthetic_swing(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &frames, |b, frames| {
            b.iter(|| classifier.classify(black_box(frames)).unwrap());
        });
    }
    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let classifier = PhaseClassifier::default_config();
    let calculator = MetricsCalculator::default_config();
    let frames = synthetic_swing(120);
    let phases = classifier.classify(&frames).unwrap();

    c.bench_function("metrics_120_frames", |b| {
        b.iter(|| calculator.compute(black_box(&frames), black_box(&phases)));
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let analyzer = SwingAnalyzer::new(AnalyzerConfig::default());
    let frames = synthetic_swing(120);

    c.bench_function("full_pipeline_120_frames", |b| {
        b.iter(|| analyzer.analyze(black_box(&frames)));
    });
}

criterion_group!(
    benches,
    bench_phase_classification,
    bench_metrics,
    bench_full_pipeline
);
criterion_main!(benches);
