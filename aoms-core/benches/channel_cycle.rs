use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use aoms_core::{
    detect::detect_peaks,
    sensor::TemperatureCalibration,
    Channel, ChannelSettings, DedupConfig, DedupGuard, HealthThresholds, Sensor, SensorKind, SpectrumScan,
};

const START_NM: f64 = 1510.0;
const STEP_NM: f64 = 0.005;
const SAMPLES: usize = 16_000;

fn channel(sensors: usize) -> Channel {
    let mut channel = Channel::new(1, "FBG-BENCH", true, 0);
    channel.set_sensors(
        (0..sensors)
            .map(|i| {
                let centre = 1515.0 + i as f64 * 2.5;
                let mut sensor = Sensor::new(i as u32 + 1, i as u64, 1, SensorKind::Temperature);
                sensor.apply_temperature_calibration(TemperatureCalibration {
                    lambda_a: 1.0,
                    lambda_b: centre,
                    g1: 0.8,
                    g2: 95.0,
                    constant: 0.0,
                    t0: 22.0,
                    offset: 0.0,
                    lower_bound: centre - 1.0,
                    upper_bound: centre + 1.0,
                });
                sensor
            })
            .collect(),
    );
    channel
}

fn sweep(sensors: usize) -> SpectrumScan {
    let wavelengths: Vec<f64> = (0..SAMPLES).map(|i| START_NM + i as f64 * STEP_NM).collect();
    let power = wavelengths
        .iter()
        .map(|&w| {
            let linear: f64 = (0..sensors)
                .map(|i| {
                    let d = w - (1515.1 + i as f64 * 2.5);
                    0.1 * (-d * d / 0.005).exp()
                })
                .sum();
            10.0 * (linear + 1e-7).log10()
        })
        .collect();
    SpectrumScan::new(wavelengths, power).unwrap()
}

fn bench_cycle(c: &mut Criterion) {
    let thresholds = HealthThresholds::default();
    let settings = ChannelSettings::default();
    let mut group = c.benchmark_group("channel_cycle");

    for sensors in [4, 16, 32] {
        let mut ch = channel(sensors);
        let scan = sweep(sensors);

        group.bench_with_input(BenchmarkId::new("full", sensors), &scan, |b, scan| {
            b.iter(|| {
                let peaks = detect_peaks(black_box(scan), &settings);
                ch.assign_wavelengths(&peaks);
                ch.update_spectrum(scan);
                ch.calc_measurement();
                ch.update_health(scan.power_dbm(), &thresholds)
            })
        });

        let peaks = detect_peaks(&scan, &settings);
        group.bench_with_input(BenchmarkId::new("assign", sensors), &peaks, |b, peaks| {
            b.iter(|| ch.assign_wavelengths(black_box(peaks)))
        });
    }

    group.finish();
}

fn bench_dedup(c: &mut Criterion) {
    let guard = DedupGuard::new(DedupConfig::default());
    let devices: Vec<String> = (0..1024).map(|i| format!("70b3d57ed000{i:04x}")).collect();
    let mut fcnt = 0u32;

    c.bench_function("dedup_is_duplicate", |b| {
        b.iter(|| {
            fcnt = fcnt.wrapping_add(1);
            let device = &devices[fcnt as usize % devices.len()];
            guard.is_duplicate(black_box(device), fcnt)
        })
    });
}

criterion_group!(benches, bench_cycle, bench_dedup);
criterion_main!(benches);
