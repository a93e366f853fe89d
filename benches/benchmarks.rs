/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sammy_par_rs::cards::field::{format_float, parse_float_text};
use sammy_par_rs::cards::resonance::{ResonanceCard, ResonanceEntry};
use sammy_par_rs::cards::VaryFlag;
use sammy_par_rs::parfile::ParameterFile;

fn sample_file(resonance_count: usize) -> ParameterFile {
    let resonances = (0..resonance_count)
        .map(|i| ResonanceEntry {
            resonance_energy: 100.0 + i as f64 * 12.5,
            capture_width: Some(0.5 + i as f64 * 1.0e-3),
            channel1_width: Some(2.0),
            channel2_width: None,
            channel3_width: None,
            vary_energy: VaryFlag::Yes,
            vary_capture: VaryFlag::No,
            vary_channel1: VaryFlag::Yes,
            vary_channel2: VaryFlag::No,
            vary_channel3: VaryFlag::No,
            igroup: (i % 7 + 1) as i32,
            x_value: None,
        })
        .collect();
    ParameterFile::new(ResonanceCard { resonances })
}

fn codec_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parameter File Codec");

    let file = sample_file(500);
    let text = file.to_string();

    group.bench_function("emit_500_resonances", |b| {
        b.iter(|| black_box(black_box(&file).to_string()))
    });

    group.bench_function("parse_500_resonances", |b| {
        b.iter(|| ParameterFile::from_string(black_box(&text)).unwrap())
    });

    group.finish();
}

fn field_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Field Formatting");

    group.bench_function("format_float", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(format_float(Some(black_box(i as f64 * 0.37 - 185.0)), 10));
            }
        })
    });

    group.bench_function("parse_float_text", |b| {
        b.iter(|| {
            black_box(parse_float_text(black_box("5.00000-5")));
            black_box(parse_float_text(black_box("1.2340E+00")));
            black_box(parse_float_text(black_box("1.5D+02")));
        })
    });

    group.finish();
}

criterion_group!(benches, codec_benchmark, field_benchmark);
criterion_main!(benches);
