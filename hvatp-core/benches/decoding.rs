use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hvatp_core::config::VisualConfig;
use hvatp_core::rs_code::RsCodec;
use hvatp_core::visual::VisualEncoder;

fn benchmark_rs_decode_clean(c: &mut Criterion) {
    let codec = RsCodec::new();
    let data = vec![0x5Au8; 1400];
    let encoded = codec.encode(&data, 490);

    c.bench_function("rs_decode_clean_1400_bytes", |b| {
        b.iter(|| codec.decode(black_box(&encoded), black_box(1400), black_box(490)))
    });
}

fn benchmark_rs_decode_with_errors(c: &mut Criterion) {
    let codec = RsCodec::new();
    let data = vec![0x5Au8; 1400];
    let mut encoded = codec.encode(&data, 490);
    for i in (0..encoded.len()).step_by(37) {
        encoded[i] ^= 0xFF;
    }

    c.bench_function("rs_decode_with_scattered_errors", |b| {
        b.iter(|| codec.decode(black_box(&encoded), black_box(1400), black_box(490)))
    });
}

fn benchmark_module_sampling(c: &mut Criterion) {
    let config = VisualConfig::default();
    let encoder = VisualEncoder::new(config);
    let payload = b"Hello, HVATP! ".repeat(100);
    let raster = encoder.encode_frame(&payload, 0, 1).unwrap();

    c.bench_function("modules_to_bytes_full_frame", |b| {
        b.iter(|| {
            hvatp_core::visual::sampler::modules_to_bytes(
                black_box(&raster),
                black_box(config.module_count),
                black_box(config.mode),
                black_box(false),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_rs_decode_clean,
    benchmark_rs_decode_with_errors,
    benchmark_module_sampling
);
criterion_main!(benches);
