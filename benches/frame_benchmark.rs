use criterion::{black_box, criterion_group, criterion_main, Criterion};
use opentherm_rs::{DataId, Frame, MessageType};

fn benchmark_build_frame(c: &mut Criterion) {
    c.bench_function("build_frame", |b| {
        b.iter(|| {
            let frame = Frame::build(
                black_box(MessageType::WriteData),
                black_box(DataId::TSet),
                black_box(0x3200),
            );
            black_box(frame)
        })
    });
}

fn benchmark_validate_frame(c: &mut Criterion) {
    let frame = Frame::from_raw(0x4019_2800);
    c.bench_function("validate_frame", |b| {
        b.iter(|| black_box(frame).is_valid_response())
    });
}

fn benchmark_decode_fields(c: &mut Criterion) {
    let frame = Frame::from_raw(0x4019_2800);
    c.bench_function("decode_fields", |b| {
        b.iter(|| {
            let f = black_box(frame);
            black_box((f.msg_type(), f.data_id(), f.f88()))
        })
    });
}

criterion_group!(
    benches,
    benchmark_build_frame,
    benchmark_validate_frame,
    benchmark_decode_fields
);
criterion_main!(benches);
