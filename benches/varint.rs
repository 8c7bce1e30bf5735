use compactcode::varint::{decode_varint64, encode_varint, zigzag_decode_64, zigzag_encode_64};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const COUNT: usize = 10_000;

fn inputs() -> Vec<(&'static str, Vec<i64>)> {
    vec![
        ("small", (0..COUNT as i64).map(|i| i % 64 - 32).collect()),
        ("medium", (0..COUNT as i64).map(|i| i * 7_919).collect()),
        (
            "large",
            (0..COUNT as i64).map(|i| i.wrapping_mul(0x0123_4567_89ab_cdef)).collect(),
        ),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint_encode");
    group.throughput(Throughput::Elements(COUNT as u64));

    for (label, values) in inputs() {
        group.bench_with_input(BenchmarkId::from_parameter(label), &values, |b, values| {
            let mut out = Vec::with_capacity(COUNT * 10);
            b.iter(|| {
                out.clear();
                for &v in values {
                    encode_varint(zigzag_encode_64(black_box(v)), &mut out);
                }
                black_box(out.len())
            });
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint_decode");
    group.throughput(Throughput::Elements(COUNT as u64));

    for (label, values) in inputs() {
        let mut encoded = Vec::new();
        for &v in &values {
            encode_varint(zigzag_encode_64(v), &mut encoded);
        }

        group.bench_with_input(BenchmarkId::from_parameter(label), &encoded, |b, encoded| {
            b.iter(|| {
                let mut pos = 0;
                let mut sum = 0i64;
                while pos < encoded.len() {
                    let (raw, used) = decode_varint64(&encoded[pos..]).unwrap();
                    sum = sum.wrapping_add(zigzag_decode_64(raw));
                    pos += used;
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
