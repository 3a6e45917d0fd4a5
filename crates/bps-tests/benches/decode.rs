use std::sync::Arc;

use bps_decoder::ResponseDecoder;
use bps_server::response::build_response;
use bps_tests::{encode_batches, sensor_names};
use bps_types::{choose_planes, Batch};
use bps_wire::frame::LENGTH_PREFIX_SIZE;
use bps_wire::CodecKind;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn response_frame(kind: CodecKind, count: usize, requested: u32) -> Vec<u8> {
    let batches: Vec<Arc<Batch>> = encode_batches(kind, 0.0, 256, count)
        .into_iter()
        .map(Arc::new)
        .collect();
    let message =
        build_response(&batches, &choose_planes(requested), kind.name(), &sensor_names()).unwrap();
    message[LENGTH_PREFIX_SIZE..].to_vec()
}

fn bench_decode_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_window");
    for kind in [CodecKind::Lz4, CodecKind::Zstd] {
        // 60 s at 10 Hz ≈ 3 batches; the full cache is 120.
        for count in [3usize, 120] {
            let frame = response_frame(kind, count, 12);
            group.throughput(Throughput::Bytes(frame.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(kind.name(), count),
                &frame,
                |b, frame| b.iter(|| ResponseDecoder::decode(frame).unwrap()),
            );
        }
    }
    group.finish();
}

fn bench_decode_precision(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_planes");
    for requested in [6u32, 10, 16] {
        let frame = response_frame(CodecKind::Lz4, 10, requested);
        group.bench_with_input(BenchmarkId::from_parameter(requested), &frame, |b, frame| {
            b.iter(|| ResponseDecoder::decode(frame).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode_window, bench_decode_precision);
criterion_main!(benches);
