//! 복사 엔진 처리율 벤치마크

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use transfer::copy::BoundedCopy;
use transfer::{DataSink, DataSource, TransferLimits, MIB};

fn bench_copy(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let size = 64 * MIB;

    let mut group = c.benchmark_group("bounded_copy");
    group.throughput(Throughput::Bytes(size));
    group.sample_size(10);

    for chunk_kib in [16usize, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk_kib), &chunk_kib, |b, &kib| {
            b.to_async(&rt).iter(|| async move {
                let mut source = DataSource::test_data(size);
                let mut sink = DataSink::discard();
                BoundedCopy::new(TransferLimits::unbounded())
                    .with_chunk_size(kib * 1024)
                    .run(&mut source, &mut sink, |_| {})
                    .await
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_copy);
criterion_main!(benches);
