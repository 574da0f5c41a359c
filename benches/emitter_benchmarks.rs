//! Criterion benchmarks for log_emitter

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use log_emitter::prelude::*;
use std::sync::Arc;
use std::thread;

struct NullSink;

impl Sink for NullSink {
    fn accept(&self, bytes: &[u8]) -> log_emitter::Result<()> {
        black_box(bytes);
        Ok(())
    }

    fn flush(&self) -> log_emitter::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn sample_context() -> LogContext {
    LogContext::new()
        .with_field("user_id", 12345)
        .with_field("action", "login")
        .with_field("latency_ms", 12.5)
        .with_field("success", true)
}

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");
    group.throughput(Throughput::Elements(1));

    let encoder = JsonEncoder::new();
    let bare = Record::new(LogLevel::Info, "Simple message", LogContext::new());
    let rich = Record::new(LogLevel::Error, "disk full", sample_context());

    group.bench_function("no_context", |b| {
        b.iter(|| black_box(encoder.encode(black_box(&bare))));
    });

    group.bench_function("four_fields", |b| {
        b.iter(|| black_box(encoder.encode(black_box(&rich))));
    });

    let unix = JsonEncoder::new().with_timestamp_format(TimestampFormat::UnixMicros);
    group.bench_function("unix_timestamp", |b| {
        b.iter(|| black_box(unix.encode(black_box(&rich))));
    });

    group.finish();
}

// ============================================================================
// Emitting Benchmarks
// ============================================================================

fn bench_emitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("emitting");
    group.throughput(Throughput::Elements(1));

    let emitter = Emitter::builder()
        .min_level(LogLevel::Warning)
        .sink(NullSink)
        .build()
        .expect("Failed to build emitter");

    group.bench_function("filtered", |b| {
        b.iter(|| emitter.debug(black_box("Filtered message")));
    });

    group.bench_function("filtered_macro", |b| {
        b.iter(|| log_emitter::debug!(emitter, "Filtered {}", black_box(42)));
    });

    group.bench_function("accepted_null_sink", |b| {
        b.iter(|| emitter.error_with(black_box("disk full"), sample_context()));
    });

    group.finish();
}

fn bench_file_sink(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_sink");
    group.throughput(Throughput::Elements(1));

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    for auto_flush in [true, false] {
        let emitter = Emitter::builder()
            .rotating_file(
                temp_dir.path().join(format!("bench_{}.log", auto_flush)),
                RotationPolicy::new()
                    .with_max_size(4 * 1024 * 1024)
                    .with_max_backups(1)
                    .with_auto_flush(auto_flush),
            )
            .build()
            .expect("Failed to build emitter");

        group.bench_with_input(
            BenchmarkId::new("auto_flush", auto_flush),
            &emitter,
            |b, emitter| {
                b.iter(|| emitter.info_with(black_box("Benchmark message"), sample_context()));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Concurrent Benchmarks
// ============================================================================

fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for threads in [2usize, 4, 8] {
        let per_thread = 100;
        group.throughput(Throughput::Elements((threads * per_thread) as u64));

        let emitter = Arc::new(
            Emitter::builder()
                .sink(NullSink)
                .build()
                .expect("Failed to build emitter"),
        );

        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let emitter = Arc::clone(&emitter);
                        thread::spawn(move || {
                            for i in 0..per_thread {
                                emitter.info_with(
                                    "concurrent",
                                    LogContext::new().with_field("thread", t).with_field("seq", i),
                                );
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encoding,
    bench_emitting,
    bench_file_sink,
    bench_concurrent
);
criterion_main!(benches);
