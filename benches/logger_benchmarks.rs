//! Criterion benchmarks for rust_fanout_logger

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_fanout_logger::core::render::{render_json, render_text};
use rust_fanout_logger::prelude::*;
use std::io::{self, Sink};
use std::sync::Arc;

fn sink_destination(flags: Flags, kind: FormatKind) -> WriterDestination<Sink> {
    match kind {
        FormatKind::Json => WriterDestination::json(io::sink(), flags, true),
        _ => WriterDestination::text(io::sink(), flags, true),
    }
}

fn sample_entry() -> LogEntry {
    LogEntry::new(LogLevel::Info, "request handled")
        .with_prefixes(Arc::from(vec!["api".to_string(), "v2".to_string()]))
        .with_fields(Arc::new(
            Fields::new()
                .with("status", 200)
                .with("path", "/users/42")
                .with("elapsed_ms", 3.5),
        ))
}

// ============================================================================
// Rendering Benchmarks
// ============================================================================

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    group.throughput(Throughput::Elements(1));

    let entry = sample_entry();
    let flags = Flags::STD;
    let mut buf = Vec::with_capacity(256);

    group.bench_function("text", |b| {
        b.iter(|| {
            buf.clear();
            render_text(&mut buf, black_box(&entry), flags).unwrap();
        });
    });

    group.bench_function("json", |b| {
        b.iter(|| {
            buf.clear();
            render_json(&mut buf, black_box(&entry), flags).unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_blocking_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocking_logging");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .blocking(true)
        .destination(sink_destination(Flags::STD, FormatKind::Text))
        .build()
        .unwrap();

    group.bench_function("info", |b| {
        b.iter(|| {
            logger.info(black_box("Info message")).unwrap();
        });
    });

    group.bench_function("filtered_debug", |b| {
        b.iter(|| {
            logger.debug(black_box("Debug message")).unwrap();
        });
    });

    group.finish();
    logger.close().unwrap();
}

fn bench_non_blocking_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("non_blocking_logging");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .queue_capacity(4096)
        .destination(sink_destination(Flags::STD, FormatKind::Text))
        .build()
        .unwrap();

    group.bench_function("info", |b| {
        b.iter(|| {
            logger.info(black_box("Info message")).unwrap();
        });
    });

    group.finish();
    logger.close().unwrap();
}

// ============================================================================
// Fan-out Benchmarks
// ============================================================================

/// Same flags everywhere share one rendering; distinct flags render once each
fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");
    group.throughput(Throughput::Elements(1));

    for count in [1usize, 4, 16] {
        let shared = (0..count).fold(Logger::builder().blocking(true), |b, _| {
            b.destination(sink_destination(Flags::STD, FormatKind::Text))
        });
        let shared = shared.build().unwrap();

        group.bench_with_input(BenchmarkId::new("shared_flags", count), &count, |b, _| {
            b.iter(|| shared.info(black_box("fan out")).unwrap());
        });

        let distinct = (0..count).fold(Logger::builder().blocking(true), |b, i| {
            let kind = if i % 2 == 0 { FormatKind::Text } else { FormatKind::Json };
            let flags = Flags::from_bits(Flags::STD.bits() | ((i as u16 / 2) & 1) << 1);
            b.destination(sink_destination(flags, kind))
        });
        let distinct = distinct.build().unwrap();

        group.bench_with_input(BenchmarkId::new("distinct_flags", count), &count, |b, _| {
            b.iter(|| distinct.info(black_box("fan out")).unwrap());
        });

        shared.close().unwrap();
        distinct.close().unwrap();
    }

    group.finish();
}

// ============================================================================
// Concurrency Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * 100) as u64));
        let logger = Logger::builder()
            .queue_capacity(1024)
            .destination(sink_destination(Flags::STD, FormatKind::Text))
            .build()
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let logger = logger.clone();
                        std::thread::spawn(move || {
                            for i in 0..100 {
                                logger.info(format!("message {}", i)).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
                logger.blocking().info("barrier").unwrap();
            });
        });

        logger.close().unwrap();
    }

    group.finish();
}

// ============================================================================
// Record Benchmarks
// ============================================================================

fn bench_log_entry_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_entry_creation");
    group.throughput(Throughput::Elements(1));

    let prefixes: Arc<[String]> = Arc::from(vec!["api".to_string()]);
    let fields = Arc::new(Fields::new().with("user_id", 42));

    group.bench_function("simple", |b| {
        b.iter(|| black_box(LogEntry::new(LogLevel::Info, black_box("Simple message"))));
    });

    group.bench_function("with_context", |b| {
        b.iter(|| {
            black_box(
                LogEntry::new(LogLevel::Info, black_box("Context message"))
                    .with_prefixes(Arc::clone(&prefixes))
                    .with_fields(Arc::clone(&fields)),
            )
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_rendering,
    bench_blocking_logging,
    bench_non_blocking_logging,
    bench_fanout,
    bench_concurrent_logging,
    bench_log_entry_creation,
);

criterion_main!(benches);
