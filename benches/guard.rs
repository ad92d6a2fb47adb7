use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fault_nom::{CombinedFailure, EatenKinds, Failure, FailureKind, FailureRecord, Guard};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
struct BenchFailure {
    kind: FailureKind,
}

impl BenchFailure {
    fn new(kind: FailureKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for BenchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bench failure of kind {}", self.kind)
    }
}

impl std::error::Error for BenchFailure {}

impl Failure for BenchFailure {
    fn kind(&self) -> FailureKind {
        self.kind.clone()
    }
}

fn absorbing_guard(threshold: usize) -> Guard<BenchFailure> {
    Guard::builder()
        .eating_all()
        .with_threshold(threshold)
        .with_escalate_action(|combined: CombinedFailure<BenchFailure>| {
            black_box(combined.len());
            Ok(())
        })
        .build()
        .unwrap()
}

/// Benchmark kind matching against the eaten selection
fn bench_kind_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("kind_matching");

    let deep = FailureKind::from_path("net::http::client::timeout");
    let shallow = EatenKinds::from(FailureKind::root("net"));
    let many: EatenKinds = (0..20)
        .map(|i| FailureKind::root("svc").child(format!("k{}", i)))
        .collect();

    group.bench_function("prefix_match", |b| {
        b.iter(|| black_box(&shallow).matches(black_box(&deep)))
    });

    group.bench_function("miss_many_entries", |b| {
        b.iter(|| black_box(&many).matches(black_box(&deep)))
    });

    group.bench_function("wildcard", |b| {
        let all = EatenKinds::all();
        b.iter(|| black_box(&all).matches(black_box(&deep)))
    });

    group.finish();
}

/// Benchmark single-threaded exit throughput
fn bench_single_threaded_exit(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");
    group.throughput(Throughput::Elements(1000));

    for threshold in [10usize, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("threshold", threshold),
            threshold,
            |b, &threshold| {
                let guard = absorbing_guard(threshold);
                let failure = BenchFailure::new(FailureKind::root("io"));
                b.iter(|| {
                    for _ in 0..1000 {
                        black_box(guard.exit(Some(failure.clone())));
                    }
                })
            },
        );
    }

    group.bench_function("pass_through", |b| {
        let guard = Guard::new(FailureKind::root("io"), 10).unwrap();
        let failure = BenchFailure::new(FailureKind::root("value"));
        b.iter(|| {
            for _ in 0..1000 {
                black_box(guard.exit(Some(failure.clone())));
            }
        })
    });

    group.bench_function("digesting", |b| {
        let guard = Guard::builder()
            .eating_all()
            .with_threshold(1000)
            .with_digest_window(Duration::ZERO)
            .with_digest_action(|record: FailureRecord<BenchFailure>| {
                black_box(record);
            })
            .build()
            .unwrap();
        let failure = BenchFailure::new(FailureKind::root("io"));
        b.iter(|| {
            for _ in 0..1000 {
                black_box(guard.exit(Some(failure.clone())));
            }
        })
    });

    group.finish();
}

/// Benchmark multi-threaded concurrent exit throughput
fn bench_concurrent_exit(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for num_threads in [2, 4, 8].iter() {
        group.throughput(Throughput::Elements((*num_threads as u64) * 1000));

        group.bench_with_input(
            BenchmarkId::new("shared_kind", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let guard = Arc::new(absorbing_guard(100));

                    let mut handles = vec![];
                    for _ in 0..num_threads {
                        let guard = Arc::clone(&guard);
                        let handle = std::thread::spawn(move || {
                            let failure = BenchFailure::new(FailureKind::root("io"));
                            for _ in 0..1000 {
                                black_box(guard.exit(Some(failure.clone())));
                            }
                        });
                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("kind_per_thread", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let guard = Arc::new(absorbing_guard(100));

                    let mut handles = vec![];
                    for i in 0..num_threads {
                        let guard = Arc::clone(&guard);
                        let handle = std::thread::spawn(move || {
                            // Each thread uses a different kind to avoid contention
                            let kind = FailureKind::root("worker").child(format!("w{}", i));
                            let failure = BenchFailure::new(kind);
                            for _ in 0..1000 {
                                black_box(guard.exit(Some(failure.clone())));
                            }
                        });
                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_kind_matching,
    bench_single_threaded_exit,
    bench_concurrent_exit,
);
criterion_main!(benches);
