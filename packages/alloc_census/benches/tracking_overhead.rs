//! Benchmarks to measure the compute overhead of `alloc_census` bookkeeping itself.
//!
//! The same allocate-and-free workload runs with no window open (the allocator only checks
//! a flag) and with a window open (every event updates the counters and the live map).

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use alloc_census::{Allocator, ContainerKind, measure};
use criterion::{Criterion, criterion_group, criterion_main};

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

criterion_group!(benches, entrypoint);
criterion_main!(benches);

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_census_overhead");

    group.bench_function("box_untracked", |b| {
        b.iter(|| {
            drop(black_box(Box::new(black_box(42_u64))));
        });
    });

    group.bench_function("box_tracked", |b| {
        ALLOCATOR.enable();

        b.iter(|| {
            drop(black_box(Box::new(black_box(42_u64))));
        });

        black_box(ALLOCATOR.disable());
    });

    group.bench_function("window_open_close", |b| {
        b.iter(|| {
            ALLOCATOR.enable();
            black_box(ALLOCATOR.disable());
        });
    });

    group.bench_function("measure_btree_map_256", |b| {
        b.iter(|| black_box(measure(&ALLOCATOR, ContainerKind::BTreeMap, 256)));
    });

    group.finish();
}
