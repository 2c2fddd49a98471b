//! Registry fetch benchmarks.
//!
//! Measures the cost of fetching an already bound port (hot path after
//! start-up) and the contended case with several threads.

use criterion::{Criterion, criterion_group, criterion_main};
use semi_common::registry::{Kind, Member, Registry, Resource};
use std::fmt;
use std::hint::black_box;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BenchKind;

impl fmt::Display for BenchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bench")
    }
}

impl Kind for BenchKind {}

struct Dummy(#[allow(dead_code)] u32);

#[derive(Clone)]
struct Base(Arc<Dummy>);

impl Resource for Base {
    type Kind = BenchKind;

    fn kind(&self) -> BenchKind {
        BenchKind
    }
}

impl Member<Base> for Dummy {
    const KIND: BenchKind = BenchKind;

    fn into_base(this: Arc<Self>) -> Base {
        Base(this)
    }

    fn from_base(base: &Base) -> Option<Arc<Self>> {
        Some(Arc::clone(&base.0))
    }
}

fn bench_fetch_existing(c: &mut Criterion) {
    let reg: Registry<u32, Base> = Registry::new();
    for port in 0..20 {
        reg.fetch(port, || Ok(Dummy(port))).unwrap();
    }

    c.bench_function("registry_fetch_existing", |b| {
        b.iter(|| {
            let d = reg.fetch(black_box(7), || Ok(Dummy(7))).unwrap();
            black_box(d);
        });
    });
}

fn bench_fetch_contended(c: &mut Criterion) {
    let reg: Registry<u32, Base> = Registry::new();
    for port in 0..20 {
        reg.fetch(port, || Ok(Dummy(port))).unwrap();
    }

    c.bench_function("registry_fetch_contended_4_threads", |b| {
        b.iter(|| {
            std::thread::scope(|s| {
                for t in 0..4u32 {
                    let reg = &reg;
                    s.spawn(move || {
                        for i in 0..100u32 {
                            let port = (t * 5 + i) % 20;
                            black_box(reg.fetch(port, || Ok(Dummy(port))).unwrap());
                        }
                    });
                }
            });
        });
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let reg: Registry<u32, Base> = Registry::new();
    for port in 0..20 {
        reg.fetch(port, || Ok(Dummy(port))).unwrap();
    }

    c.bench_function("registry_snapshot_20", |b| {
        b.iter(|| black_box(reg.snapshot()));
    });
}

criterion_group!(
    benches,
    bench_fetch_existing,
    bench_fetch_contended,
    bench_snapshot
);
criterion_main!(benches);
