//! Benchmarks for the concurrent context-vector collection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ctxvec::ContextVectorCollection;
use std::sync::Arc;
use std::thread;

fn bench_add_term_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_term_sequential");
    for &terms in &[16usize, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(terms), &terms, |bencher, &terms| {
            bencher.iter(|| {
                let coll: ContextVectorCollection<u32> = ContextVectorCollection::new(true);
                for t in 0..terms as u32 {
                    black_box(coll.add_term(&0u32, &t, 1.0));
                }
            });
        });
    }
    group.finish();
}

fn bench_add_term_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_term_concurrent");
    for &threads in &[2usize, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |bencher, &threads| {
                bencher.iter(|| {
                    let coll: Arc<ContextVectorCollection<u32>> =
                        Arc::new(ContextVectorCollection::new(true));
                    let handles: Vec<_> = (0..threads)
                        .map(|i| {
                            let coll = Arc::clone(&coll);
                            thread::spawn(move || {
                                for t in 0..64u32 {
                                    coll.add_term(&(i as u32), &t, 1.0);
                                }
                            })
                        })
                        .collect();
                    for h in handles {
                        h.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_add_term_sequential, bench_add_term_concurrent);
criterion_main!(benches);
