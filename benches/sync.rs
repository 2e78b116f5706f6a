//! Bounded queue throughput under a single producer / single consumer pair.
//!
//! Run with: cargo bench --bench sync

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::thread;

use strand::sync::BoundedQueue;

const CAPACITY: usize = 1024;
const MESSAGES: usize = 10_000;

fn put_get_roundtrip(c: &mut Criterion) {
    c.bench_function("bounded_queue_put_get_roundtrip", |b| {
        b.iter(|| {
            let queue = Arc::new(BoundedQueue::new(CAPACITY).unwrap());

            let producer = {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..MESSAGES {
                        queue.put(i.to_string()).unwrap();
                    }
                })
            };

            for _ in 0..MESSAGES {
                black_box(queue.get().unwrap());
            }
            producer.join().unwrap();
        });
    });
}

criterion_group!(benches, put_get_roundtrip);
criterion_main!(benches);
