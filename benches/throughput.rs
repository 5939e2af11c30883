//! Throughput benchmarks for the buffered hot path and the rendezvous
//! handshake.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::thread;
use strand::Channel;

fn bench_buffered_ring(c: &mut Criterion) {
  let mut group = c.benchmark_group("buffered_ring");

  for capacity in [16usize, 256].iter() {
    group.throughput(Throughput::Elements(*capacity as u64));
    group.bench_with_input(
      BenchmarkId::from_parameter(capacity),
      capacity,
      |b, &capacity| {
        let ch = Channel::new(capacity, 8);
        let msg = [7u8; 8];
        let mut out = [0u8; 8];
        b.iter(|| {
          for _ in 0..capacity {
            ch.send(black_box(&msg)).unwrap();
          }
          for _ in 0..capacity {
            ch.recv(black_box(&mut out)).unwrap();
          }
        });
      },
    );
  }

  group.finish();
}

fn bench_cross_thread_pipe(c: &mut Criterion) {
  let mut group = c.benchmark_group("cross_thread_pipe");
  let items = 1_000usize;
  group.throughput(Throughput::Elements(items as u64));

  group.bench_function("buffered_64", |b| {
    b.iter(|| {
      let ch = Channel::new(64, 8);
      let tx = ch.clone();
      let producer = thread::spawn(move || {
        let msg = [1u8; 8];
        for _ in 0..items {
          tx.send(&msg).unwrap();
        }
      });
      let mut out = [0u8; 8];
      for _ in 0..items {
        ch.recv(&mut out).unwrap();
      }
      producer.join().unwrap();
    });
  });

  group.bench_function("rendezvous", |b| {
    b.iter(|| {
      let ch = Channel::new(0, 8);
      let tx = ch.clone();
      let producer = thread::spawn(move || {
        let msg = [1u8; 8];
        for _ in 0..items {
          tx.send(&msg).unwrap();
        }
      });
      let mut out = [0u8; 8];
      for _ in 0..items {
        ch.recv(&mut out).unwrap();
      }
      producer.join().unwrap();
    });
  });

  group.finish();
}

criterion_group!(benches, bench_buffered_ring, bench_cross_thread_pipe);
criterion_main!(benches);
