mod common;
use common::*;

use strand::error::{TryRecvError, TrySendError};
use strand::{task, Channel};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn fifo_order_single_producer() {
  let ch = Channel::new(4, 4);
  let tx = ch.clone();
  let producer = task::spawn(move || {
    for v in 0..10i32 {
      tx.send(&encode(v)).unwrap();
    }
  })
  .unwrap();

  let mut buf = [0u8; 4];
  let mut received = Vec::new();
  for _ in 0..10 {
    ch.recv(&mut buf).unwrap();
    received.push(decode(&buf));
  }
  producer.join();
  assert_eq!(received, (0..10).collect::<Vec<_>>());
}

#[test]
fn fifo_order_survives_interleaving() {
  let ch = Channel::new(8, 4);
  let tx = ch.clone();
  let producer = task::spawn(move || {
    for v in 0..ITEMS_MEDIUM as i32 {
      tx.send(&encode(v)).unwrap();
      if v % 7 == 0 {
        std::thread::yield_now();
      }
    }
  })
  .unwrap();

  let mut buf = [0u8; 4];
  for expected in 0..ITEMS_MEDIUM as i32 {
    ch.recv(&mut buf).unwrap();
    assert_eq!(decode(&buf), expected);
    if expected % 13 == 0 {
      std::thread::yield_now();
    }
  }
  producer.join();
}

#[test]
fn send_blocks_on_full_ring_until_a_receive() {
  let ch = Channel::new(4, 4);
  for v in 1..=4i32 {
    ch.send(&encode(v)).unwrap();
  }

  let done = Arc::new(AtomicBool::new(false));
  let tx = ch.clone();
  let done_flag = done.clone();
  let sender = task::spawn(move || {
    tx.send(&encode(5)).unwrap();
    done_flag.store(true, Ordering::SeqCst);
  })
  .unwrap();

  // The fifth send must stay blocked while the ring is full.
  std::thread::sleep(SHORT_TIMEOUT);
  assert!(!done.load(Ordering::SeqCst));

  let mut buf = [0u8; 4];
  ch.recv(&mut buf).unwrap();
  assert_eq!(decode(&buf), 1);

  assert!(wait_until(LONG_TIMEOUT, || done.load(Ordering::SeqCst)));
  sender.join();

  for expected in 2..=5i32 {
    ch.recv(&mut buf).unwrap();
    assert_eq!(decode(&buf), expected);
  }
}

#[test]
fn try_send_reports_full_and_try_recv_reports_empty() {
  let ch = Channel::new(1, 4);
  let mut buf = [0u8; 4];
  assert_eq!(ch.try_recv(&mut buf), Err(TryRecvError::Empty));
  ch.try_send(&encode(9)).unwrap();
  assert_eq!(ch.try_send(&encode(10)), Err(TrySendError::Full));
  ch.try_recv(&mut buf).unwrap();
  assert_eq!(decode(&buf), 9);
  assert_eq!(ch.try_recv(&mut buf), Err(TryRecvError::Empty));
}

#[test]
fn introspection_tracks_ring_state() {
  let ch = Channel::new(2, 8);
  assert_eq!(ch.capacity(), 2);
  assert_eq!(ch.msg_len(), 8);
  assert!(ch.is_empty());
  assert!(!ch.is_full());
  assert_eq!(ch.len(), 0);

  ch.send(&[1u8; 8]).unwrap();
  assert_eq!(ch.len(), 1);
  ch.send(&[2u8; 8]).unwrap();
  assert!(ch.is_full());
  assert_eq!(ch.len(), 2);

  let mut buf = [0u8; 8];
  ch.recv(&mut buf).unwrap();
  assert_eq!(buf, [1u8; 8]);
  assert_eq!(ch.len(), 1);
}

#[test]
fn multi_producer_delivery_is_complete() {
  let ch = Channel::new(16, 4);
  let num_producers = 4;
  let total = num_producers * ITEMS_LOW;
  let sum = Arc::new(AtomicUsize::new(0));

  let mut producers = Vec::new();
  for _ in 0..num_producers {
    let tx = ch.clone();
    producers.push(
      task::spawn(move || {
        for v in 1..=ITEMS_LOW as i32 {
          tx.send(&encode(v)).unwrap();
        }
      })
      .unwrap(),
    );
  }

  let rx = ch.clone();
  let sum_clone = sum.clone();
  let consumer = task::spawn(move || {
    let mut buf = [0u8; 4];
    for _ in 0..total {
      rx.recv(&mut buf).unwrap();
      sum_clone.fetch_add(decode(&buf) as usize, Ordering::Relaxed);
    }
  })
  .unwrap();

  for producer in producers {
    producer.join();
  }
  consumer.join();

  let expected = num_producers * (ITEMS_LOW * (ITEMS_LOW + 1) / 2);
  assert_eq!(sum.load(Ordering::Relaxed), expected);
}
