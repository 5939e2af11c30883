mod common;
use common::*;

use strand::error::{TryRecvError, TrySendError};
use strand::{task, Channel};
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[test]
fn receiver_waits_for_the_sender() {
  let ch = Channel::new(0, 4);
  let delay = Duration::from_millis(50);

  let tx = ch.clone();
  let sender = task::spawn(move || {
    std::thread::sleep(delay);
    tx.send(&encode(12345)).unwrap();
  })
  .unwrap();

  let start = Instant::now();
  let mut buf = [0u8; 4];
  ch.recv(&mut buf).unwrap();
  assert!(start.elapsed() >= delay);
  assert_eq!(decode(&buf), 12345);
  sender.join();
}

#[test]
fn sender_waits_for_the_receiver() {
  let ch = Channel::new(0, 4);
  let delay = Duration::from_millis(50);

  let rx = ch.clone();
  let receiver = task::spawn(move || {
    std::thread::sleep(delay);
    let mut buf = [0u8; 4];
    rx.recv(&mut buf).unwrap();
    assert_eq!(decode(&buf), 6789);
  })
  .unwrap();

  let start = Instant::now();
  ch.send(&encode(6789)).unwrap();
  assert!(start.elapsed() >= delay);
  receiver.join();
}

#[test]
fn handshakes_preserve_send_order() {
  let ch = Channel::new(0, 4);
  let tx = ch.clone();
  let sender = task::spawn(move || {
    for v in 0..ITEMS_LOW as i32 {
      tx.send(&encode(v)).unwrap();
    }
  })
  .unwrap();

  let mut buf = [0u8; 4];
  for expected in 0..ITEMS_LOW as i32 {
    ch.recv(&mut buf).unwrap();
    assert_eq!(decode(&buf), expected);
  }
  sender.join();
}

#[test]
fn each_send_pairs_with_exactly_one_receive() {
  let ch = Channel::new(0, 4);
  let first = ch.clone();
  let second = ch.clone();
  let sender_a = task::spawn(move || first.send(&encode(10)).unwrap()).unwrap();
  let sender_b = task::spawn(move || second.send(&encode(20)).unwrap()).unwrap();

  let mut buf = [0u8; 4];
  let mut seen = HashSet::new();
  ch.recv(&mut buf).unwrap();
  seen.insert(decode(&buf));
  ch.recv(&mut buf).unwrap();
  seen.insert(decode(&buf));

  sender_a.join();
  sender_b.join();
  assert_eq!(seen, HashSet::from([10, 20]));
}

#[test]
fn rendezvous_buffers_nothing() {
  let ch = Channel::new(0, 4);
  assert_eq!(ch.capacity(), 0);
  assert_eq!(ch.len(), 0);
  assert!(ch.is_empty());
  assert!(ch.is_full());
}

#[test]
fn is_full_clears_while_a_receiver_is_parked() {
  let ch = Channel::new(0, 4);
  assert!(ch.is_full());

  let rx = ch.clone();
  let receiver = task::spawn(move || {
    let mut buf = [0u8; 4];
    rx.recv(&mut buf).unwrap();
    assert_eq!(decode(&buf), 77);
  })
  .unwrap();

  // Once the receiver parks at the barrier a send would not block.
  assert!(wait_until(LONG_TIMEOUT, || !ch.is_full()));
  ch.try_send(&encode(77)).unwrap();
  receiver.join();
}

#[test]
fn try_operations_need_a_parked_peer() {
  let ch = Channel::new(0, 4);
  let mut buf = [0u8; 4];
  assert_eq!(ch.try_send(&encode(1)), Err(TrySendError::Full));
  assert_eq!(ch.try_recv(&mut buf), Err(TryRecvError::Empty));

  let tx = ch.clone();
  let sender = task::spawn(move || tx.send(&encode(33)).unwrap()).unwrap();

  // Once the sender has parked at the barrier, try_recv completes the
  // handshake without blocking.
  assert!(wait_until(LONG_TIMEOUT, || ch.try_recv(&mut buf).is_ok()));
  assert_eq!(decode(&buf), 33);
  sender.join();
}
