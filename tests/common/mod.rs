#![allow(dead_code)]

use std::time::{Duration, Instant};

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(300);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(3);
pub const ITEMS_LOW: usize = 50;
pub const ITEMS_MEDIUM: usize = 200;
pub const ITEMS_HIGH: usize = 1000;

pub fn encode(v: i32) -> [u8; 4] {
  v.to_le_bytes()
}

pub fn decode(buf: &[u8]) -> i32 {
  i32::from_le_bytes(buf.try_into().unwrap())
}

/// Polls `cond` until it holds or `deadline` elapses; returns its final value.
pub fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
  let start = Instant::now();
  while start.elapsed() < deadline {
    if cond() {
      return true;
    }
    std::thread::sleep(Duration::from_millis(5));
  }
  cond()
}
