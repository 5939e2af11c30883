// src/task.rs

//! Thread collaborators: spawn a task, optionally join it, sleep.
//!
//! The channel engine never depends on how tasks are scheduled; these
//! helpers exist so applications built on channels need no other threading
//! surface. Every task is a real OS thread.

use std::io;
use std::thread;
use std::time::Duration;

/// A joinable handle to a spawned task.
///
/// Dropping the handle detaches the task; joining is optional, and the same
/// effect can always be had with a channel.
#[derive(Debug)]
pub struct Task {
  handle: thread::JoinHandle<()>,
}

impl Task {
  /// Waits for the task to finish. A panicked task is treated as finished;
  /// its payload is discarded.
  pub fn join(self) {
    let _ = self.handle.join();
  }
}

/// Launches `f` on a fresh OS thread.
///
/// Thread creation can fail when the host is out of threads; the error is
/// returned rather than panicking, and callers that ignore it simply lose
/// the task.
pub fn spawn<F>(f: F) -> io::Result<Task>
where
  F: FnOnce() + Send + 'static,
{
  thread::Builder::new()
    .spawn(f)
    .map(|handle| Task { handle })
}

/// Suspends the calling task for `ms` milliseconds.
pub fn sleep_ms(ms: u64) {
  thread::sleep(Duration::from_millis(ms));
}
