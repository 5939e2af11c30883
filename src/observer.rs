// src/observer.rs

//! Wake-handles and the per-channel observer registry.
//!
//! A selector owns one `WakeHandle` for the duration of a `select` call and
//! registers it on every candidate channel. Any state-changing operation on
//! a channel broadcasts to the registered handles, so a blocked selector is
//! woken whenever one of its candidates may have become ready.
//!
//! The registry keeps its own lock, distinct from the channel's data lock.
//! The permitted lock order is selector → channel-data and channel-data →
//! channel-observers; a selector never takes a channel lock while holding
//! its handle's lock, so the order cannot invert.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// One selector's private mutex/condvar pair.
///
/// `notify` records the wakeup in a flag before signaling, and `wait` blocks
/// only while the flag is unset. A selector clears the flag with `prepare`
/// before each readiness scan, so a notification landing between the scan
/// and the wait is never lost.
pub(crate) struct WakeHandle {
  notified: Mutex<bool>,
  cond: Condvar,
}

impl WakeHandle {
  pub(crate) fn new() -> Self {
    WakeHandle {
      notified: Mutex::new(false),
      cond: Condvar::new(),
    }
  }

  /// Clears the notification flag. Call before scanning candidates.
  pub(crate) fn prepare(&self) {
    *self.notified.lock() = false;
  }

  /// Blocks until notified at some point after the last `prepare`.
  /// Spurious returns are harmless; callers re-scan in a loop.
  pub(crate) fn wait(&self) {
    let mut notified = self.notified.lock();
    while !*notified {
      self.cond.wait(&mut notified);
    }
  }

  pub(crate) fn notify(&self) {
    let mut notified = self.notified.lock();
    *notified = true;
    self.cond.notify_one();
  }
}

/// The multiset of wake-handles currently observing one channel.
///
/// Two selectors over the same channel register two entries; one selector
/// listing the same channel twice also registers two entries. Removal is by
/// handle identity and takes out one occurrence.
pub(crate) struct ObserverRegistry {
  observers: Mutex<Vec<Arc<WakeHandle>>>,
}

impl ObserverRegistry {
  pub(crate) fn new() -> Self {
    ObserverRegistry {
      observers: Mutex::new(Vec::new()),
    }
  }

  pub(crate) fn add(&self, handle: &Arc<WakeHandle>) {
    self.observers.lock().push(Arc::clone(handle));
  }

  pub(crate) fn remove(&self, handle: &Arc<WakeHandle>) {
    let mut observers = self.observers.lock();
    if let Some(at) = observers.iter().position(|o| Arc::ptr_eq(o, handle)) {
      observers.swap_remove(at);
    }
  }

  pub(crate) fn notify_all(&self) {
    let observers = self.observers.lock();
    for handle in observers.iter() {
      handle.notify();
    }
  }
}
