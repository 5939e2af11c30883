// src/select.rs

//! Multi-way guarded choice over sets of receives and sends.
//!
//! [`select`] blocks until one candidate operation can be committed and
//! performs it; [`try_select`] is the snapshot form that never blocks. Both
//! pick uniformly at random among the candidates found ready on a scan, so
//! a persistently ready candidate cannot starve the others.
//!
//! Candidates are indexed jointly: receives come first (`0..R`), sends after
//! (`R..R+S`). Closed channels are never ready; when every candidate is
//! closed, [`select`] returns `None` instead of blocking forever.
//!
//! The scan takes each candidate channel's lock with `try_lock`, so one
//! contended channel cannot stall the sweep; a candidate skipped this way is
//! reconsidered on the next scan. Between scans the selector parks on a
//! private wake-handle registered with every candidate, and any state change
//! on any of them wakes it.
//!
//! ```
//! use strand::{select, Channel, RecvOp, SendOp};
//!
//! let a = Channel::new(1, 4);
//! let b = Channel::new(1, 4);
//! a.send(&7i32.to_le_bytes()).unwrap();
//!
//! let mut a_buf = [0u8; 4];
//! let mut b_buf = [0u8; 4];
//! let mut recvs = [RecvOp::new(&a, &mut a_buf), RecvOp::new(&b, &mut b_buf)];
//! let mut sends: [SendOp; 0] = [];
//!
//! assert_eq!(select(&mut recvs, &mut sends), Some(0));
//! assert_eq!(i32::from_le_bytes(a_buf), 7);
//! ```

use crate::channel::{Channel, Flavor};
use crate::flavors::buffered::{BufferedChannel, BufferedState};
use crate::flavors::rendezvous::{BarrierState, Phase, RendezvousChannel};
use crate::observer::WakeHandle;
use crate::telemetry;

use log::trace;
use parking_lot::MutexGuard;
use rand::{thread_rng, Rng};
use std::fmt;
use std::sync::Arc;

const LOC_SELECT: &str = "select";
const CTR_SCANS: &str = "ReadinessScans";
const CTR_COMMITS: &str = "Commits";

/// A receive candidate: one channel and the buffer its message lands in.
pub struct RecvOp<'a> {
  pub(crate) chan: &'a Channel,
  pub(crate) buf: &'a mut [u8],
}

impl<'a> RecvOp<'a> {
  /// # Panics
  ///
  /// Panics if `buf.len() != chan.msg_len()`.
  pub fn new(chan: &'a Channel, buf: &'a mut [u8]) -> Self {
    assert_eq!(buf.len(), chan.msg_len(), "message width mismatch");
    RecvOp { chan, buf }
  }
}

impl fmt::Debug for RecvOp<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RecvOp").field("chan", self.chan).finish_non_exhaustive()
  }
}

/// A send candidate: one channel and the message to hand it.
pub struct SendOp<'a> {
  pub(crate) chan: &'a Channel,
  pub(crate) msg: &'a [u8],
}

impl<'a> SendOp<'a> {
  /// # Panics
  ///
  /// Panics if `msg.len() != chan.msg_len()`.
  pub fn new(chan: &'a Channel, msg: &'a [u8]) -> Self {
    assert_eq!(msg.len(), chan.msg_len(), "message width mismatch");
    SendOp { chan, msg }
  }
}

impl fmt::Debug for SendOp<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SendOp").field("chan", self.chan).finish_non_exhaustive()
  }
}

/// A candidate found ready: its channel, with the data lock still held.
enum Ready<'a> {
  Buffered(&'a BufferedChannel, MutexGuard<'a, BufferedState>),
  Rendezvous(&'a RendezvousChannel, MutexGuard<'a, BarrierState>),
}

struct Scan<'a> {
  /// One entry per candidate, combined order; `Some` iff ready (lock held).
  slots: Vec<Option<Ready<'a>>>,
  ready: usize,
  closed: usize,
}

/// Sweeps every candidate once. A candidate is ready when the operation
/// could complete immediately; its lock is kept so the readiness cannot be
/// invalidated before commit. Closed channels count toward the all-closed
/// tally and are never ready. A channel whose lock is contended is treated
/// as not ready for this scan.
fn scan<'a>(recvs: &[RecvOp<'a>], sends: &[SendOp<'a>]) -> Scan<'a> {
  telemetry::increment_counter(LOC_SELECT, CTR_SCANS);
  let r = recvs.len();
  let total = r + sends.len();
  let mut out = Scan {
    slots: Vec::with_capacity(total),
    ready: 0,
    closed: 0,
  };
  for i in 0..total {
    let is_recv = i < r;
    let chan: &'a Channel = if is_recv { recvs[i].chan } else { sends[i - r].chan };
    let slot = match chan.flavor() {
      Flavor::Buffered(buffered) => match buffered.state.try_lock() {
        None => None,
        Some(state) => {
          if state.closed {
            out.closed += 1;
            None
          } else if is_recv && !state.ring.is_empty() {
            Some(Ready::Buffered(buffered, state))
          } else if !is_recv && !state.ring.is_full() {
            Some(Ready::Buffered(buffered, state))
          } else {
            None
          }
        }
      },
      Flavor::Rendezvous(rendezvous) => match rendezvous.state.try_lock() {
        None => None,
        Some(state) => {
          if state.closed {
            out.closed += 1;
            None
          } else {
            let ready = match state.phase {
              // Ready to receive iff a sender is already parked, and to
              // send iff a receiver is; any other phase would block.
              Phase::SenderWaiting(_) => is_recv,
              Phase::ReceiverWaiting(_) => !is_recv,
              Phase::Idle | Phase::Done => false,
            };
            if ready {
              Some(Ready::Rendezvous(rendezvous, state))
            } else {
              None
            }
          }
        }
      },
    };
    if slot.is_some() {
      out.ready += 1;
    }
    out.slots.push(slot);
  }
  out
}

/// Commits the `nth` ready candidate (counting ready slots only) and drops
/// the locks of every other ready candidate. Returns the combined index.
fn commit<'a>(
  recvs: &mut [RecvOp<'a>],
  sends: &mut [SendOp<'a>],
  mut scan: Scan<'a>,
  nth: usize,
) -> usize {
  let r = recvs.len();
  let mut chosen = usize::MAX;
  let mut seen = 0;
  for (i, slot) in scan.slots.iter_mut().enumerate() {
    if slot.is_some() {
      if seen == nth {
        chosen = i;
      } else {
        // Dropping the guard releases the not-chosen channel.
        *slot = None;
      }
      seen += 1;
    }
  }
  debug_assert!(chosen != usize::MAX);

  let slot = scan.slots[chosen].take().expect("chosen candidate lost its lock");
  if chosen < r {
    let op = &mut recvs[chosen];
    match slot {
      Ready::Buffered(chan, state) => chan.finish_recv(state, op.buf),
      Ready::Rendezvous(chan, state) => chan.finish_recv(state, op.buf),
    }
  } else {
    let op = &sends[chosen - r];
    match slot {
      Ready::Buffered(chan, state) => chan.finish_send(state, op.msg),
      Ready::Rendezvous(chan, state) => chan.finish_send(state, op.msg),
    }
  }
  telemetry::increment_counter(LOC_SELECT, CTR_COMMITS);
  trace!("select committed candidate {}", chosen);
  chosen
}

/// Blocks until one candidate operation is ready, commits it, and returns
/// its combined index (receives `0..R`, sends `R..R+S`).
///
/// Returns `None` only when every candidate channel is closed; a candidate
/// set that is merely not ready parks the caller until a candidate channel
/// changes state. The choice among simultaneously ready candidates is
/// uniformly random.
pub fn select<'a>(recvs: &mut [RecvOp<'a>], sends: &mut [SendOp<'a>]) -> Option<usize> {
  let total = recvs.len() + sends.len();
  if total == 0 {
    return None;
  }

  let handle = Arc::new(WakeHandle::new());
  for op in recvs.iter() {
    op.chan.observers().add(&handle);
  }
  for op in sends.iter() {
    op.chan.observers().add(&handle);
  }

  let committed = loop {
    // Clear the wake flag before scanning: a notification that lands
    // during the scan then turns the wait below into an immediate re-scan.
    handle.prepare();
    let result = scan(recvs, sends);
    if result.ready == 0 {
      if result.closed == total {
        break None;
      }
      drop(result);
      handle.wait();
      continue;
    }
    let nth = thread_rng().gen_range(0..result.ready);
    break Some(commit(recvs, sends, result, nth));
  };

  for op in recvs.iter() {
    op.chan.observers().remove(&handle);
  }
  for op in sends.iter() {
    op.chan.observers().remove(&handle);
  }
  committed
}

/// The non-blocking form of [`select`]: a pure snapshot.
///
/// Commits and returns one ready candidate if the scan finds any, otherwise
/// returns `None` immediately, whether the candidates are merely not ready
/// or all closed. No wake-handle is registered; nothing observes the
/// channels after the call returns.
pub fn try_select<'a>(recvs: &mut [RecvOp<'a>], sends: &mut [SendOp<'a>]) -> Option<usize> {
  let result = scan(recvs, sends);
  if result.ready == 0 {
    return None;
  }
  let nth = thread_rng().gen_range(0..result.ready);
  Some(commit(recvs, sends, result, nth))
}
