// src/telemetry.rs

//! Optional event/counter collector, enabled by the `strand_telemetry`
//! feature. With the feature off every entry point compiles to a no-op, so
//! call sites stay in place at zero cost.

#[cfg(feature = "strand_telemetry")]
pub mod enabled {
  //! The live collector: a global, lock-guarded event log plus named
  //! counters, with a printable report for debugging interleavings.

  use std::collections::HashMap;
  use std::fmt;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;
  use std::thread::{self, ThreadId};
  use std::time::Instant;

  static NEXT_EVENT_SEQUENCE_ID: AtomicUsize = AtomicUsize::new(0);

  /// One recorded event.
  #[derive(Clone)]
  pub struct TelemetryEvent {
    /// Global sequence number across all events.
    pub seq_id: usize,
    /// When the event was recorded.
    pub timestamp: Instant,
    /// The recording OS thread.
    pub os_thread_id: ThreadId,
    /// Optional id of the item or candidate involved.
    pub item_id: Option<usize>,
    /// Code location, e.g. a module name.
    pub location: String,
    /// Event kind, e.g. "Barrier:Paired".
    pub event_type: String,
    /// Optional free-form detail.
    pub message: Option<String>,
  }

  impl fmt::Debug for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("TelemetryEvent")
        .field("seq", &self.seq_id)
        .field("os_tid", &self.os_thread_id)
        .field("item_id", &self.item_id)
        .field("loc", &self.location)
        .field("evt", &self.event_type)
        .field("msg", &self.message.as_deref().unwrap_or(""))
        .finish()
    }
  }

  type CounterKey = (String, String);

  struct CollectorData {
    events: Vec<TelemetryEvent>,
    counters: HashMap<CounterKey, usize>,
    start_time: Instant,
  }

  impl CollectorData {
    fn new() -> Self {
      CollectorData {
        events: Vec::new(),
        counters: HashMap::new(),
        start_time: Instant::now(),
      }
    }
  }

  lazy_static::lazy_static! {
    static ref GLOBAL_COLLECTOR: Mutex<CollectorData> = Mutex::new(CollectorData::new());
  }

  /// Records one event.
  pub fn log_event_fn(
    item_id: Option<usize>,
    location: &str,
    event_type: &str,
    message: Option<String>,
  ) {
    let event = TelemetryEvent {
      seq_id: NEXT_EVENT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed),
      timestamp: Instant::now(),
      os_thread_id: thread::current().id(),
      item_id,
      location: location.to_string(),
      event_type: event_type.to_string(),
      message,
    };
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      collector.events.push(event);
    }
  }

  /// Bumps a named counter.
  pub fn increment_counter_fn(location: &'static str, counter_name: &str) {
    let key = (location.to_string(), counter_name.to_string());
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      *collector.counters.entry(key).or_insert(0) += 1;
    }
  }

  /// Prints every recorded event (in sequence order) and counter to stdout.
  pub fn print_telemetry_report_fn() {
    if let Ok(collector) = GLOBAL_COLLECTOR.lock() {
      println!("\n--- strand telemetry report ---");
      let mut events = collector.events.clone();
      events.sort_by_key(|e| e.seq_id);
      for event in &events {
        let since_start = event.timestamp.duration_since(collector.start_time);
        println!(
          "  +{:<10.6}s [seq:{:<5}] tid:{:?} item:{:<6} loc:{:<12} evt:{:<24} {}",
          since_start.as_secs_f64(),
          event.seq_id,
          event.os_thread_id,
          event.item_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
          event.location,
          event.event_type,
          event.message.as_deref().unwrap_or("")
        );
      }
      let mut counters: Vec<_> = collector.counters.iter().collect();
      counters.sort_by_key(|(key, _)| *key);
      for ((loc, name), count) in counters {
        println!("  counter {:<12} {:<24} = {}", loc, name, count);
      }
      println!("--- end of report ---");
    }
  }

  /// Clears all recorded events and counters.
  pub fn clear_telemetry_fn() {
    if let Ok(mut collector) = GLOBAL_COLLECTOR.lock() {
      collector.events.clear();
      collector.counters.clear();
      collector.start_time = Instant::now();
    }
    NEXT_EVENT_SEQUENCE_ID.store(0, Ordering::Relaxed);
  }
}

#[cfg(not(feature = "strand_telemetry"))]
pub mod disabled {
  //! No-op shims compiled when telemetry is off.

  /// Records one event (no-op).
  #[inline(always)]
  pub fn log_event_fn(
    _item_id: Option<usize>,
    _location: &'static str,
    _event_type: &'static str,
    _message: Option<String>,
  ) {
  }

  /// Bumps a named counter (no-op).
  #[inline(always)]
  pub fn increment_counter_fn(_location: &'static str, _counter_name: &'static str) {}

  /// Prints the report (no-op).
  #[inline(always)]
  pub fn print_telemetry_report_fn() {}

  /// Clears recorded data (no-op).
  #[inline(always)]
  pub fn clear_telemetry_fn() {}
}

#[cfg(feature = "strand_telemetry")]
pub use enabled::{
  clear_telemetry_fn as clear_telemetry, increment_counter_fn as increment_counter,
  log_event_fn as log_event, print_telemetry_report_fn as print_telemetry_report,
};

#[cfg(not(feature = "strand_telemetry"))]
pub use disabled::{
  clear_telemetry_fn as clear_telemetry, increment_counter_fn as increment_counter,
  log_event_fn as log_event, print_telemetry_report_fn as print_telemetry_report,
};
