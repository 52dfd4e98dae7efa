//! Future-event queue for the discrete-event engine.
//!
//! Simulated time is a continuous `f64` minute count. The queue is a
//! min-heap keyed by `(time, seq)` where `seq` is a monotonically
//! increasing push counter, so events at the same timestamp are handled
//! strictly in scheduling order. That FIFO tie-break is the crate's
//! documented determinism guarantee: given identical configuration and
//! seed, the pop order (and therefore every RNG draw) is reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Everything that can happen in a run.
///
/// Station indices refer to the engine's station vector (config order).
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A customer arrives at a station wanting a swap.
    Arrival { station: usize },
    /// A waiting customer's patience runs out. Stale once the waiter has
    /// been served; the station ignores it in that case.
    PatienceExpired { station: usize, waiter: u64 },
    /// A swap in progress finishes and the consumed unit turns depleted.
    SwapComplete {
        station: usize,
        customer_id: String,
        wait_time: f64,
    },
    /// A charge cycle finishes and a unit returns to the available pool.
    ChargeComplete { station: usize },
    /// Coarse per-hour state sample.
    HourlySnapshot,
    /// Fine-grained sampler tick (1 simulated minute).
    TimelineTick,
}

/// An event with its scheduled time and FIFO tie-break sequence.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub time: f64,
    pub seq: u64,
    pub kind: EventKind,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (time, seq).
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap event queue owning the simulated clock.
#[derive(Debug, Default)]
pub struct EventQueue {
    now: f64,
    next_seq: u64,
    events: BinaryHeap<ScheduledEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time in minutes.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedules an event at an absolute time.
    pub fn schedule_at(&mut self, time: f64, kind: EventKind) {
        debug_assert!(time >= self.now, "event time must be >= current time");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(ScheduledEvent { time, seq, kind });
    }

    /// Schedules an event `delay` minutes from now.
    pub fn schedule_in(&mut self, delay: f64, kind: EventKind) {
        self.schedule_at(self.now + delay, kind);
    }

    /// Pops the next event if it is strictly before `horizon`, advancing
    /// the clock to its timestamp. Events at or past the horizon stay
    /// queued and are never handled, matching a time-bounded run.
    pub fn pop_before(&mut self, horizon: f64) -> Option<ScheduledEvent> {
        if self.events.peek()?.time >= horizon {
            return None;
        }
        let event = self.events.pop()?;
        self.now = event.time;
        Some(event)
    }

    /// Moves the clock to the horizon at the end of a run.
    pub fn finish_at(&mut self, horizon: f64) {
        if horizon > self.now {
            self.now = horizon;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
