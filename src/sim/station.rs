//! Per-station state machine: closed battery pool, patience race, and
//! independent charge cycles.

use std::collections::VecDeque;

use serde::Serialize;

use crate::config::{OperationalConfig, StationConfig, Tier};
use crate::sim::queue::{EventKind, EventQueue};

/// Swap-side event record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapEvent {
    pub time: f64,
    pub station_id: String,
    pub event_type: SwapEventType,
    pub customer_id: String,
    pub wait_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapEventType {
    Arrival,
    SwapStart,
    SwapEnd,
    Rejected,
}

/// Charge-side event record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeEvent {
    pub time: f64,
    pub station_id: String,
    pub event_type: ChargeEventType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeEventType {
    ChargeStart,
    ChargeEnd,
}

/// Inventory snapshot record. At every logged instant
/// `charged_count + depleted_count == chargers` (closed pool).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryEvent {
    pub time: f64,
    pub station_id: String,
    pub charged_count: u32,
    pub depleted_count: u32,
}

/// Summary statistics reported per station at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationStats {
    pub station_id: String,
    pub tier: Tier,
    pub total_arrivals: u64,
    pub successful_swaps: u64,
    pub rejected_swaps: u64,
    /// Mean wait over successful swaps, minutes, rounded to 2 dp.
    pub avg_wait_time: f64,
    /// Rejected over arrivals, rounded to 3 dp.
    pub rejection_rate: f64,
    pub chargers: u32,
    /// Physical pool size; equals `chargers` in the closed-loop model.
    pub inventory_capacity: u32,
}

/// A customer whose pool acquisition is pending, racing a patience timer.
#[derive(Debug)]
struct Waiter {
    id: u64,
    customer_id: String,
    requested_at: f64,
}

/// Runtime state of one swap station.
///
/// The station owns a closed pool of exactly `chargers` battery units,
/// split at any instant between `charged` (available to customers) and
/// `depleted` (consumed by a swap or cycling through a charger). Units
/// are never created or destroyed during a run.
///
/// The station never advances time itself: handlers run inside the
/// engine's event loop and schedule follow-up events on the queue.
#[derive(Debug)]
pub struct Station {
    pub station_id: String,
    pub tier: Tier,
    chargers: u32,
    charged: u32,
    depleted: u32,
    charging: u32,
    swap_duration: f64,
    charge_duration: f64,
    max_wait_time: f64,
    waiters: VecDeque<Waiter>,
    next_waiter_id: u64,

    // Cumulative statistics.
    total_arrivals: u64,
    successful_swaps: u64,
    rejected_swaps: u64,
    total_wait_time: f64,

    // Append-only event logs.
    pub swap_events: Vec<SwapEvent>,
    pub charge_events: Vec<ChargeEvent>,
    pub inventory_events: Vec<InventoryEvent>,
}

impl Station {
    /// Builds a station from configuration and schedules the time-zero
    /// charge cycles for any initial shortfall (units configured as not
    /// yet charged are treated as mid-charge).
    pub fn new(
        config: &StationConfig,
        operations: &OperationalConfig,
        queue: &mut EventQueue,
        station_index: usize,
    ) -> Self {
        let initial_charged = config.effective_initial_charged().min(config.chargers);
        let mut station = Self {
            station_id: config.station_id.clone(),
            tier: config.tier,
            chargers: config.chargers,
            charged: initial_charged,
            depleted: config.chargers - initial_charged,
            charging: 0,
            swap_duration: operations.swap_duration,
            charge_duration: operations.charge_duration,
            max_wait_time: operations.max_wait_time,
            waiters: VecDeque::new(),
            next_waiter_id: 0,
            total_arrivals: 0,
            successful_swaps: 0,
            rejected_swaps: 0,
            total_wait_time: 0.0,
            swap_events: Vec::new(),
            charge_events: Vec::new(),
            inventory_events: Vec::new(),
        };

        for _ in 0..station.depleted {
            station.start_charge_cycle(queue, station_index);
        }
        station.log_inventory(queue.now());
        station
    }

    /// Handles one customer arrival: the swap attempt either acquires a
    /// charged unit immediately, or joins the FIFO wait queue racing a
    /// patience timer scheduled here.
    pub fn handle_arrival(
        &mut self,
        customer_id: String,
        queue: &mut EventQueue,
        station_index: usize,
    ) {
        let now = queue.now();
        self.total_arrivals += 1;
        self.swap_events.push(SwapEvent {
            time: now,
            station_id: self.station_id.clone(),
            event_type: SwapEventType::Arrival,
            customer_id: customer_id.clone(),
            wait_time: 0.0,
        });

        if self.charged > 0 {
            // A unit is only ever available when nobody is queued ahead:
            // releases hand units straight to the head waiter.
            debug_assert!(self.waiters.is_empty());
            self.charged -= 1;
            self.acquire_unit(customer_id, 0.0, queue, station_index);
        } else {
            let id = self.next_waiter_id;
            self.next_waiter_id += 1;
            self.waiters.push_back(Waiter {
                id,
                customer_id,
                requested_at: now,
            });
            queue.schedule_in(
                self.max_wait_time,
                EventKind::PatienceExpired {
                    station: station_index,
                    waiter: id,
                },
            );
        }
    }

    /// Handles a patience expiry. If the waiter was already served the
    /// event is stale and ignored; otherwise the pending acquisition is
    /// withdrawn and the arrival recorded as a lost swap.
    pub fn handle_patience_expired(&mut self, waiter_id: u64, queue: &mut EventQueue) {
        let Some(position) = self.waiters.iter().position(|w| w.id == waiter_id) else {
            return;
        };
        let Some(waiter) = self.waiters.remove(position) else {
            return;
        };

        self.rejected_swaps += 1;
        self.swap_events.push(SwapEvent {
            time: queue.now(),
            station_id: self.station_id.clone(),
            event_type: SwapEventType::Rejected,
            customer_id: waiter.customer_id,
            wait_time: self.max_wait_time,
        });
    }

    /// Handles a swap finishing: the consumed unit is already counted
    /// depleted, so this records completion and launches the unit's
    /// charge cycle (fire-and-forget).
    pub fn handle_swap_complete(
        &mut self,
        customer_id: String,
        wait_time: f64,
        queue: &mut EventQueue,
        station_index: usize,
    ) {
        let now = queue.now();
        self.successful_swaps += 1;
        self.swap_events.push(SwapEvent {
            time: now,
            station_id: self.station_id.clone(),
            event_type: SwapEventType::SwapEnd,
            customer_id,
            wait_time,
        });
        self.log_inventory(now);
        self.start_charge_cycle(queue, station_index);
    }

    /// Handles a charge cycle finishing: the unit leaves the depleted
    /// pool and either goes straight to the head waiter (possibly
    /// unblocking a swap) or returns to the available pool.
    pub fn handle_charge_complete(&mut self, queue: &mut EventQueue, station_index: usize) {
        let now = queue.now();
        self.charge_events.push(ChargeEvent {
            time: now,
            station_id: self.station_id.clone(),
            event_type: ChargeEventType::ChargeEnd,
        });
        self.charging -= 1;
        self.depleted -= 1;

        match self.waiters.pop_front() {
            Some(waiter) => {
                let wait_time = now - waiter.requested_at;
                self.acquire_unit(waiter.customer_id, wait_time, queue, station_index);
            }
            None => self.charged += 1,
        }
        self.log_inventory(now);
    }

    /// Gives one unit to a customer and schedules the swap completion.
    /// The caller has already removed the unit from `charged` (or, on
    /// the release path, never returned it there).
    ///
    /// The unit counts as depleted from acquisition onward, which keeps
    /// `charged + depleted == chargers` through the swap hold as well.
    fn acquire_unit(
        &mut self,
        customer_id: String,
        wait_time: f64,
        queue: &mut EventQueue,
        station_index: usize,
    ) {
        self.depleted += 1;
        self.total_wait_time += wait_time;
        self.swap_events.push(SwapEvent {
            time: queue.now(),
            station_id: self.station_id.clone(),
            event_type: SwapEventType::SwapStart,
            customer_id: customer_id.clone(),
            wait_time,
        });
        queue.schedule_in(
            self.swap_duration,
            EventKind::SwapComplete {
                station: station_index,
                customer_id,
                wait_time,
            },
        );
    }

    /// Records a charge start and schedules its completion.
    fn start_charge_cycle(&mut self, queue: &mut EventQueue, station_index: usize) {
        self.charge_events.push(ChargeEvent {
            time: queue.now(),
            station_id: self.station_id.clone(),
            event_type: ChargeEventType::ChargeStart,
        });
        self.charging += 1;
        queue.schedule_in(
            self.charge_duration,
            EventKind::ChargeComplete {
                station: station_index,
            },
        );
    }

    fn log_inventory(&mut self, now: f64) {
        debug_assert_eq!(self.charged + self.depleted, self.chargers);
        self.inventory_events.push(InventoryEvent {
            time: now,
            station_id: self.station_id.clone(),
            charged_count: self.charged,
            depleted_count: self.depleted,
        });
    }

    /// Charged units ready for customers.
    pub fn charged(&self) -> u32 {
        self.charged
    }

    /// Units mid-charge right now.
    pub fn charging(&self) -> u32 {
        self.charging
    }

    /// Depleted-or-charging units (includes units held mid-swap).
    pub fn depleted(&self) -> u32 {
        self.depleted
    }

    /// Customers currently waiting for a unit.
    pub fn queue_length(&self) -> usize {
        self.waiters.len()
    }

    pub fn total_arrivals(&self) -> u64 {
        self.total_arrivals
    }

    pub fn successful_swaps(&self) -> u64 {
        self.successful_swaps
    }

    pub fn rejected_swaps(&self) -> u64 {
        self.rejected_swaps
    }

    /// End-of-run summary with the derived averages.
    pub fn stats_summary(&self) -> StationStats {
        let avg_wait = if self.successful_swaps > 0 {
            self.total_wait_time / self.successful_swaps as f64
        } else {
            0.0
        };
        let rejection_rate = if self.total_arrivals > 0 {
            self.rejected_swaps as f64 / self.total_arrivals as f64
        } else {
            0.0
        };
        StationStats {
            station_id: self.station_id.clone(),
            tier: self.tier,
            total_arrivals: self.total_arrivals,
            successful_swaps: self.successful_swaps,
            rejected_swaps: self.rejected_swaps,
            avg_wait_time: (avg_wait * 100.0).round() / 100.0,
            rejection_rate: (rejection_rate * 1000.0).round() / 1000.0,
            chargers: self.chargers,
            inventory_capacity: self.chargers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperationalConfig;

    fn test_config(chargers: u32, initial_charged: Option<u32>) -> StationConfig {
        StationConfig {
            station_id: "STN_T".to_string(),
            tier: Tier::Medium,
            chargers,
            inventory_capacity: chargers.max(1),
            lat: 0.0,
            lon: 0.0,
            initial_charged,
            replenishment: None,
        }
    }

    fn test_operations() -> OperationalConfig {
        OperationalConfig {
            swap_duration: 2.0,
            charge_duration: 10.0,
            max_wait_time: 5.0,
            ..OperationalConfig::default()
        }
    }

    /// Drains the queue up to `horizon`, dispatching to the one station.
    fn drive(station: &mut Station, queue: &mut EventQueue, horizon: f64) {
        while let Some(event) = queue.pop_before(horizon) {
            match event.kind {
                EventKind::PatienceExpired { waiter, .. } => {
                    station.handle_patience_expired(waiter, queue);
                }
                EventKind::SwapComplete {
                    customer_id,
                    wait_time,
                    ..
                } => station.handle_swap_complete(customer_id, wait_time, queue, 0),
                EventKind::ChargeComplete { .. } => station.handle_charge_complete(queue, 0),
                _ => {}
            }
        }
        queue.finish_at(horizon);
    }

    #[test]
    fn initial_shortfall_starts_charging() {
        let mut queue = EventQueue::new();
        let station = Station::new(&test_config(5, Some(2)), &test_operations(), &mut queue, 0);
        assert_eq!(station.charged(), 2);
        assert_eq!(station.depleted(), 3);
        assert_eq!(station.charging(), 3);
        assert_eq!(station.charge_events.len(), 3);
        assert_eq!(station.inventory_events.len(), 1);
        assert_eq!(station.inventory_events[0].charged_count, 2);
    }

    #[test]
    fn immediate_swap_with_stock() {
        let mut queue = EventQueue::new();
        let mut station =
            Station::new(&test_config(3, None), &test_operations(), &mut queue, 0);
        station.handle_arrival("STN_T_C1".to_string(), &mut queue, 0);

        assert_eq!(station.charged(), 2);
        assert_eq!(station.total_arrivals(), 1);
        let start = station
            .swap_events
            .iter()
            .find(|e| e.event_type == SwapEventType::SwapStart)
            .expect("swap_start logged");
        assert_eq!(start.wait_time, 0.0);

        drive(&mut station, &mut queue, 60.0);
        assert_eq!(station.successful_swaps(), 1);
        assert_eq!(station.rejected_swaps(), 0);
        // Swap ended at t=2, charge cycle returned the unit at t=12.
        assert_eq!(station.charged(), 3);
        assert_eq!(station.depleted(), 0);
    }

    #[test]
    fn arrival_without_stock_times_out() {
        let mut queue = EventQueue::new();
        let mut station =
            Station::new(&test_config(1, Some(0)), &test_operations(), &mut queue, 0);
        // One unit mid-charge until t=10; patience is 5.
        station.handle_arrival("STN_T_C1".to_string(), &mut queue, 0);
        assert_eq!(station.queue_length(), 1);

        drive(&mut station, &mut queue, 60.0);
        assert_eq!(station.rejected_swaps(), 1);
        assert_eq!(station.successful_swaps(), 0);
        let rejected = station
            .swap_events
            .iter()
            .find(|e| e.event_type == SwapEventType::Rejected)
            .expect("rejection logged");
        assert_eq!(rejected.time, 5.0);
        assert_eq!(rejected.wait_time, 5.0);
        // The withdrawn request must not consume the later release.
        assert_eq!(station.charged(), 1);
        assert_eq!(station.queue_length(), 0);
    }

    #[test]
    fn charge_release_unblocks_waiter() {
        let mut queue = EventQueue::new();
        let mut ops = test_operations();
        ops.max_wait_time = 20.0;
        let mut station = Station::new(&test_config(1, Some(0)), &ops, &mut queue, 0);
        // Unit charges until t=10; patient customer arrives at t=0.
        station.handle_arrival("STN_T_C1".to_string(), &mut queue, 0);

        drive(&mut station, &mut queue, 60.0);
        assert_eq!(station.successful_swaps(), 1);
        assert_eq!(station.rejected_swaps(), 0);
        let start = station
            .swap_events
            .iter()
            .find(|e| e.event_type == SwapEventType::SwapStart)
            .expect("swap_start logged");
        assert_eq!(start.time, 10.0);
        assert_eq!(start.wait_time, 10.0);
        // The stale patience event (t=20) must not double-count.
        assert_eq!(station.total_arrivals(), 1);
    }

    #[test]
    fn conservation_holds_at_every_inventory_event() {
        let mut queue = EventQueue::new();
        let mut station =
            Station::new(&test_config(2, Some(1)), &test_operations(), &mut queue, 0);
        station.handle_arrival("STN_T_C1".to_string(), &mut queue, 0);
        station.handle_arrival("STN_T_C2".to_string(), &mut queue, 0);
        drive(&mut station, &mut queue, 120.0);

        assert!(!station.inventory_events.is_empty());
        for event in &station.inventory_events {
            assert_eq!(
                event.charged_count + event.depleted_count,
                2,
                "at t={}",
                event.time
            );
        }
    }

    #[test]
    fn stats_round_and_guard_division() {
        let mut queue = EventQueue::new();
        let station = Station::new(&test_config(2, None), &test_operations(), &mut queue, 0);
        let stats = station.stats_summary();
        assert_eq!(stats.avg_wait_time, 0.0);
        assert_eq!(stats.rejection_rate, 0.0);
        assert_eq!(stats.inventory_capacity, 2);
    }
}
