//! Event loop tying demand, stations, and recorders together.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::{BaselineConfig, Tier};
use crate::sim::demand::DemandGenerator;
use crate::sim::queue::{EventKind, EventQueue};
use crate::sim::recorder::{HourlySnapshot, TimelineFrame, TimelineRecorder, hourly_snapshot};
use crate::sim::station::{ChargeEvent, InventoryEvent, Station, StationStats, SwapEvent};

/// Everything one station produced over a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationResult {
    pub station_id: String,
    pub tier: Tier,
    pub stats: StationStats,
    pub swap_events: Vec<SwapEvent>,
    pub charge_events: Vec<ChargeEvent>,
    pub inventory_events: Vec<InventoryEvent>,
}

/// Full output of a run, ready for KPI derivation and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub duration_min: f64,
    pub seed: u64,
    pub stations: Vec<StationResult>,
    pub hourly_snapshots: Vec<HourlySnapshot>,
    pub timeline_frames: Vec<TimelineFrame>,
}

const HOURLY_SNAPSHOT_GAP_MIN: f64 = 60.0;
const TIMELINE_TICK_MIN: f64 = 1.0;

/// Discrete-event engine for one configured network.
///
/// All randomness flows through a single seeded generator, and
/// same-time events resolve in scheduling order, so a (config, seed)
/// pair fully determines the run.
pub struct Engine {
    horizon_min: f64,
    seed: u64,
    rng: StdRng,
    queue: EventQueue,
    stations: Vec<Station>,
    samplers: Vec<DemandGenerator>,
    recorder: TimelineRecorder,
    hourly: Vec<HourlySnapshot>,
}

impl Engine {
    /// Sets up stations and demand samplers in configuration order and
    /// seeds the queue with the first arrival draw for each station.
    pub fn new(config: &BaselineConfig) -> Self {
        let horizon_min = config.horizon_min();
        let mut queue = EventQueue::new();
        let mut rng = StdRng::seed_from_u64(config.random_seed);

        let mut stations = Vec::with_capacity(config.stations.len());
        let mut samplers = Vec::with_capacity(config.stations.len());
        for (index, station_config) in config.stations.iter().enumerate() {
            stations.push(Station::new(
                station_config,
                &config.operations,
                &mut queue,
                index,
            ));
            samplers.push(DemandGenerator::new(station_config, &config.demand));
        }

        for (index, sampler) in samplers.iter().enumerate() {
            queue.schedule_at(
                sampler.next_gap(0.0, &mut rng),
                EventKind::Arrival { station: index },
            );
        }

        queue.schedule_at(0.0, EventKind::TimelineTick);
        queue.schedule_at(HOURLY_SNAPSHOT_GAP_MIN, EventKind::HourlySnapshot);

        Self {
            horizon_min,
            seed: config.random_seed,
            rng,
            queue,
            stations,
            samplers,
            recorder: TimelineRecorder::new(horizon_min),
            hourly: Vec::new(),
        }
    }

    /// Runs the event loop until no event earlier than the horizon
    /// remains. Events scheduled at or past the horizon stay unhandled.
    pub fn run(mut self) -> SimulationResult {
        while let Some(event) = self.queue.pop_before(self.horizon_min) {
            match event.kind {
                EventKind::Arrival { station } => {
                    let customer_id = self.samplers[station].next_customer_id();
                    self.schedule_next_demand(station);
                    self.stations[station].handle_arrival(customer_id, &mut self.queue, station);
                }
                EventKind::PatienceExpired { station, waiter } => {
                    self.stations[station].handle_patience_expired(waiter, &mut self.queue);
                }
                EventKind::SwapComplete {
                    station,
                    customer_id,
                    wait_time,
                } => {
                    self.stations[station].handle_swap_complete(
                        customer_id,
                        wait_time,
                        &mut self.queue,
                        station,
                    );
                }
                EventKind::ChargeComplete { station } => {
                    self.stations[station].handle_charge_complete(&mut self.queue, station);
                }
                EventKind::HourlySnapshot => {
                    let now = self.queue.now();
                    let hour = (now / 60.0).round() as u64;
                    self.hourly.push(hourly_snapshot(hour, now, &self.stations));
                    self.queue
                        .schedule_in(HOURLY_SNAPSHOT_GAP_MIN, EventKind::HourlySnapshot);
                }
                EventKind::TimelineTick => {
                    self.recorder.observe(self.queue.now(), &self.stations);
                    self.queue
                        .schedule_in(TIMELINE_TICK_MIN, EventKind::TimelineTick);
                }
            }
        }
        self.queue.finish_at(self.horizon_min);

        SimulationResult {
            duration_min: self.horizon_min,
            seed: self.seed,
            stations: self
                .stations
                .into_iter()
                .map(|station| StationResult {
                    station_id: station.station_id.clone(),
                    tier: station.tier,
                    stats: station.stats_summary(),
                    swap_events: station.swap_events,
                    charge_events: station.charge_events,
                    inventory_events: station.inventory_events,
                })
                .collect(),
            hourly_snapshots: self.hourly,
            timeline_frames: self.recorder.into_frames(),
        }
    }

    /// Draws the next arrival for `station` at the current time. A zero
    /// rate still yields a customer one fixed gap later, just without
    /// touching the random stream.
    fn schedule_next_demand(&mut self, station: usize) {
        let now = self.queue.now();
        let gap = self.samplers[station].next_gap(now, &mut self.rng);
        self.queue
            .schedule_in(gap, EventKind::Arrival { station });
    }
}

/// One-call convenience over [`Engine::new`] and [`Engine::run`].
pub fn simulate(config: &BaselineConfig) -> SimulationResult {
    Engine::new(config).run()
}
