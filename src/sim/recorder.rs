//! Timeline and hourly snapshot capture.

use serde::Serialize;

use crate::sim::station::Station;

/// Per-station slice of a timeline frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationFrame {
    pub station_id: String,
    pub timestamp_min: f64,
    pub queue_length: usize,
    pub batteries_available: u32,
    pub chargers_in_use: u32,
    pub swaps_completed: u64,
    pub swaps_lost: u64,
}

/// Network-wide timeline frame at one snapshot instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineFrame {
    pub timestamp_min: f64,
    pub stations: Vec<StationFrame>,
}

/// Per-station slice of an hourly snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyStationSnapshot {
    pub station_id: String,
    pub charged_inventory: u32,
    pub depleted_inventory: u32,
    pub queue_length: usize,
    pub total_arrivals: u64,
    pub successful_swaps: u64,
    pub rejected_swaps: u64,
}

/// Full-network snapshot taken on each simulated hour boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySnapshot {
    pub hour: u64,
    pub time_minutes: f64,
    pub stations: Vec<HourlyStationSnapshot>,
}

/// Picks a frame interval appropriate to the run length so that long
/// horizons do not produce unbounded frame counts.
pub fn timeline_interval_min(horizon_min: f64) -> f64 {
    if horizon_min <= 1_440.0 {
        15.0
    } else if horizon_min <= 10_080.0 {
        60.0
    } else {
        240.0
    }
}

/// Captures evenly spaced timeline frames as the engine's minute ticks
/// cross the next snapshot boundary.
#[derive(Debug)]
pub struct TimelineRecorder {
    interval_min: f64,
    next_snapshot_time: f64,
    frames: Vec<TimelineFrame>,
}

impl TimelineRecorder {
    pub fn new(horizon_min: f64) -> Self {
        Self {
            interval_min: timeline_interval_min(horizon_min),
            next_snapshot_time: 0.0,
            frames: Vec::new(),
        }
    }

    pub fn interval_min(&self) -> f64 {
        self.interval_min
    }

    /// Records a frame if `now` has reached the next snapshot boundary.
    /// Ticks between boundaries are cheap no-ops.
    pub fn observe(&mut self, now: f64, stations: &[Station]) {
        if now + 1e-9 < self.next_snapshot_time {
            return;
        }
        self.frames.push(TimelineFrame {
            timestamp_min: now,
            stations: stations
                .iter()
                .map(|s| StationFrame {
                    station_id: s.station_id.clone(),
                    timestamp_min: now,
                    queue_length: s.queue_length(),
                    batteries_available: s.charged(),
                    chargers_in_use: s.charging(),
                    swaps_completed: s.successful_swaps(),
                    swaps_lost: s.rejected_swaps(),
                })
                .collect(),
        });
        self.next_snapshot_time += self.interval_min;
    }

    pub fn into_frames(self) -> Vec<TimelineFrame> {
        self.frames
    }
}

/// Takes the hourly snapshot for `hour` across all stations.
pub fn hourly_snapshot(hour: u64, now: f64, stations: &[Station]) -> HourlySnapshot {
    HourlySnapshot {
        hour,
        time_minutes: now,
        stations: stations
            .iter()
            .map(|s| HourlyStationSnapshot {
                station_id: s.station_id.clone(),
                charged_inventory: s.charged(),
                depleted_inventory: s.depleted(),
                queue_length: s.queue_length(),
                total_arrivals: s.total_arrivals(),
                successful_swaps: s.successful_swaps(),
                rejected_swaps: s.rejected_swaps(),
            })
            .collect(),
    }
}
