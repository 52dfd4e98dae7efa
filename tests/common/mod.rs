//! Shared test fixtures for integration tests.

use swapnet_sim::config::{BaselineConfig, StationConfig, Tier};

/// Baseline city preset shortened to the given horizon.
pub fn city_config(duration_min: f64) -> BaselineConfig {
    let mut config = BaselineConfig::baseline_city();
    config.simulation_duration = duration_min;
    config.duration_hours = None;
    config
}

/// Single-station network with the given pool size and initial stock.
/// Not every suite uses this one.
#[allow(dead_code)]
pub fn single_station(chargers: u32, initial_charged: u32) -> BaselineConfig {
    let mut config = BaselineConfig::baseline_city();
    config.stations = vec![StationConfig {
        station_id: "STN_SOLO".to_string(),
        tier: Tier::High,
        chargers,
        inventory_capacity: chargers.max(1),
        lat: 12.9716,
        lon: 77.5946,
        initial_charged: Some(initial_charged),
        replenishment: None,
    }];
    config
}
