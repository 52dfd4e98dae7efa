//! Station- and city-level KPI derivation from recorded run events.

use std::fmt;

use serde::Serialize;

use crate::config::{BaselineConfig, Tier};
use crate::sim::engine::{SimulationResult, StationResult};
use crate::sim::station::{ChargeEvent, ChargeEventType, InventoryEvent};

/// KPIs for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationKpis {
    pub station_id: String,
    pub tier: Tier,
    /// Mean wait over successful swaps, minutes.
    pub avg_wait_time: f64,
    pub lost_swaps: u64,
    pub lost_swaps_pct: f64,
    pub total_arrivals: u64,
    pub successful_swaps: u64,
    /// Fraction of total charger-minutes spent charging, in `[0, 1]`.
    pub charger_utilization: f64,
    /// Time-weighted mean charged inventory over the horizon.
    pub avg_charged_inventory: f64,
}

/// City-level aggregates across all stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityKpis {
    /// Successful-swap-weighted mean wait, minutes.
    pub avg_wait_time: f64,
    pub lost_swaps_pct: f64,
    /// Mean utilization across stations.
    pub charger_utilization: f64,
    /// Sum of average inventories over sum of capacities, percent.
    pub idle_inventory_pct: f64,
    /// Successful swaps per simulated hour.
    pub throughput: f64,
    /// `0.5*wait + 2*lost_pct + 10*(1 - utilization)`; lower is better.
    pub cost_proxy: f64,
    pub total_arrivals: u64,
    pub total_swaps: u64,
    pub total_lost: u64,
}

/// Complete KPI report for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub city: CityKpis,
    pub stations: Vec<StationKpis>,
}

impl KpiReport {
    /// Derives all KPIs from a finished run and the configuration it
    /// used (charge duration and charger counts come from there).
    pub fn from_results(results: &SimulationResult, config: &BaselineConfig) -> Self {
        let horizon_min = results.duration_min;
        let stations: Vec<StationKpis> = results
            .stations
            .iter()
            .map(|station| {
                let chargers = config
                    .stations
                    .iter()
                    .find(|s| s.station_id == station.station_id)
                    .map(|s| s.chargers)
                    .unwrap_or(station.stats.chargers);
                station_kpis(
                    station,
                    chargers,
                    horizon_min,
                    config.operations.charge_duration,
                )
            })
            .collect();

        let capacities: u64 = results
            .stations
            .iter()
            .map(|s| s.stats.inventory_capacity as u64)
            .sum();
        let city = city_kpis(&stations, capacities, horizon_min);
        Self { city, stations }
    }
}

fn station_kpis(
    station: &StationResult,
    chargers: u32,
    horizon_min: f64,
    charge_duration: f64,
) -> StationKpis {
    let stats = &station.stats;
    let lost_swaps_pct = if stats.total_arrivals > 0 {
        stats.rejected_swaps as f64 / stats.total_arrivals as f64 * 100.0
    } else {
        0.0
    };

    StationKpis {
        station_id: station.station_id.clone(),
        tier: station.tier,
        avg_wait_time: round2(stats.avg_wait_time),
        lost_swaps: stats.rejected_swaps,
        lost_swaps_pct: round2(lost_swaps_pct),
        total_arrivals: stats.total_arrivals,
        successful_swaps: stats.successful_swaps,
        charger_utilization: round3(charger_utilization(
            &station.charge_events,
            chargers,
            horizon_min,
            charge_duration,
        )),
        avg_charged_inventory: round1(avg_charged_inventory(
            &station.inventory_events,
            horizon_min,
        )),
    }
}

fn city_kpis(stations: &[StationKpis], total_capacity: u64, horizon_min: f64) -> CityKpis {
    if stations.is_empty() {
        return CityKpis {
            avg_wait_time: 0.0,
            lost_swaps_pct: 0.0,
            charger_utilization: 0.0,
            idle_inventory_pct: 0.0,
            throughput: 0.0,
            cost_proxy: 10.0,
            total_arrivals: 0,
            total_swaps: 0,
            total_lost: 0,
        };
    }

    let total_arrivals: u64 = stations.iter().map(|s| s.total_arrivals).sum();
    let total_swaps: u64 = stations.iter().map(|s| s.successful_swaps).sum();
    let total_lost: u64 = stations.iter().map(|s| s.lost_swaps).sum();

    let avg_wait_time = if total_swaps > 0 {
        stations
            .iter()
            .map(|s| s.avg_wait_time * s.successful_swaps as f64)
            .sum::<f64>()
            / total_swaps as f64
    } else {
        0.0
    };
    let lost_swaps_pct = if total_arrivals > 0 {
        total_lost as f64 / total_arrivals as f64 * 100.0
    } else {
        0.0
    };
    let charger_utilization = stations
        .iter()
        .map(|s| s.charger_utilization)
        .sum::<f64>()
        / stations.len() as f64;
    let idle_inventory_pct = if total_capacity > 0 {
        stations
            .iter()
            .map(|s| s.avg_charged_inventory)
            .sum::<f64>()
            / total_capacity as f64
            * 100.0
    } else {
        0.0
    };
    let duration_hours = horizon_min / 60.0;
    let throughput = if duration_hours > 0.0 {
        total_swaps as f64 / duration_hours
    } else {
        0.0
    };
    let cost_proxy =
        avg_wait_time * 0.5 + lost_swaps_pct * 2.0 + (1.0 - charger_utilization) * 10.0;

    CityKpis {
        avg_wait_time: round2(avg_wait_time),
        lost_swaps_pct: round2(lost_swaps_pct),
        charger_utilization: round3(charger_utilization),
        idle_inventory_pct: round2(idle_inventory_pct),
        throughput: round1(throughput),
        cost_proxy: round2(cost_proxy),
        total_arrivals,
        total_swaps,
        total_lost,
    }
}

/// Completed-charge minutes over total charger-minutes, capped at 1.
fn charger_utilization(
    charge_events: &[ChargeEvent],
    chargers: u32,
    horizon_min: f64,
    charge_duration: f64,
) -> f64 {
    if chargers == 0 || horizon_min <= 0.0 {
        return 0.0;
    }
    let completed = charge_events
        .iter()
        .filter(|e| e.event_type == ChargeEventType::ChargeEnd)
        .count() as f64;
    (completed * charge_duration / (horizon_min * chargers as f64)).min(1.0)
}

/// Time-weighted mean of the charged count over `[0, horizon]`. The
/// count is piecewise constant between snapshots; the last snapshot
/// extends to the horizon.
fn avg_charged_inventory(inventory_events: &[InventoryEvent], horizon_min: f64) -> f64 {
    let Some(last) = inventory_events.last() else {
        return 0.0;
    };
    if horizon_min <= 0.0 {
        return 0.0;
    }
    let mut weighted = 0.0;
    for pair in inventory_events.windows(2) {
        weighted += pair[0].charged_count as f64 * (pair[1].time - pair[0].time);
    }
    weighted += last.charged_count as f64 * (horizon_min - last.time);
    weighted / horizon_min
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "City KPIs")?;
        writeln!(f, "  avg wait time       {:>10.2} min", self.city.avg_wait_time)?;
        writeln!(f, "  lost swaps          {:>10.2} %", self.city.lost_swaps_pct)?;
        writeln!(
            f,
            "  charger utilization {:>10.1} %",
            self.city.charger_utilization * 100.0
        )?;
        writeln!(
            f,
            "  idle inventory      {:>10.2} %",
            self.city.idle_inventory_pct
        )?;
        writeln!(f, "  throughput          {:>10.1} swaps/hr", self.city.throughput)?;
        writeln!(f, "  cost proxy          {:>10.2}", self.city.cost_proxy)?;
        writeln!(
            f,
            "  arrivals {} | swaps {} | lost {}",
            self.city.total_arrivals, self.city.total_swaps, self.city.total_lost
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "  {:<20} {:>8} {:>8} {:>8} {:>10} {:>8} {:>10}",
            "station", "arrivals", "swaps", "lost", "wait(min)", "util", "inventory"
        )?;
        for s in &self.stations {
            writeln!(
                f,
                "  {:<20} {:>8} {:>8} {:>8} {:>10.2} {:>7.1}% {:>10.1}",
                s.station_id,
                s.total_arrivals,
                s.successful_swaps,
                s.lost_swaps,
                s.avg_wait_time,
                s.charger_utilization * 100.0,
                s.avg_charged_inventory
            )?;
        }
        Ok(())
    }
}
