//! Cost and revenue breakdown derived from a finished run.

use std::fmt;

use serde::Serialize;

use crate::config::BaselineConfig;
use crate::sim::engine::SimulationResult;
use crate::sim::station::ChargeEventType;

/// Unit costs, all in rupees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostParameters {
    /// One-time cost per charger installed.
    pub cost_per_charger: f64,
    /// One-time cost per battery in the pool.
    pub cost_per_battery: f64,
    /// Handling cost per successful swap.
    pub cost_per_swap: f64,
    /// Cost per stock replenishment trip.
    pub cost_per_replenishment: f64,
    /// Electricity per completed battery charge.
    pub electricity_cost_per_charge: f64,
    /// Staffing per station-hour.
    pub labor_cost_per_hour: f64,
    /// Income per successful swap.
    pub revenue_per_swap: f64,
    /// Upkeep per charger per day.
    pub maintenance_cost_per_charger_daily: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            cost_per_charger: 50_000.0,
            cost_per_battery: 15_000.0,
            cost_per_swap: 20.0,
            cost_per_replenishment: 500.0,
            electricity_cost_per_charge: 30.0,
            labor_cost_per_hour: 200.0,
            revenue_per_swap: 150.0,
            maintenance_cost_per_charger_daily: 50.0,
        }
    }
}

/// Replenishment trips assumed per station per simulated day.
const REPLENISHMENTS_PER_STATION_DAY: f64 = 3.0;

/// Full cost picture for one run at one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub charger_capital: f64,
    pub inventory_capital: f64,
    pub total_capital: f64,

    pub swap_operations_cost: f64,
    pub charging_cost: f64,
    pub labor_cost: f64,
    pub maintenance_cost: f64,
    pub replenishment_cost: f64,
    pub total_operational: f64,

    /// Revenue forgone on rejected swaps.
    pub lost_revenue: f64,
    pub total_revenue: f64,

    pub net_operational_profit: f64,
    /// Capital + operational + opportunity.
    pub total_cost: f64,
}

impl CostBreakdown {
    /// Computes the breakdown from run outputs and the configuration
    /// that produced them. Operational costs scale with the run's
    /// horizon; capital costs depend only on the configuration.
    pub fn calculate(
        results: &SimulationResult,
        config: &BaselineConfig,
        params: &CostParameters,
    ) -> Self {
        let total_chargers: u64 = config.stations.iter().map(|s| s.chargers as u64).sum();
        let total_inventory: u64 = config
            .stations
            .iter()
            .map(|s| s.inventory_capacity as u64)
            .sum();
        let num_stations = config.stations.len() as f64;

        let charger_capital = total_chargers as f64 * params.cost_per_charger;
        let inventory_capital = total_inventory as f64 * params.cost_per_battery;
        let total_capital = charger_capital + inventory_capital;

        let successful_swaps: u64 = results
            .stations
            .iter()
            .map(|s| s.stats.successful_swaps)
            .sum();
        let lost_swaps: u64 = results.stations.iter().map(|s| s.stats.rejected_swaps).sum();
        let completed_charges: u64 = results
            .stations
            .iter()
            .map(|s| {
                s.charge_events
                    .iter()
                    .filter(|e| e.event_type == ChargeEventType::ChargeEnd)
                    .count() as u64
            })
            .sum();

        let horizon_hours = results.duration_min / 60.0;
        let horizon_days = results.duration_min / 1_440.0;

        let swap_operations_cost = successful_swaps as f64 * params.cost_per_swap;
        let charging_cost = completed_charges as f64 * params.electricity_cost_per_charge;
        let labor_cost = num_stations * params.labor_cost_per_hour * horizon_hours;
        let maintenance_cost =
            total_chargers as f64 * params.maintenance_cost_per_charger_daily * horizon_days;
        let replenishment_cost = num_stations
            * REPLENISHMENTS_PER_STATION_DAY
            * horizon_days
            * params.cost_per_replenishment;
        let total_operational = swap_operations_cost
            + charging_cost
            + labor_cost
            + maintenance_cost
            + replenishment_cost;

        let lost_revenue = lost_swaps as f64 * params.revenue_per_swap;
        let total_revenue = successful_swaps as f64 * params.revenue_per_swap;

        Self {
            charger_capital,
            inventory_capital,
            total_capital,
            swap_operations_cost,
            charging_cost,
            labor_cost,
            maintenance_cost,
            replenishment_cost,
            total_operational,
            lost_revenue,
            total_revenue,
            net_operational_profit: total_revenue - total_operational,
            total_cost: total_capital + total_operational + lost_revenue,
        }
    }

    /// Nested serialization shape grouped by cost family, values
    /// rounded to paise.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "capital": {
                "chargers": round2(self.charger_capital),
                "inventory": round2(self.inventory_capital),
                "total": round2(self.total_capital),
            },
            "operational": {
                "swap_operations": round2(self.swap_operations_cost),
                "electricity": round2(self.charging_cost),
                "labor": round2(self.labor_cost),
                "maintenance": round2(self.maintenance_cost),
                "replenishment": round2(self.replenishment_cost),
                "total": round2(self.total_operational),
            },
            "opportunity": {
                "lost_revenue": round2(self.lost_revenue),
            },
            "revenue": {
                "total": round2(self.total_revenue),
            },
            "summary": {
                "net_operational_profit": round2(self.net_operational_profit),
                "total_cost": round2(self.total_cost),
            },
        })
    }
}

/// Scenario-minus-baseline differences between two breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostDelta {
    pub capital_delta: f64,
    pub operational_delta: f64,
    pub lost_revenue_delta: f64,
    pub revenue_delta: f64,
    pub profit_delta: f64,
    pub total_cost_delta: f64,
}

impl CostDelta {
    pub fn between(baseline: &CostBreakdown, scenario: &CostBreakdown) -> Self {
        Self {
            capital_delta: scenario.total_capital - baseline.total_capital,
            operational_delta: scenario.total_operational - baseline.total_operational,
            lost_revenue_delta: scenario.lost_revenue - baseline.lost_revenue,
            revenue_delta: scenario.total_revenue - baseline.total_revenue,
            profit_delta: scenario.net_operational_profit - baseline.net_operational_profit,
            total_cost_delta: scenario.total_cost - baseline.total_cost,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Capital (one-time)")?;
        writeln!(f, "  chargers        Rs {:>14.0}", self.charger_capital)?;
        writeln!(f, "  inventory       Rs {:>14.0}", self.inventory_capital)?;
        writeln!(f, "  total           Rs {:>14.0}", self.total_capital)?;
        writeln!(f, "Operational (run horizon)")?;
        writeln!(f, "  swap handling   Rs {:>14.0}", self.swap_operations_cost)?;
        writeln!(f, "  electricity     Rs {:>14.0}", self.charging_cost)?;
        writeln!(f, "  labor           Rs {:>14.0}", self.labor_cost)?;
        writeln!(f, "  maintenance     Rs {:>14.0}", self.maintenance_cost)?;
        writeln!(f, "  replenishment   Rs {:>14.0}", self.replenishment_cost)?;
        writeln!(f, "  total           Rs {:>14.0}", self.total_operational)?;
        writeln!(f, "Revenue & opportunity")?;
        writeln!(f, "  revenue         Rs {:>14.0}", self.total_revenue)?;
        writeln!(f, "  lost revenue    Rs {:>14.0}", self.lost_revenue)?;
        writeln!(f, "Summary")?;
        writeln!(f, "  net profit      Rs {:>14.0}", self.net_operational_profit)?;
        writeln!(f, "  total cost      Rs {:>14.0}", self.total_cost)
    }
}

impl fmt::Display for CostDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario vs baseline")?;
        writeln!(f, "  capital         Rs {:>+14.0}", self.capital_delta)?;
        writeln!(f, "  operational     Rs {:>+14.0}", self.operational_delta)?;
        writeln!(f, "  revenue         Rs {:>+14.0}", self.revenue_delta)?;
        writeln!(f, "  lost revenue    Rs {:>+14.0}", self.lost_revenue_delta)?;
        writeln!(f, "  net profit      Rs {:>+14.0}", self.profit_delta)?;
        writeln!(f, "  total cost      Rs {:>+14.0}", self.total_cost_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::engine::simulate;

    fn day_run() -> (SimulationResult, BaselineConfig) {
        let config = BaselineConfig::baseline_city();
        (simulate(&config), config)
    }

    #[test]
    fn capital_follows_configuration_not_events() {
        let (results, config) = day_run();
        let costs = CostBreakdown::calculate(&results, &config, &CostParameters::default());
        // 24 chargers and 24 pool slots across the three stations.
        assert_eq!(costs.charger_capital, 24.0 * 50_000.0);
        assert_eq!(costs.inventory_capital, 24.0 * 15_000.0);
        assert_eq!(costs.total_capital, costs.charger_capital + costs.inventory_capital);
    }

    #[test]
    fn operational_scales_with_horizon() {
        let (results, config) = day_run();
        let params = CostParameters::default();
        let costs = CostBreakdown::calculate(&results, &config, &params);
        assert_eq!(costs.labor_cost, 3.0 * 200.0 * 24.0);
        assert_eq!(costs.maintenance_cost, 24.0 * 50.0);
        assert_eq!(costs.replenishment_cost, 3.0 * 3.0 * 500.0);
    }

    #[test]
    fn totals_are_internally_consistent() {
        let (results, config) = day_run();
        let costs = CostBreakdown::calculate(&results, &config, &CostParameters::default());
        let operational = costs.swap_operations_cost
            + costs.charging_cost
            + costs.labor_cost
            + costs.maintenance_cost
            + costs.replenishment_cost;
        assert!((costs.total_operational - operational).abs() < 1e-9);
        assert!(
            (costs.total_cost - (costs.total_capital + costs.total_operational + costs.lost_revenue))
                .abs()
                < 1e-9
        );
        assert!(
            (costs.net_operational_profit - (costs.total_revenue - costs.total_operational)).abs()
                < 1e-9
        );
    }

    #[test]
    fn delta_is_scenario_minus_baseline() {
        let (results, config) = day_run();
        let params = CostParameters::default();
        let baseline = CostBreakdown::calculate(&results, &config, &params);

        let mut bigger = config.clone();
        bigger.stations[0].chargers += 5;
        bigger.stations[0].inventory_capacity += 5;
        let scenario = CostBreakdown::calculate(&simulate(&bigger), &bigger, &params);

        let delta = CostDelta::between(&baseline, &scenario);
        assert_eq!(delta.capital_delta, 5.0 * 50_000.0 + 5.0 * 15_000.0);
        assert!(
            (delta.total_cost_delta - (scenario.total_cost - baseline.total_cost)).abs() < 1e-9
        );
    }

    #[test]
    fn json_shape_groups_by_cost_family() {
        let (results, config) = day_run();
        let costs = CostBreakdown::calculate(&results, &config, &CostParameters::default());
        let json = costs.to_json();
        assert!(json["capital"]["total"].is_number());
        assert!(json["operational"]["electricity"].is_number());
        assert!(json["summary"]["total_cost"].is_number());
    }
}
