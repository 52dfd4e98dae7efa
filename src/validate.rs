//! Validation of computed city KPIs against reference values.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::sim::kpi::CityKpis;

const WAIT_TIME_TOLERANCE: f64 = 0.15;
const LOST_SWAPS_TOLERANCE: f64 = 0.15;
const UTILIZATION_TOLERANCE: f64 = 0.10;

/// Values below this count as matching a zero reference.
const NEAR_ZERO: f64 = 0.01;

/// Reference city KPIs to validate a run against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceKpis {
    pub avg_wait_time: f64,
    pub lost_swaps_pct: f64,
    pub charger_utilization: f64,
}

impl ReferenceKpis {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError {
            field: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError {
            field: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// One metric's comparison outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCheck {
    pub name: String,
    pub computed: f64,
    pub reference: f64,
    /// Relative variance in percent (absolute value when the reference
    /// is zero).
    pub variance_pct: f64,
    pub tolerance_pct: f64,
    pub passed: bool,
}

/// All metric checks plus the overall verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub metrics: Vec<MetricCheck>,
}

impl ValidationReport {
    /// Checks wait time, lost-swap percentage, and utilization against
    /// the reference within their tolerance bands. A zero reference is
    /// matched by any computed value below the near-zero cutoff.
    pub fn check(computed: &CityKpis, reference: &ReferenceKpis) -> Self {
        let metrics = vec![
            check_metric(
                "avg_wait_time",
                computed.avg_wait_time,
                reference.avg_wait_time,
                WAIT_TIME_TOLERANCE,
            ),
            check_metric(
                "lost_swaps_pct",
                computed.lost_swaps_pct,
                reference.lost_swaps_pct,
                LOST_SWAPS_TOLERANCE,
            ),
            check_metric(
                "charger_utilization",
                computed.charger_utilization,
                reference.charger_utilization,
                UTILIZATION_TOLERANCE,
            ),
        ];
        let passed = metrics.iter().all(|m| m.passed);
        Self { passed, metrics }
    }
}

fn check_metric(name: &str, computed: f64, reference: f64, tolerance: f64) -> MetricCheck {
    let (variance, passed) = if reference == 0.0 {
        (computed.abs(), computed.abs() < NEAR_ZERO)
    } else {
        let variance = (computed - reference).abs() / reference;
        (variance, variance <= tolerance)
    };
    MetricCheck {
        name: name.to_string(),
        computed: round3(computed),
        reference: round3(reference),
        variance_pct: round2(variance * 100.0),
        tolerance_pct: round1(tolerance * 100.0),
        passed,
    }
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

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Baseline validation")?;
        for metric in &self.metrics {
            let status = if metric.passed { "PASS" } else { "FAIL" };
            writeln!(
                f,
                "  {:<22} {}  computed {} vs reference {} (variance {}%, tolerance {}%)",
                metric.name,
                status,
                metric.computed,
                metric.reference,
                metric.variance_pct,
                metric.tolerance_pct
            )?;
        }
        writeln!(
            f,
            "  overall {}",
            if self.passed { "PASS" } else { "FAIL" }
        )
    }
}
