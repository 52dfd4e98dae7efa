//! Scenario application: baseline + delta -> modified configuration.
//!
//! The applicator never mutates the baseline it is given; it clones the
//! whole configuration and edits the clone. Application is atomic: any
//! error aborts the whole apply and nothing is returned, so callers can
//! never observe a half-modified configuration.

use std::fmt;

use crate::config::{
    BaselineConfig, ReplenishmentPolicy, ScenarioDelta, StationConfig, Tier,
};

/// Error raised while applying a scenario delta.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioError {
    /// A `modify_stations` entry names an attribute stations do not have.
    UnknownAttribute {
        station_id: String,
        attribute: String,
    },
    /// An `operations_override` entry names a parameter that does not
    /// exist.
    UnknownParameter { parameter: String },
    /// A replenishment policy names a station not present after
    /// additions and removals.
    UnknownStation { station_id: String },
    /// An override value has the wrong type for its target attribute.
    InvalidValue {
        attribute: String,
        expected: &'static str,
    },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::UnknownAttribute {
                station_id,
                attribute,
            } => write!(
                f,
                "station {station_id} has no attribute \"{attribute}\""
            ),
            ScenarioError::UnknownParameter { parameter } => {
                write!(f, "operations has no parameter \"{parameter}\"")
            }
            ScenarioError::UnknownStation { station_id } => {
                write!(f, "no station with id \"{station_id}\"")
            }
            ScenarioError::InvalidValue {
                attribute,
                expected,
            } => write!(f, "attribute \"{attribute}\" expects {expected}"),
        }
    }
}

impl std::error::Error for ScenarioError {}

/// Applies a scenario delta to a baseline and returns the modified copy.
///
/// Steps run in a fixed order because later steps can depend on the
/// station list produced by earlier ones: add stations, remove stations,
/// per-station attribute overrides, demand multiplier, operational
/// overrides, weather modifiers, event modifiers, replenishment
/// policies.
///
/// # Errors
///
/// Returns a [`ScenarioError`] on any unknown attribute, unknown
/// operational parameter, unknown replenishment target, or wrongly typed
/// value. The baseline is untouched either way.
pub fn apply(
    baseline: &BaselineConfig,
    delta: &ScenarioDelta,
) -> Result<BaselineConfig, ScenarioError> {
    let mut modified = baseline.clone();

    // 1. Additions.
    modified.stations.extend(delta.add_stations.iter().cloned());

    // 2. Removals.
    modified
        .stations
        .retain(|s| !delta.remove_station_ids.contains(&s.station_id));

    // 3. Per-station attribute overrides. Overrides for ids not present
    //    in the station list are skipped.
    for station in &mut modified.stations {
        if let Some(changes) = delta.modify_stations.get(&station.station_id) {
            for (attribute, value) in changes {
                set_station_attribute(station, attribute, value)?;
            }
        }
    }

    // 4. Demand multiplier (overwrite, not compose).
    if let Some(multiplier) = delta.demand_multiplier {
        modified.demand.scenario_multiplier = multiplier;
    }

    // 5. Operational overrides by name.
    for (parameter, value) in &delta.operations_override {
        set_operations_parameter(&mut modified, parameter, value)?;
    }

    // 6. Weather modifiers append.
    modified
        .demand
        .weather_modifiers
        .extend(delta.weather_modifiers.iter().cloned());

    // 7. Event modifiers append.
    modified
        .demand
        .event_modifiers
        .extend(delta.event_modifiers.iter().cloned());

    // 8. Replenishment policies: one named station, or every station.
    for policy in &delta.replenishment_policies {
        let applied = ReplenishmentPolicy {
            threshold: policy.threshold,
            amount: policy.amount,
            delay: policy.delay,
        };
        match &policy.station_id {
            Some(id) => {
                let station = modified
                    .stations
                    .iter_mut()
                    .find(|s| &s.station_id == id)
                    .ok_or_else(|| ScenarioError::UnknownStation {
                        station_id: id.clone(),
                    })?;
                station.replenishment = Some(applied);
            }
            None => {
                for station in &mut modified.stations {
                    station.replenishment = Some(applied.clone());
                }
            }
        }
    }

    Ok(modified)
}

/// Explicit per-field update table for station attribute overrides.
/// The set of names is closed; anything else fails fast.
fn set_station_attribute(
    station: &mut StationConfig,
    attribute: &str,
    value: &toml::Value,
) -> Result<(), ScenarioError> {
    match attribute {
        "station_id" => station.station_id = as_string(attribute, value)?,
        "tier" => station.tier = as_tier(attribute, value)?,
        "chargers" => station.chargers = as_u32(attribute, value)?,
        "inventory_capacity" => station.inventory_capacity = as_u32(attribute, value)?,
        "lat" => station.lat = as_f64(attribute, value)?,
        "lon" => station.lon = as_f64(attribute, value)?,
        "initial_charged" => station.initial_charged = Some(as_u32(attribute, value)?),
        _ => {
            return Err(ScenarioError::UnknownAttribute {
                station_id: station.station_id.clone(),
                attribute: attribute.to_string(),
            });
        }
    }
    Ok(())
}

/// Update table for operational-parameter overrides.
fn set_operations_parameter(
    config: &mut BaselineConfig,
    parameter: &str,
    value: &toml::Value,
) -> Result<(), ScenarioError> {
    let ops = &mut config.operations;
    match parameter {
        "swap_duration" => ops.swap_duration = as_f64(parameter, value)?,
        "charge_duration" => ops.charge_duration = as_f64(parameter, value)?,
        "replenishment_threshold" => {
            ops.replenishment_threshold = as_f64(parameter, value)?;
        }
        "replenishment_amount" => ops.replenishment_amount = as_u32(parameter, value)?,
        "replenishment_delay" => ops.replenishment_delay = as_f64(parameter, value)?,
        "max_wait_time" => ops.max_wait_time = as_f64(parameter, value)?,
        _ => {
            return Err(ScenarioError::UnknownParameter {
                parameter: parameter.to_string(),
            });
        }
    }
    Ok(())
}

fn as_f64(attribute: &str, value: &toml::Value) -> Result<f64, ScenarioError> {
    match value {
        toml::Value::Float(f) => Ok(*f),
        toml::Value::Integer(i) => Ok(*i as f64),
        _ => Err(ScenarioError::InvalidValue {
            attribute: attribute.to_string(),
            expected: "a number",
        }),
    }
}

fn as_u32(attribute: &str, value: &toml::Value) -> Result<u32, ScenarioError> {
    match value {
        toml::Value::Integer(i) if *i >= 0 && *i <= u32::MAX as i64 => Ok(*i as u32),
        _ => Err(ScenarioError::InvalidValue {
            attribute: attribute.to_string(),
            expected: "a non-negative integer",
        }),
    }
}

fn as_string(attribute: &str, value: &toml::Value) -> Result<String, ScenarioError> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        _ => Err(ScenarioError::InvalidValue {
            attribute: attribute.to_string(),
            expected: "a string",
        }),
    }
}

fn as_tier(attribute: &str, value: &toml::Value) -> Result<Tier, ScenarioError> {
    match value {
        toml::Value::String(s) => match s.as_str() {
            "high" => Ok(Tier::High),
            "medium" => Ok(Tier::Medium),
            "low" => Ok(Tier::Low),
            _ => Err(ScenarioError::InvalidValue {
                attribute: attribute.to_string(),
                expected: "one of \"high\", \"medium\", \"low\"",
            }),
        },
        _ => Err(ScenarioError::InvalidValue {
            attribute: attribute.to_string(),
            expected: "one of \"high\", \"medium\", \"low\"",
        }),
    }
}
