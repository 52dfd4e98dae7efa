//! TOML-based baseline/scenario configuration and preset definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Demand-intensity classification of a station.
///
/// The tier selects the station's base arrival rate from
/// [`DemandConfig::base_rates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    /// Lowercase name as used in config files and result bundles.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replenishment policy attached to a station by a scenario override.
///
/// Inert in the closed-loop station model (the battery pool is fixed at
/// `chargers` units), but carried through configuration so scenario
/// deltas round-trip losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplenishmentPolicy {
    /// Inventory fraction below which replenishment would trigger.
    pub threshold: f64,
    /// Number of batteries per replenishment.
    pub amount: u32,
    /// Minutes until a replenishment arrives.
    pub delay: f64,
}

/// Configuration for a single swap station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationConfig {
    /// Business key, unique within a baseline.
    pub station_id: String,
    /// Demand tier driving the base arrival rate.
    pub tier: Tier,
    /// Number of parallel chargers. In the closed-loop model this is also
    /// the size of the physical battery pool.
    pub chargers: u32,
    /// Maximum battery inventory.
    pub inventory_capacity: u32,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Initially charged batteries; defaults to `inventory_capacity`.
    #[serde(default)]
    pub initial_charged: Option<u32>,
    /// Optional scenario-applied replenishment policy (inert, see
    /// [`ReplenishmentPolicy`]).
    #[serde(default)]
    pub replenishment: Option<ReplenishmentPolicy>,
}

impl StationConfig {
    /// Initially charged count with the capacity default applied.
    pub fn effective_initial_charged(&self) -> u32 {
        self.initial_charged.unwrap_or(self.inventory_capacity)
    }
}

/// Base arrival rates per station tier, in swaps per hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseRates {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for BaseRates {
    fn default() -> Self {
        Self {
            high: 20.0,
            medium: 12.0,
            low: 6.0,
        }
    }
}

impl BaseRates {
    /// Rate for the given tier.
    pub fn for_tier(&self, tier: Tier) -> f64 {
        match tier {
            Tier::High => self.high,
            Tier::Medium => self.medium,
            Tier::Low => self.low,
        }
    }
}

/// Global demand multiplier active during an hour-of-day window.
///
/// Windows are `[start_hour, end_hour)` and wrap midnight when
/// `start_hour > end_hour`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherModifier {
    pub multiplier: f64,
    pub start_hour: u32,
    pub end_hour: u32,
}

/// Geo-scoped demand multiplier: active during an hour window and only
/// for stations within `radius_km` of the event location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventModifier {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub multiplier: f64,
    pub start_hour: u32,
    pub end_hour: u32,
}

/// Explicit factory for the default time-of-day multiplier table.
///
/// Hour buckets 0..24; evening peak at 18:00, overnight trough.
pub fn default_time_multipliers() -> [f64; 24] {
    [
        0.3, 0.2, 0.2, 0.2, 0.3, 0.5, // 00-05
        0.8, 1.2, 1.5, 1.3, 1.1, 1.0, // 06-11
        1.0, 0.9, 0.9, 1.0, 1.2, 1.5, // 12-17
        1.8, 1.6, 1.3, 1.0, 0.7, 0.5, // 18-23
    ]
}

/// Configuration for the demand arrival process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Base arrival rates per station tier (swaps/hour).
    pub base_rates: BaseRates,
    /// 24 hourly multipliers keyed by hour-of-day.
    pub time_multipliers: [f64; 24],
    /// Scalar multiplier set by scenario application (overwritten, not
    /// composed).
    pub scenario_multiplier: f64,
    /// Time-windowed global modifiers, applied multiplicatively.
    pub weather_modifiers: Vec<WeatherModifier>,
    /// Time-windowed geo-scoped modifiers, applied multiplicatively.
    pub event_modifiers: Vec<EventModifier>,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            base_rates: BaseRates::default(),
            time_multipliers: default_time_multipliers(),
            scenario_multiplier: 1.0,
            weather_modifiers: Vec::new(),
            event_modifiers: Vec::new(),
        }
    }
}

/// Operational parameters shared by all stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationalConfig {
    /// Swap handling time in minutes.
    pub swap_duration: f64,
    /// Full charge cycle time in minutes.
    pub charge_duration: f64,
    /// Inventory fraction triggering replenishment (inert in the
    /// closed-loop model).
    pub replenishment_threshold: f64,
    /// Batteries per replenishment (inert).
    pub replenishment_amount: u32,
    /// Minutes until replenishment arrives (inert).
    pub replenishment_delay: f64,
    /// Longest a customer waits for a charged battery before leaving,
    /// in minutes.
    pub max_wait_time: f64,
}

impl Default for OperationalConfig {
    fn default() -> Self {
        Self {
            swap_duration: 2.0,
            charge_duration: 210.0,
            replenishment_threshold: 0.2,
            replenishment_amount: 10,
            replenishment_delay: 30.0,
            max_wait_time: 15.0,
        }
    }
}

/// Complete baseline configuration: the aggregate root fed to the engine.
///
/// Load from TOML with [`BaselineConfig::from_toml_file`] or use
/// [`BaselineConfig::baseline_city`] for the built-in default network.
/// The engine treats a baseline as read-only; only the scenario
/// applicator produces modified copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaselineConfig {
    /// Ordered station list; order fixes process creation order and
    /// therefore RNG draw order.
    pub stations: Vec<StationConfig>,
    /// Demand process configuration.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Operational parameters.
    #[serde(default)]
    pub operations: OperationalConfig,
    /// Horizon in hours; when set it overrides `simulation_duration`.
    #[serde(default)]
    pub duration_hours: Option<f64>,
    /// Horizon in minutes (default one day).
    #[serde(default = "default_simulation_duration")]
    pub simulation_duration: f64,
    /// Master random seed.
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
}

fn default_simulation_duration() -> f64 {
    1440.0
}

fn default_random_seed() -> u64 {
    42
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"stations[2].initial_charged"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl BaselineConfig {
    /// Simulation horizon in minutes, with `duration_hours` taking
    /// precedence when present.
    pub fn horizon_min(&self) -> f64 {
        match self.duration_hours {
            Some(hours) => hours * 60.0,
            None => self.simulation_duration,
        }
    }

    /// Returns the built-in three-station baseline network.
    pub fn baseline_city() -> Self {
        Self {
            stations: vec![
                StationConfig {
                    station_id: "STN_KORAMANGALA".to_string(),
                    tier: Tier::High,
                    chargers: 10,
                    inventory_capacity: 10,
                    lat: 12.9352,
                    lon: 77.6245,
                    initial_charged: None,
                    replenishment: None,
                },
                StationConfig {
                    station_id: "STN_INDIRANAGAR".to_string(),
                    tier: Tier::Medium,
                    chargers: 8,
                    inventory_capacity: 8,
                    lat: 12.9719,
                    lon: 77.6412,
                    initial_charged: None,
                    replenishment: None,
                },
                StationConfig {
                    station_id: "STN_WHITEFIELD".to_string(),
                    tier: Tier::Low,
                    chargers: 6,
                    inventory_capacity: 6,
                    lat: 12.9698,
                    lon: 77.7500,
                    initial_charged: None,
                    replenishment: None,
                },
            ],
            demand: DemandConfig::default(),
            operations: OperationalConfig::default(),
            duration_hours: None,
            simulation_duration: 1440.0,
            random_seed: 42,
        }
    }

    /// Available baseline preset names.
    pub const PRESETS: &[&str] = &["baseline_city"];

    /// Loads a baseline from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline_city" => Ok(Self::baseline_city()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a baseline from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "baseline".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a baseline from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid. Invalid
    /// configurations must never reach the engine.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.stations.is_empty() {
            errors.push(ConfigError {
                field: "stations".into(),
                message: "at least one station required".into(),
            });
        }
        if self.horizon_min() <= 0.0 {
            let field = if self.duration_hours.is_some() {
                "duration_hours"
            } else {
                "simulation_duration"
            };
            errors.push(ConfigError {
                field: field.into(),
                message: "must be > 0".into(),
            });
        }

        let mut seen_ids: Vec<&str> = Vec::new();
        for (i, s) in self.stations.iter().enumerate() {
            if seen_ids.contains(&s.station_id.as_str()) {
                errors.push(ConfigError {
                    field: format!("stations[{i}].station_id"),
                    message: format!("duplicate station_id \"{}\"", s.station_id),
                });
            }
            seen_ids.push(&s.station_id);

            if s.inventory_capacity == 0 {
                errors.push(ConfigError {
                    field: format!("stations[{i}].inventory_capacity"),
                    message: "must be > 0".into(),
                });
            }
            if let Some(charged) = s.initial_charged
                && charged > s.inventory_capacity
            {
                errors.push(ConfigError {
                    field: format!("stations[{i}].initial_charged"),
                    message: format!(
                        "must be <= inventory_capacity ({})",
                        s.inventory_capacity
                    ),
                });
            }
            if !(-90.0..=90.0).contains(&s.lat) || !(-180.0..=180.0).contains(&s.lon) {
                errors.push(ConfigError {
                    field: format!("stations[{i}].lat"),
                    message: "coordinates out of range".into(),
                });
            }
        }

        let d = &self.demand;
        if d.base_rates.high < 0.0 || d.base_rates.medium < 0.0 || d.base_rates.low < 0.0 {
            errors.push(ConfigError {
                field: "demand.base_rates".into(),
                message: "rates must be >= 0".into(),
            });
        }
        if d.time_multipliers.iter().any(|&m| m < 0.0) {
            errors.push(ConfigError {
                field: "demand.time_multipliers".into(),
                message: "multipliers must be >= 0".into(),
            });
        }
        if d.scenario_multiplier < 0.0 {
            errors.push(ConfigError {
                field: "demand.scenario_multiplier".into(),
                message: "must be >= 0".into(),
            });
        }
        for (i, w) in d.weather_modifiers.iter().enumerate() {
            if w.multiplier < 0.0 {
                errors.push(ConfigError {
                    field: format!("demand.weather_modifiers[{i}].multiplier"),
                    message: "must be >= 0".into(),
                });
            }
            if w.start_hour > 24 || w.end_hour > 24 {
                errors.push(ConfigError {
                    field: format!("demand.weather_modifiers[{i}]"),
                    message: "hours must be in 0..=24".into(),
                });
            }
        }
        for (i, e) in d.event_modifiers.iter().enumerate() {
            if e.multiplier < 0.0 || e.radius_km < 0.0 {
                errors.push(ConfigError {
                    field: format!("demand.event_modifiers[{i}]"),
                    message: "multiplier and radius_km must be >= 0".into(),
                });
            }
            if e.start_hour > 24 || e.end_hour > 24 {
                errors.push(ConfigError {
                    field: format!("demand.event_modifiers[{i}]"),
                    message: "hours must be in 0..=24".into(),
                });
            }
        }

        let ops = &self.operations;
        if ops.swap_duration < 0.0 {
            errors.push(ConfigError {
                field: "operations.swap_duration".into(),
                message: "must be >= 0".into(),
            });
        }
        if ops.charge_duration <= 0.0 {
            errors.push(ConfigError {
                field: "operations.charge_duration".into(),
                message: "must be > 0".into(),
            });
        }
        if ops.max_wait_time <= 0.0 {
            errors.push(ConfigError {
                field: "operations.max_wait_time".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }
}

/// Replenishment-policy intervention from a scenario delta.
///
/// Targets one station by id, or every station when `station_id` is
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplenishmentOverride {
    #[serde(default)]
    pub station_id: Option<String>,
    pub threshold: f64,
    pub amount: u32,
    pub delay: f64,
}

/// Named set of edits transforming a baseline into a what-if alternative.
///
/// Transient: constructed from a file or request, applied once by
/// [`crate::scenario::apply`], then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioDelta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Full station definitions appended to the baseline.
    #[serde(default)]
    pub add_stations: Vec<StationConfig>,
    /// Station ids removed after additions.
    #[serde(default)]
    pub remove_station_ids: Vec<String>,
    /// Per-station attribute overrides: `station_id -> {attribute: value}`.
    #[serde(default)]
    pub modify_stations: BTreeMap<String, BTreeMap<String, toml::Value>>,
    /// Overwrites the demand config's scenario multiplier when present.
    #[serde(default)]
    pub demand_multiplier: Option<f64>,
    /// Operational-parameter overrides by name.
    #[serde(default)]
    pub operations_override: BTreeMap<String, toml::Value>,
    /// Weather modifiers appended to the demand config.
    #[serde(default)]
    pub weather_modifiers: Vec<WeatherModifier>,
    /// Geo-scoped event modifiers appended to the demand config.
    #[serde(default)]
    pub event_modifiers: Vec<EventModifier>,
    /// Replenishment-policy interventions.
    #[serde(default)]
    pub replenishment_policies: Vec<ReplenishmentOverride>,
}

impl ScenarioDelta {
    /// Empty delta with just a name; applying it reproduces the baseline.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            add_stations: Vec::new(),
            remove_station_ids: Vec::new(),
            modify_stations: BTreeMap::new(),
            demand_multiplier: None,
            operations_override: BTreeMap::new(),
            weather_modifiers: Vec::new(),
            event_modifiers: Vec::new(),
            replenishment_policies: Vec::new(),
        }
    }

    /// Returns the rush-hour preset: a 50% network-wide demand shock.
    pub fn rush_hour() -> Self {
        Self {
            description: "Network-wide demand surge".to_string(),
            demand_multiplier: Some(1.5),
            ..Self::named("rush_hour")
        }
    }

    /// Returns the heatwave preset: doubled demand through the afternoon.
    pub fn heatwave() -> Self {
        Self {
            description: "Afternoon heatwave doubles swap demand".to_string(),
            weather_modifiers: vec![WeatherModifier {
                multiplier: 2.0,
                start_hour: 12,
                end_hour: 18,
            }],
            ..Self::named("heatwave")
        }
    }

    /// Available scenario preset names.
    pub const PRESETS: &[&str] = &["rush_hour", "heatwave"];

    /// Loads a scenario delta from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "rush_hour" => Ok(Self::rush_hour()),
            "heatwave" => Ok(Self::heatwave()),
            _ => Err(ConfigError {
                field: "scenario preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario delta from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario delta from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_city_preset_valid() {
        let cfg = BaselineConfig::baseline_city();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = BaselineConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn horizon_prefers_duration_hours() {
        let mut cfg = BaselineConfig::baseline_city();
        assert_eq!(cfg.horizon_min(), 1440.0);
        cfg.duration_hours = Some(2.0);
        assert_eq!(cfg.horizon_min(), 120.0);
    }

    #[test]
    fn initial_charged_defaults_to_capacity() {
        let s = &BaselineConfig::baseline_city().stations[0];
        assert_eq!(s.effective_initial_charged(), s.inventory_capacity);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
simulation_duration = 720.0
random_seed = 7

[[stations]]
station_id = "STN_A"
tier = "high"
chargers = 4
inventory_capacity = 4
lat = 12.9
lon = 77.6
initial_charged = 2

[demand]
scenario_multiplier = 1.2

[demand.base_rates]
high = 18.0
medium = 10.0
low = 5.0

[operations]
swap_duration = 3.0
max_wait_time = 10.0
"#;
        let cfg = BaselineConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.stations.len()), Some(1));
        assert_eq!(cfg.as_ref().map(|c| c.random_seed), Some(7));
        assert_eq!(cfg.as_ref().map(|c| c.demand.base_rates.high), Some(18.0));
        assert_eq!(cfg.as_ref().map(|c| c.operations.swap_duration), Some(3.0));
        // Unset operational fields keep their defaults.
        assert_eq!(
            cfg.as_ref().map(|c| c.operations.charge_duration),
            Some(210.0)
        );
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
bogus_field = true

[[stations]]
station_id = "STN_A"
tier = "low"
chargers = 1
inventory_capacity = 1
lat = 0.0
lon = 0.0
"#;
        let result = BaselineConfig::from_toml_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_empty_stations() {
        let mut cfg = BaselineConfig::baseline_city();
        cfg.stations.clear();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "stations"));
    }

    #[test]
    fn validation_catches_overfull_initial_charged() {
        let mut cfg = BaselineConfig::baseline_city();
        cfg.stations[0].initial_charged = Some(cfg.stations[0].inventory_capacity + 1);
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "stations[0].initial_charged")
        );
    }

    #[test]
    fn validation_catches_duplicate_station_ids() {
        let mut cfg = BaselineConfig::baseline_city();
        let dup = cfg.stations[0].clone();
        cfg.stations.push(dup);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.message.contains("duplicate")));
    }

    #[test]
    fn validation_catches_zero_horizon() {
        let mut cfg = BaselineConfig::baseline_city();
        cfg.duration_hours = Some(0.0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "duration_hours"));
    }

    #[test]
    fn scenario_presets_load() {
        for name in ScenarioDelta::PRESETS {
            let delta = ScenarioDelta::from_preset(name);
            assert!(delta.is_ok(), "preset \"{name}\" should load");
        }
    }

    #[test]
    fn scenario_toml_parses() {
        let toml = r#"
name = "close_whitefield"
description = "Remove the low-tier station and boost demand"
remove_station_ids = ["STN_WHITEFIELD"]
demand_multiplier = 1.3

[modify_stations.STN_KORAMANGALA]
chargers = 12

[operations_override]
max_wait_time = 20.0

[[weather_modifiers]]
multiplier = 0.5
start_hour = 22
end_hour = 6

[[replenishment_policies]]
threshold = 0.3
amount = 5
delay = 45.0
"#;
        let delta = ScenarioDelta::from_toml_str(toml);
        assert!(
            delta.is_ok(),
            "scenario TOML should parse: {:?}",
            delta.err()
        );
        let delta = delta.ok();
        assert_eq!(delta.as_ref().map(|d| d.remove_station_ids.len()), Some(1));
        assert_eq!(delta.as_ref().map(|d| d.demand_multiplier), Some(Some(1.3)));
        assert_eq!(
            delta
                .as_ref()
                .map(|d| d.replenishment_policies[0].station_id.clone()),
            Some(None)
        );
    }

    #[test]
    fn time_multiplier_factory_returns_fresh_table() {
        let mut a = default_time_multipliers();
        let b = default_time_multipliers();
        a[0] = 99.0;
        assert_eq!(a[0], 99.0);
        assert_eq!(b[0], 0.3);
    }
}
