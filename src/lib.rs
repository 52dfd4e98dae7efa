//! Discrete-event simulator for a city-scale battery-swap station network.

pub mod config;
pub mod geo;
/// CSV and JSON export of run outputs.
pub mod io;
pub mod scenario;
/// Event queue, stations, demand generation, engine, KPI, and cost modules.
pub mod sim;
pub mod validate;
