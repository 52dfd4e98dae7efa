/// Cost model for capital/operational/revenue breakdowns.
pub mod cost;
pub mod demand;
pub mod engine;
pub mod kpi;
/// Time-keyed event queue with deterministic tie-breaking.
pub mod queue;
/// Hourly and fine-grained timeline snapshot recording.
pub mod recorder;
pub mod station;
