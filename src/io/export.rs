//! CSV and JSON export of simulation outputs.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::cost::CostBreakdown;
use crate::sim::engine::SimulationResult;
use crate::sim::kpi::KpiReport;
use crate::sim::recorder::TimelineFrame;

/// Column header for timeline CSV export, one row per station per frame.
const TIMELINE_HEADER: &str = "timestamp_min,station_id,queue_length,batteries_available,\
                               chargers_in_use,swaps_completed,swaps_lost";

/// Exports timeline frames to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_timeline_csv(frames: &[TimelineFrame], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_timeline_csv(frames, buf)
}

/// Writes timeline frames as CSV to any writer. Each frame becomes one
/// row per station, frames in time order, stations in network order.
pub fn write_timeline_csv(frames: &[TimelineFrame], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(TIMELINE_HEADER.split(',').map(str::trim))?;

    for frame in frames {
        for station in &frame.stations {
            wtr.write_record(&[
                format!("{:.1}", frame.timestamp_min),
                station.station_id.clone(),
                station.queue_length.to_string(),
                station.batteries_available.to_string(),
                station.chargers_in_use.to_string(),
                station.swaps_completed.to_string(),
                station.swaps_lost.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Everything a run produced, bundled for a single JSON document.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub results: &'a SimulationResult,
    pub kpis: &'a KpiReport,
    pub costs: serde_json::Value,
}

impl<'a> RunReport<'a> {
    pub fn new(results: &'a SimulationResult, kpis: &'a KpiReport, costs: &CostBreakdown) -> Self {
        Self {
            results,
            kpis,
            costs: costs.to_json(),
        }
    }
}

/// Writes the full run report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn export_report_json(report: &RunReport<'_>, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    serde_json::to_writer_pretty(buf, report).map_err(io::Error::from)
}
