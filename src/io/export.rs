//! CSV export for the energy history.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::EnergyLogRecord;

/// Column header for history export.
const HEADER: &str = "timestamp,solar_kw,wind_kw,total_generation_kw,consumption_kw,\
                      battery_percent,grid_import_kw,grid_export_kw,\
                      efficiency_percent,temperature_c,weather";

/// Exports history records to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv<'a>(
    records: impl IntoIterator<Item = &'a EnergyLogRecord>,
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes history records as CSV to any writer, oldest first as given.
///
/// Timestamps are RFC 3339 in UTC; power columns keep two decimals, the
/// percentage and temperature columns one.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv<'a>(
    records: impl IntoIterator<Item = &'a EnergyLogRecord>,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.timestamp.to_rfc3339(),
            format!("{:.2}", r.solar_kw),
            format!("{:.2}", r.wind_kw),
            format!("{:.2}", r.total_generation_kw),
            format!("{:.2}", r.consumption_kw),
            format!("{:.1}", r.battery_percent),
            format!("{:.2}", r.grid_import_kw),
            format!("{:.2}", r.grid_export_kw),
            format!("{:.1}", r.efficiency_percent),
            format!("{:.1}", r.temperature_c),
            r.weather.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
