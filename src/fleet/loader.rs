//! Load fleet and portfolio snapshots from CSV
//!
//! Expected columns: `Year,Category,Units`. Unit values that are negative,
//! blank or not numbers are coerced to zero here so the engine never sees
//! them.

use std::io::Read;
use std::path::Path;

use csv::Reader;
use log::warn;

use super::FleetSnapshot;
use crate::error::Result;

/// Raw CSV row matching the snapshot columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Year")]
    year: u32,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Units")]
    units: String,
}

impl CsvRow {
    /// Unit count with invalid input forced to zero
    fn coerced_units(&self) -> u32 {
        match self.units.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => {
                value.round().min(u32::MAX as f64) as u32
            }
            _ => {
                warn!(
                    "coercing invalid unit count '{}' for {} in {} to 0",
                    self.units, self.category, self.year
                );
                0
            }
        }
    }
}

/// Load a snapshot from a CSV file
pub fn load_fleet<P: AsRef<Path>>(path: P) -> Result<FleetSnapshot> {
    let reader = Reader::from_path(path)?;
    read_rows(reader)
}

/// Load a snapshot from any reader (e.g., string buffer)
pub fn load_fleet_from_reader<R: Read>(reader: R) -> Result<FleetSnapshot> {
    read_rows(Reader::from_reader(reader))
}

fn read_rows<R: Read>(mut reader: Reader<R>) -> Result<FleetSnapshot> {
    let mut fleet = FleetSnapshot::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let units = row.coerced_units();
        fleet.set_units(row.year, row.category.trim(), units);
    }

    Ok(fleet)
}
