//! JSON assumption loader
//!
//! Reads and writes the full `Assumptions` shape so a config file can be
//! generated from the defaults, edited, and fed back in.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use super::Assumptions;
use crate::error::Result;

/// Default location of a projection config file
pub const DEFAULT_CONFIG_PATH: &str = "config/projections.json";

/// Load assumptions from a JSON file without validating them
pub fn load_assumptions(path: &Path) -> Result<Assumptions> {
    let file = File::open(path)?;
    let assumptions: Assumptions = serde_json::from_reader(BufReader::new(file))?;
    debug!(
        "loaded {} divisions and {} years from {}",
        assumptions.divisions.len(),
        assumptions.years.len(),
        path.display()
    );
    Ok(assumptions)
}

/// Parse assumptions from a JSON string
pub fn parse_assumptions(json: &str) -> Result<Assumptions> {
    Ok(serde_json::from_str(json)?)
}

/// Write assumptions as pretty-printed JSON
pub fn write_assumptions(path: &Path, assumptions: &Assumptions) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, assumptions)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn test_defaults_round_trip_through_json() {
        let defaults = Assumptions::default_pricing();
        let json = serde_json::to_string(&defaults).unwrap();
        let parsed = parse_assumptions(&json).unwrap();
        assert_eq!(parsed, defaults);
    }

    #[test]
    fn test_custom_utilization_from_json() {
        let mut defaults = Assumptions::default_pricing();
        for division in &mut defaults.divisions {
            for category in &mut division.categories {
                category.utilization.set(Scenario::Custom, 0.5);
            }
        }
        let json = serde_json::to_string(&defaults).unwrap();
        let parsed = parse_assumptions(&json).unwrap();
        let chassis = parsed.division("transport").unwrap().category("chassis").unwrap();
        assert_eq!(chassis.utilization(Scenario::Custom).unwrap(), 0.5);
    }

    #[test]
    fn test_lease_rate_defaults_when_absent() {
        let defaults = Assumptions::default_pricing();
        let mut value = serde_json::to_value(&defaults).unwrap();
        value["divisions"][0]
            .as_object_mut()
            .unwrap()
            .remove("lease_monthly_rate");
        let parsed: Assumptions = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.divisions[0].lease_monthly_rate, 0.02);
    }

    #[test]
    fn test_write_and_load_file() {
        let path = std::env::temp_dir().join("business_projections_loader_test.json");
        let defaults = Assumptions::default_pricing();
        write_assumptions(&path, &defaults).unwrap();
        let loaded = load_assumptions(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, defaults);
    }
}
